//! Search orchestration.
//!
//! Runs the Crossref search, normalizes every item and attaches summaries on
//! demand. This is the only layer that performs I/O; the surfaces (CLI and
//! HTTP server) render the [`SearchOutcome`] it produces.

use crate::crossref::{CrossrefClient, SearchCriteria};
use crate::record::DisplayRecord;
use crate::summarizer::{Summarizer, Summary};
use serde::Serialize;
use std::fmt;
use tracing::{error, info};

/// Shown when the search returned nothing
pub const NO_RESULTS_MESSAGE: &str = "No results found. Try refining your search or filters.";

/// Shown in place of an abstract
pub const NO_ABSTRACT_MESSAGE: &str = "No abstract available for this paper.";

/// Shown in place of a summary when no credential is set
pub const NEEDS_KEY_MESSAGE: &str = "Enter your OpenAI API key to enable AI summaries.";

/// Status line shown above the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Banner {
    Found(usize),
    NoResults,
    Error(String),
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Banner::Found(count) => write!(f, "Found {} results", count),
            Banner::NoResults => f.write_str(NO_RESULTS_MESSAGE),
            Banner::Error(message) => f.write_str(message),
        }
    }
}

/// Summary slot of a panel with an abstract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "summary", rename_all = "snake_case")]
pub enum SummarySlot {
    /// No credential in this session
    NeedsKey,
    /// Credential present, not requested yet
    Pending,
    Ready(Summary),
}

/// Abstract area of a panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AbstractSection {
    Missing,
    Present { summary: SummarySlot },
}

/// One collapsible result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultPanel {
    /// 1-based position in the result list
    pub index: usize,
    pub record: DisplayRecord,
    pub abstract_section: AbstractSection,
}

/// Everything a surface needs to render one search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub banner: Banner,
    pub panels: Vec<ResultPanel>,
}

impl SearchOutcome {
    pub fn records(&self) -> impl Iterator<Item = &DisplayRecord> {
        self.panels.iter().map(|p| &p.record)
    }
}

/// Placeholder printed in place of a credential
pub(crate) fn redact(api_key: &Option<String>) -> &'static str {
    match api_key {
        Some(_) => "<redacted>",
        None => "<none>",
    }
}

/// One user's search session. The credential lives here, not in global state.
#[derive(Clone)]
pub struct Session {
    crossref: CrossrefClient,
    summarizer: Summarizer,
    api_key: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("crossref", &self.crossref)
            .field("summarizer", &self.summarizer)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl Session {
    pub fn new(crossref: CrossrefClient, summarizer: Summarizer, api_key: Option<String>) -> Self {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            crossref,
            summarizer,
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search and normalize. Failures become an error banner with no panels.
    ///
    /// Criteria are expected to be validated by the caller.
    pub async fn search(&self, criteria: &SearchCriteria, rows: u32) -> SearchOutcome {
        let request = self.crossref.request_for(criteria, rows);

        let items = match self.crossref.search(&request).await {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, keyword = %criteria.keyword, "Search failed");
                return SearchOutcome {
                    banner: Banner::Error(format!("API error: {}", e)),
                    panels: Vec::new(),
                };
            }
        };

        if items.is_empty() {
            info!(keyword = %criteria.keyword, "No results");
            return SearchOutcome {
                banner: Banner::NoResults,
                panels: Vec::new(),
            };
        }

        let panels: Vec<ResultPanel> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| self.panel(idx + 1, DisplayRecord::from_raw(item)))
            .collect();

        SearchOutcome {
            banner: Banner::Found(panels.len()),
            panels,
        }
    }

    fn panel(&self, index: usize, record: DisplayRecord) -> ResultPanel {
        let abstract_section = if !record.has_abstract {
            AbstractSection::Missing
        } else if self.has_api_key() {
            AbstractSection::Present {
                summary: SummarySlot::Pending,
            }
        } else {
            AbstractSection::Present {
                summary: SummarySlot::NeedsKey,
            }
        };

        ResultPanel {
            index,
            record,
            abstract_section,
        }
    }

    /// Summarize a single abstract with this session's credential
    pub async fn summarize(&self, abstract_text: &str) -> Summary {
        self.summarizer
            .summarize(abstract_text, self.api_key.as_deref())
            .await
    }

    /// Fill every pending summary, one request at a time.
    ///
    /// Returns the number of summaries requested.
    pub async fn summarize_panels(&self, outcome: &mut SearchOutcome) -> usize {
        let mut requested = 0;
        for panel in &mut outcome.panels {
            if let AbstractSection::Present { summary } = &mut panel.abstract_section {
                if *summary == SummarySlot::Pending {
                    let result = self.summarize(&panel.record.abstract_text).await;
                    *summary = SummarySlot::Ready(result);
                    requested += 1;
                }
            }
        }
        if requested > 0 {
            info!(requested, "Summaries complete");
        }
        requested
    }
}
