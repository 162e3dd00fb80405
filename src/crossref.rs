//! Crossref works search.
//!
//! Builds the filtered `/works` query from user criteria and fetches the raw
//! items. Items are returned untyped; shaping them for display is the job of
//! [`crate::record`].

use crate::config::{validate_year, SearchConfig, DEFAULT_ROWS, MAX_ROWS};
use crate::error::{BiopaperError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Restriction applied to every search
const TYPE_FILTER: &str = "type:journal-article";

/// Sort order sent with every search
const SORT_ORDER: &str = "relevance";

/// User-supplied search term and filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub keyword: String,
    #[serde(default)]
    pub open_access_only: bool,
    #[serde(default)]
    pub journal: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

impl SearchCriteria {
    /// Criteria with only a keyword set
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    /// Reject input that must never reach the API.
    ///
    /// An inverted year range is accepted as-is and only logged.
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            return Err(BiopaperError::Validation(
                "Enter keywords to search".to_string(),
            ));
        }
        if let Some(year) = self.start_year {
            validate_year("Start year", year)?;
        }
        if let Some(year) = self.end_year {
            validate_year("End year", year)?;
        }
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                warn!(start, end, "Start year is after end year, search will likely be empty");
            }
        }
        Ok(())
    }

    /// Combined Crossref filter expression, clauses in fixed order
    pub fn filter_expression(&self) -> String {
        let mut filters = vec![TYPE_FILTER.to_string()];
        if self.open_access_only {
            filters.push("license:*".to_string());
        }
        if let Some(year) = self.start_year {
            filters.push(format!("from-pub-date:{}-01-01", year));
        }
        if let Some(year) = self.end_year {
            filters.push(format!("until-pub-date:{}-12-31", year));
        }
        if let Some(journal) = self.journal.as_deref().filter(|j| !j.is_empty()) {
            filters.push(format!("container-title:{}", journal));
        }
        filters.join(",")
    }
}

/// Fully shaped request for the works endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub url: String,
    pub query: String,
    pub filter: String,
    pub rows: u32,
    pub sort: &'static str,
}

impl SearchRequest {
    /// Query parameters in the order they are sent
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.query.clone()),
            ("filter", self.filter.clone()),
            ("rows", self.rows.to_string()),
            ("sort", self.sort.to_string()),
        ]
    }
}

/// Shape a works search. Never fails; a zero row count falls back to the
/// default and larger counts are capped at [`MAX_ROWS`].
pub fn build_request(base_url: &str, criteria: &SearchCriteria, rows: u32) -> SearchRequest {
    let rows = match rows {
        0 => DEFAULT_ROWS,
        n if n > MAX_ROWS => {
            warn!(requested = n, max = MAX_ROWS, "Row count capped");
            MAX_ROWS
        }
        n => n,
    };

    SearchRequest {
        url: base_url.to_string(),
        query: criteria.keyword.clone(),
        filter: criteria.filter_expression(),
        rows,
        sort: SORT_ORDER,
    }
}

/// Crossref API client
#[derive(Debug, Clone)]
pub struct CrossrefClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl CrossrefClient {
    /// Create a new CrossrefClient with a bounded request timeout
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("biopaper/0.1 (mailto:{})", config.mailto))
            .timeout(config.timeout)
            .build()
            .map_err(|e| BiopaperError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Build the request for these criteria against the configured endpoint
    pub fn request_for(&self, criteria: &SearchCriteria, rows: u32) -> SearchRequest {
        build_request(&self.config.base_url, criteria, rows)
    }

    /// Run a works search and return the raw items
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>> {
        info!(
            query = %request.query,
            filter = %request.filter,
            rows = request.rows,
            "Searching Crossref"
        );

        let response = self
            .client
            .get(&request.url)
            .query(&request.query_pairs())
            .send()
            .await?;

        if let Some(limit) = response.headers().get("X-Rate-Limit-Limit") {
            debug!(limit = ?limit, "Rate limit");
        }

        let status = response.status();
        if !status.is_success() {
            return Err(BiopaperError::Api {
                code: status.as_u16(),
                message: format!("Crossref API error: {}", status),
            });
        }

        let data: CrossrefResponse = response
            .json()
            .await
            .map_err(|e| BiopaperError::Parse(format!("Failed to parse Crossref response: {}", e)))?;

        info!(count = data.message.items.len(), "Crossref search complete");
        Ok(data.message.items)
    }
}

// === Crossref API Response Types ===

#[derive(Debug, Deserialize)]
struct CrossrefResponse {
    message: CrossrefMessage,
}

#[derive(Debug, Deserialize)]
struct CrossrefMessage {
    items: Vec<Value>,
}
