//! Plain-text rendering of search outcomes for the terminal.

use crate::session::{
    AbstractSection, Banner, ResultPanel, SearchOutcome, SummarySlot, NEEDS_KEY_MESSAGE,
    NO_ABSTRACT_MESSAGE,
};
use crate::summarizer::Summary;
use std::fmt::{self, Write};

const RULE: &str = "------------------------------------------------------------";

/// Render the banner followed by one block per result
pub fn render_outcome(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    out.push_str(&banner_line(&outcome.banner));
    out.push('\n');
    for panel in &outcome.panels {
        out.push('\n');
        out.push_str(&render_panel(panel));
    }
    out
}

fn banner_line(banner: &Banner) -> String {
    match banner {
        Banner::Found(_) => format!("[ok] {}", banner),
        Banner::NoResults => format!("[warn] {}", banner),
        Banner::Error(_) => format!("[error] {}", banner),
    }
}

/// Render one result block
pub fn render_panel(panel: &ResultPanel) -> String {
    panel.to_string()
}

impl fmt::Display for ResultPanel {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_panel(out, self)
    }
}

fn write_panel(out: &mut impl Write, panel: &ResultPanel) -> fmt::Result {
    let record = &panel.record;

    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}. {}", panel.index, record.title)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Authors: {}", record.authors)?;
    writeln!(out, "Journal: {} ({})", record.journal, record.year)?;
    writeln!(out, "Link: {}", record.link)?;

    let summary = match &panel.abstract_section {
        AbstractSection::Missing => return writeln!(out, "[warn] {}", NO_ABSTRACT_MESSAGE),
        AbstractSection::Present { summary } => summary,
    };

    writeln!(out, "Abstract:")?;
    writeln!(out, "{}", record.abstract_text)?;
    match summary {
        SummarySlot::NeedsKey => writeln!(out, "[info] {}", NEEDS_KEY_MESSAGE),
        SummarySlot::Pending => Ok(()),
        SummarySlot::Ready(summary) => {
            writeln!(out, "AI Summary:")?;
            writeln!(out, "{}", summary_line(summary))
        }
    }
}

fn summary_line(summary: &Summary) -> String {
    match summary {
        Summary::Generated(_) => summary.to_string(),
        _ => format!("[warn] {}", summary),
    }
}
