//! Display records built from raw Crossref items.
//!
//! Every field access tolerates absent, null or mistyped values, so
//! [`DisplayRecord::from_raw`] is total over any JSON value.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Fallback title
pub const NO_TITLE: &str = "No title";

/// Fallback author line
pub const UNKNOWN_AUTHORS: &str = "Unknown authors";

/// Fallback journal name
pub const NO_JOURNAL: &str = "N/A";

/// Link used when there is no DOI
pub const NO_LINK: &str = "#";

/// DOI resolver prefix
const DOI_RESOLVER: &str = "https://doi.org/";

/// Paragraph markers used in Crossref JATS abstracts
const JATS_OPEN: &str = "<jats:p>";
const JATS_CLOSE: &str = "</jats:p>";

/// Print publication year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Year {
    Known(i64),
    Unknown,
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(year) => write!(f, "{}", year),
            Year::Unknown => f.write_str("Unknown"),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Year::Known(year) => serializer.serialize_i64(*year),
            Year::Unknown => serializer.serialize_str("Unknown"),
        }
    }
}

/// One search result, ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRecord {
    pub title: String,
    pub authors: String,
    pub journal: String,
    pub year: Year,
    pub link: String,
    pub abstract_text: String,
    pub has_abstract: bool,
}

impl DisplayRecord {
    /// Normalize one raw Crossref item
    pub fn from_raw(item: &Value) -> Self {
        let abstract_text = item
            .get("abstract")
            .and_then(Value::as_str)
            .map(clean_abstract)
            .unwrap_or_default();

        Self {
            title: first_string(item, "title").unwrap_or_else(|| NO_TITLE.to_string()),
            authors: format_authors(item.get("author")),
            journal: first_string(item, "container-title")
                .filter(|j| !j.trim().is_empty())
                .unwrap_or_else(|| NO_JOURNAL.to_string()),
            year: print_year(item),
            link: doi_link(item.get("DOI").and_then(Value::as_str)),
            has_abstract: !abstract_text.is_empty(),
            abstract_text,
        }
    }
}

/// First element of a string array field
fn first_string(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// "given family" per author, comma-joined
fn format_authors(authors: Option<&Value>) -> String {
    let authors = match authors.and_then(Value::as_array) {
        Some(list) if !list.is_empty() => list,
        _ => return UNKNOWN_AUTHORS.to_string(),
    };

    authors
        .iter()
        .map(|a| {
            let given = a.get("given").and_then(Value::as_str).unwrap_or("");
            let family = a.get("family").and_then(Value::as_str).unwrap_or("");
            format!("{} {}", given, family)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `published-print.date-parts[0][0]`
fn print_year(item: &Value) -> Year {
    item.pointer("/published-print/date-parts/0/0")
        .and_then(Value::as_i64)
        .map(Year::Known)
        .unwrap_or(Year::Unknown)
}

/// Resolver URL for a DOI, or the placeholder link
pub fn doi_link(doi: Option<&str>) -> String {
    match doi {
        Some(doi) if !doi.is_empty() => format!("{}{}", DOI_RESOLVER, doi),
        _ => NO_LINK.to_string(),
    }
}

/// Remove JATS paragraph markers and surrounding whitespace.
///
/// Only the two literal markers are removed; other markup is left alone.
pub fn clean_abstract(raw: &str) -> String {
    raw.replace(JATS_OPEN, "")
        .replace(JATS_CLOSE, "")
        .trim()
        .to_string()
}
