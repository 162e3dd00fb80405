//! Runtime configuration for the CrossRef client and input bounds.

use crate::error::{BiopaperError, Result};
use chrono::{Datelike, Local};
use std::time::Duration;
use url::Url;

/// CrossRef works endpoint
pub const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

/// Polite pool email for Crossref API
pub const MAILTO: &str = "biopaper@example.com";

/// Default search request timeout in seconds
pub const SEARCH_TIMEOUT_SECS: u64 = 15;

/// Default number of rows per search
pub const DEFAULT_ROWS: u32 = 10;

/// Upper bound on rows per search; each row may cost one completion call
pub const MAX_ROWS: u32 = 100;

/// Earliest publication year accepted by the filters
pub const MIN_YEAR: i32 = 1900;

/// Default lower year bound offered by the surfaces
pub const DEFAULT_START_YEAR: i32 = 2015;

/// CrossRef client configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub mailto: String,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: CROSSREF_API_URL.to_string(),
            mailto: MAILTO.to_string(),
            timeout: Duration::from_secs(SEARCH_TIMEOUT_SECS),
        }
    }
}

impl SearchConfig {
    /// Same defaults, different endpoint. The URL must be absolute http(s).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            ..Self::default()
        })
    }
}

/// Parse and normalize an http(s) base URL
pub fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| BiopaperError::Config(format!("Invalid URL {:?}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        other => Err(BiopaperError::Config(format!(
            "Unsupported URL scheme {:?} in {:?}",
            other, raw
        ))),
    }
}

/// Latest publication year accepted by the filters
pub fn current_year() -> i32 {
    Local::now().year()
}

/// Check that a year lies in `[MIN_YEAR, current_year()]`
pub fn validate_year(label: &str, year: i32) -> Result<i32> {
    let max = current_year();
    if (MIN_YEAR..=max).contains(&year) {
        Ok(year)
    } else {
        Err(BiopaperError::Validation(format!(
            "{} {} is outside {}..={}",
            label, year, MIN_YEAR, max
        )))
    }
}
