//! Custom error types for biopaper.
//!
//! Library functions return `Result<T, BiopaperError>`; the binary wraps them
//! with `anyhow` context. No `unwrap()` outside of tests.

use thiserror::Error;

/// Main error type for biopaper operations.
#[derive(Debug, Error)]
pub enum BiopaperError {
    /// Network/HTTP request error (includes timeouts)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// External API returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Error message from API
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid user input, rejected before any request is made
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias using `BiopaperError`
pub type Result<T> = std::result::Result<T, BiopaperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = BiopaperError::Api {
            code: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - Service Unavailable");
    }

    #[test]
    fn test_validation_error_display() {
        let err = BiopaperError::Validation("keyword is empty".to_string());
        assert_eq!(err.to_string(), "Validation error: keyword is empty");
    }
}
