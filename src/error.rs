//! Custom error types for rustpubmed.
//!
//! Every failure kind the pipeline can hit gets its own variant so callers
//! (and tests) can match on the outcome instead of string-scraping. All
//! functions return `Result<T, PubmedError>` instead of using `unwrap()`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for rustpubmed operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum PubmedError {
    /// Search succeeded but matched zero records
    #[error("no records matched the query")]
    NoResults,

    /// 200 response missing expected fields
    #[error("malformed E-utilities response: {0}")]
    Malformed(String),

    /// External API returned a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code from the API
        code: i32,
        /// Response body or status text
        message: String,
    },

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MEDLINE record structure error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Output file could not be written
    #[error("cannot write {}: {message}", path.display())]
    Persist {
        /// Destination the writer attempted
        path: PathBuf,
        /// Underlying I/O or serialization failure
        message: String,
    },
}

impl PubmedError {
    /// Process exit status for this failure kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            PubmedError::NoResults => 2,
            PubmedError::Malformed(_) | PubmedError::Api { .. } | PubmedError::Json(_) => 3,
            PubmedError::Network(_) => 4,
            PubmedError::Persist { .. } => 5,
            PubmedError::Parse(_) => 1,
        }
    }
}

/// Result type alias using `PubmedError`
pub type Result<T> = std::result::Result<T, PubmedError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a malformed-response message
    fn ok_or_malformed(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_malformed(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| PubmedError::Malformed(msg.to_string()))
    }
}
