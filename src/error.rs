//! Library errors.
//!
//! Every fallible call in the library (HTTP, XML, CSV, keyword compilation) reports
//! through [`PapersError`]. The binary wraps these in `anyhow` with context.

use thiserror::Error;

/// What went wrong while searching, fetching, classifying or writing papers.
#[derive(Debug, Error)]
pub enum PapersError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed efetch XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Rate limited by E-utilities
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// E-utilities returned an error status or an ERROR payload
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code (0 when the error came back in a 200 body)
        code: i32,
        /// Error message from API
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Keyword matcher failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PapersError>;

/// Turns an absent response field into [`PapersError::Parse`].
pub trait RequireField<T> {
    /// `field` names what was expected, e.g. `"esearchresult"`.
    fn require(self, field: &str) -> Result<T>;
}

impl<T> RequireField<T> for Option<T> {
    fn require(self, field: &str) -> Result<T> {
        self.ok_or_else(|| PapersError::Parse(format!("missing field `{}`", field)))
    }
}
