use crate::audit::Strategy;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to fetch {url}: {reason}")]
    FetchError { url: String, reason: String },

    #[error("Sitemap parse error: {0}")]
    ParseError(String),

    #[error("Audit of {url} ({strategy}) failed: {reason}")]
    AuditError {
        url: String,
        strategy: Strategy,
        reason: String,
    },

    #[error("Audit of {url} ({strategy}) is missing metric '{metric}'")]
    MissingMetricError {
        url: String,
        strategy: Strategy,
        metric: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl ScanError {
    pub fn audit(url: &str, strategy: Strategy, reason: impl Into<String>) -> Self {
        ScanError::AuditError {
            url: url.to_string(),
            strategy,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
