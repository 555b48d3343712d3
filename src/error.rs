//! Error types for wordpress-analyzer

use std::time::Duration;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during WordPress analysis
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid URL provided
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to create HTTP client
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// Homepage could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The whole analysis did not finish in time
    #[error("analysis timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Invalid output format specified
    #[error("invalid output format: '{0}' (valid: human, json, none)")]
    InvalidOutputFormat(String),

    /// Output operation failed
    #[error("output failed: {0}")]
    OutputFailed(#[source] std::io::Error),

    /// JSON serialization failed
    #[error("JSON serialization failed")]
    SerializationFailed(#[from] serde_json::Error),
}

impl Error {
    /// True when the scan-level timeout expired (maps to 504 rather than 500)
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Failure to retrieve the homepage, the one fatal request of a scan
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// Homepage answered with a non-2xx status
    #[error("HTTP error: status {0}")]
    Status(u16),
}
