use std::time::Duration;

/// Failure of a single source adapter's fetch.
///
/// These never escape the orchestrator: a failed source contributes zero
/// records to the run and is logged with its name.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Source returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ScrapeError::Browser(e.to_string())
    }
}

/// Failure to hand the final batch to the ingestion endpoint.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Failed to serialize jobs: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to send request to backend: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status: {0}")]
    Status(reqwest::StatusCode),
}
