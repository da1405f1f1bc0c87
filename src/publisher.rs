use async_trait::async_trait;

use crate::error::PublishError;
use crate::models::job::JobRecord;

/// Destination for the final, classified batch of a run.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, jobs: &[JobRecord]) -> Result<(), PublishError>;
}

/// POSTs the whole batch as one JSON array to the backend's batch endpoint.
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPublisher {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    async fn publish(&self, jobs: &[JobRecord]) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(jobs)?;

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(PublishError::Status(resp.status()));
        }

        tracing::info!(count = jobs.len(), endpoint = %self.endpoint, "Sent jobs to backend");
        Ok(())
    }
}

/// Dry-run sink: writes the batch to stdout instead of sending it.
pub struct StdoutPublisher;

#[async_trait]
impl Publisher for StdoutPublisher {
    async fn publish(&self, jobs: &[JobRecord]) -> Result<(), PublishError> {
        let json = serde_json::to_string_pretty(jobs)?;
        println!("{json}");
        Ok(())
    }
}
