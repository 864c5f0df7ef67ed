//! HTTP client that hands each batch to a downstream ingestion endpoint.

use batch_types::{Batch, BatchExecutor, ExecutorError};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Serialize)]
struct BatchPayload<'a> {
    ingestion_id: &'a str,
    batch_id: u32,
    ids: &'a [serde_json::Value],
}

/// Executor that POSTs `{ingestion_id, batch_id, ids}` as JSON to a fixed URL.
///
/// Connection errors, timeouts and 5xx/429 responses are transient; other non-2xx responses
/// reject the batch.
pub struct HttpExecutor {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpExecutor {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            api_key,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Upper bound for one downstream call, connect to last body byte.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Built from `INGEST_EXECUTOR_URL` (+ optional `INGEST_EXECUTOR_API_KEY`,
    /// `INGEST_EXECUTOR_TIMEOUT_MS`); `None` when the URL is unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("INGEST_EXECUTOR_URL").ok()?;
        let api_key = std::env::var("INGEST_EXECUTOR_API_KEY").ok();
        let timeout = resolve_timeout(std::env::var("INGEST_EXECUTOR_TIMEOUT_MS").ok());
        Some(Self::new(url, api_key).with_timeout(timeout))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn resolve_timeout(raw: Option<String>) -> Duration {
    Duration::from_millis(crate::positive_ms(raw).unwrap_or(DEFAULT_TIMEOUT_MS))
}

#[async_trait::async_trait]
impl BatchExecutor for HttpExecutor {
    async fn execute(&self, batch: &Batch) -> Result<(), ExecutorError> {
        let body = BatchPayload {
            ingestion_id: &batch.ingestion_id,
            batch_id: batch.batch_id,
            ids: &batch.ids,
        };
        let mut req = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        let res = req
            .send()
            .await
            .map_err(|e| ExecutorError::Transient(e.to_string()))?;
        let status = res.status();
        if status.is_success() {
            return Ok(());
        }
        let text = res.text().await.unwrap_or_default();
        let msg = format!("downstream error {}: {}", status, text);
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Err(ExecutorError::Transient(msg))
        } else {
            Err(ExecutorError::Rejected(msg))
        }
    }
}
