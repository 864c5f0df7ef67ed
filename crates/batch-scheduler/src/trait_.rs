//! Scheduler trait: submit an ingestion, query its status.

use async_trait::async_trait;
use batch_types::{Ingestion, Priority, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),
    #[error("ingestion not found: {0}")]
    NotFound(String),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("internal fault: {0}")]
    Internal(String),
}

/// Batch scheduler: `submit` returns an ingestion_id, `status` can be polled.
///
/// Contract: `status` never alters a batch; it only refreshes the ingestion's projection.
/// Unknown ids yield `SchedulerError::NotFound`, which the API layer maps to HTTP 404.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Split `ids` into batches, register and enqueue them. Empty `ids` are rejected.
    async fn submit(
        &self,
        ids: Vec<serde_json::Value>,
        priority: Priority,
    ) -> Result<String, SchedulerError>;

    /// Current ingestion record with batch statuses re-read from the batch store.
    async fn status(&self, ingestion_id: &str) -> Result<Ingestion, SchedulerError>;
}
