//! Traits for the batch/ingestion stores and the downstream batch executor.

use crate::{Batch, BatchKey, BatchStatus, Ingestion};
use async_trait::async_trait;

/// Authoritative batch records, keyed by [`BatchKey`].
///
/// Every write is atomic per batch: readers never observe a partially updated record.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Insert new batches. Existing keys are rejected.
    async fn insert_batches(&self, batches: &[Batch]) -> Result<(), StoreError>;

    /// Get one batch by key.
    async fn get_batch(&self, key: &BatchKey) -> Result<Option<Batch>, StoreError>;

    /// Move a batch to `next`, enforcing the lifecycle. Returns the updated record.
    async fn transition(&self, key: &BatchKey, next: BatchStatus) -> Result<Batch, StoreError>;

    /// Increment the attempt counter; returns the new count.
    async fn record_attempt(&self, key: &BatchKey) -> Result<u32, StoreError>;

    /// Current status per key, `None` where the batch is unknown. Output order matches `keys`.
    async fn statuses(&self, keys: &[BatchKey]) -> Result<Vec<Option<BatchStatus>>, StoreError>;
}

/// Ingestion records (read-side projections refreshed from the [`BatchStore`]).
#[async_trait]
pub trait IngestionStore: Send + Sync {
    /// Insert a new ingestion. An existing id is rejected.
    async fn insert_ingestion(&self, ingestion: Ingestion) -> Result<(), StoreError>;

    /// Get one ingestion by id.
    async fn get_ingestion(&self, ingestion_id: &str) -> Result<Option<Ingestion>, StoreError>;

    /// Replace the stored projection of an existing ingestion.
    async fn put_ingestion(&self, ingestion: Ingestion) -> Result<(), StoreError>;
}

/// Performs the downstream work for one batch.
#[async_trait]
pub trait BatchExecutor: Send + Sync {
    async fn execute(&self, batch: &Batch) -> Result<(), ExecutorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("batch not found: {0}")]
    BatchNotFound(BatchKey),
    #[error("ingestion not found: {0}")]
    IngestionNotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid transition for {key}: {from} -> {to}")]
    InvalidTransition {
        key: BatchKey,
        from: BatchStatus,
        to: BatchStatus,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutorError {
    /// Worth retrying (timeouts, 5xx/429, connection errors).
    #[error("transient executor error: {0}")]
    Transient(String),
    /// Downstream refused the batch; retrying will not help.
    #[error("batch rejected: {0}")]
    Rejected(String),
}

impl ExecutorError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExecutorError::Transient(_))
    }
}
