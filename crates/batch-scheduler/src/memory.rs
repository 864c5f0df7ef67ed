//! In-memory scheduler: one priority queue + worker loop(s), batch and ingestion state in stores.

use crate::{
    partition, PendingBatch, PendingQueue, RetryPolicy, Scheduler, SchedulerConfig, SchedulerError,
};
use async_trait::async_trait;
use batch_store::{InMemoryBatchStore, InMemoryIngestionStore};
use batch_types::{
    Batch, BatchExecutor, BatchKey, BatchStatus, BatchStore, Ingestion, IngestionStore, Priority,
};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::{JoinError, JoinHandle};
use uuid::Uuid;

struct Shared {
    batches: Arc<dyn BatchStore + Send + Sync>,
    ingestions: Arc<dyn IngestionStore + Send + Sync>,
    queue: PendingQueue,
    executor: Arc<dyn BatchExecutor + Send + Sync>,
    retry: RetryPolicy,
}

/// In-memory scheduler: submissions are split into batches and queued; worker tasks drain the
/// queue in priority order, calling the executor and updating batch status.
///
/// Must be created inside a tokio runtime. Dropping it aborts the worker tasks and any executor
/// call they have in flight.
pub struct InMemoryScheduler {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl InMemoryScheduler {
    /// Create scheduler with fresh in-memory stores and spawn its workers.
    pub fn new(executor: Arc<dyn BatchExecutor + Send + Sync>, config: SchedulerConfig) -> Self {
        Self::with_stores(
            executor,
            Arc::new(InMemoryBatchStore::new()),
            Arc::new(InMemoryIngestionStore::new()),
            config,
        )
    }

    pub fn with_stores(
        executor: Arc<dyn BatchExecutor + Send + Sync>,
        batches: Arc<dyn BatchStore + Send + Sync>,
        ingestions: Arc<dyn IngestionStore + Send + Sync>,
        config: SchedulerConfig,
    ) -> Self {
        let shared = Arc::new(Shared {
            batches,
            ingestions,
            queue: PendingQueue::new(),
            executor,
            retry: RetryPolicy {
                max_attempts: config.retry.max_attempts.max(1),
                ..config.retry
            },
        });
        let workers = (0..config.workers.max(1))
            .map(|worker| {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { shared.run_worker(worker).await })
            })
            .collect();
        Self { shared, workers }
    }

    /// Number of batches waiting for a worker.
    pub async fn pending_len(&self) -> usize {
        self.shared.queue.len().await
    }

    /// Pending batch keys in selection order.
    pub async fn pending(&self) -> Vec<BatchKey> {
        self.shared.queue.snapshot().await
    }

    /// Authoritative batch record.
    pub async fn batch(&self, key: &BatchKey) -> Result<Option<Batch>, SchedulerError> {
        Ok(self.shared.batches.get_batch(key).await?)
    }
}

impl Drop for InMemoryScheduler {
    fn drop(&mut self) {
        for w in &self.workers {
            w.abort();
        }
    }
}

/// Join handle that aborts its task when dropped, so cancelling the awaiting worker also
/// cancels the executor call.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl Shared {
    async fn run_worker(&self, worker: usize) {
        tracing::debug!(worker, "scheduler worker started");
        loop {
            let next = self.queue.pop().await;
            if let Err(e) = self.process(&next).await {
                tracing::error!(
                    worker,
                    ingestion_id = %next.key.ingestion_id,
                    batch_id = next.key.batch_id,
                    error = %e,
                    "batch processing fault"
                );
            }
        }
    }

    /// Claim, execute and settle one batch, then refresh its ingestion.
    async fn process(&self, next: &PendingBatch) -> Result<(), SchedulerError> {
        let key = &next.key;
        let batch = self.batches.transition(key, BatchStatus::Triggered).await?;
        tracing::info!(
            ingestion_id = %key.ingestion_id,
            batch_id = key.batch_id,
            priority = %next.priority,
            ids = batch.ids.len(),
            "batch triggered"
        );

        let status = match self.execute_with_retry(&batch).await {
            Ok(()) => BatchStatus::Completed,
            Err(e) => {
                tracing::error!(
                    ingestion_id = %key.ingestion_id,
                    batch_id = key.batch_id,
                    error = %e,
                    "batch failed"
                );
                BatchStatus::Failed
            }
        };
        self.batches.transition(key, status).await?;
        tracing::info!(
            ingestion_id = %key.ingestion_id,
            batch_id = key.batch_id,
            status = %status,
            "batch settled"
        );

        self.refresh(&key.ingestion_id).await?;
        Ok(())
    }

    /// Each attempt runs in its own task so a panicking executor only fails this batch.
    async fn execute_with_retry(&self, batch: &Batch) -> Result<(), SchedulerError> {
        let key = batch.key();
        loop {
            let attempt = self.batches.record_attempt(&key).await?;
            let executor = Arc::clone(&self.executor);
            let b = batch.clone();
            let task = tokio::spawn(async move { executor.execute(&b).await });
            let joined = AbortOnDrop(task).await;
            match joined {
                Ok(Ok(())) => return Ok(()),
                Ok(Err(e)) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let wait = self.retry.delay_after(attempt);
                    tracing::warn!(
                        ingestion_id = %key.ingestion_id,
                        batch_id = key.batch_id,
                        attempt,
                        error = %e,
                        retry_in_ms = wait.as_millis() as u64,
                        "batch attempt failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Ok(Err(e)) => {
                    return Err(SchedulerError::Internal(format!(
                        "attempt {}/{}: {}",
                        attempt, self.retry.max_attempts, e
                    )))
                }
                Err(join_err) => {
                    return Err(SchedulerError::Internal(format!(
                        "executor task aborted: {}",
                        join_err
                    )))
                }
            }
        }
    }

    /// Re-read batch statuses into the ingestion projection and store it.
    async fn refresh(&self, ingestion_id: &str) -> Result<Ingestion, SchedulerError> {
        let mut ingestion = self
            .ingestions
            .get_ingestion(ingestion_id)
            .await?
            .ok_or_else(|| SchedulerError::NotFound(ingestion_id.to_string()))?;
        let keys: Vec<BatchKey> = ingestion.batch_keys().collect();
        let statuses = self.batches.statuses(&keys).await?;
        for (summary, status) in ingestion.batches.iter_mut().zip(statuses) {
            summary.status = status.unwrap_or_default();
        }
        ingestion.status = BatchStatus::aggregate(ingestion.batches.iter().map(|b| b.status));
        self.ingestions.put_ingestion(ingestion.clone()).await?;
        Ok(ingestion)
    }
}

#[async_trait]
impl Scheduler for InMemoryScheduler {
    async fn submit(
        &self,
        ids: Vec<serde_json::Value>,
        priority: Priority,
    ) -> Result<String, SchedulerError> {
        if ids.is_empty() {
            return Err(SchedulerError::InvalidSubmission(
                "ids must not be empty".to_string(),
            ));
        }
        let ingestion_id = Uuid::new_v4().to_string();
        let batches = partition(&ingestion_id, &ids, priority, Utc::now());

        self.shared.batches.insert_batches(&batches).await?;
        self.shared
            .ingestions
            .insert_ingestion(Ingestion {
                ingestion_id: ingestion_id.clone(),
                status: BatchStatus::YetToStart,
                batches: batches.iter().map(Batch::summary).collect(),
            })
            .await?;
        self.shared
            .queue
            .push_all(batches.iter().map(PendingBatch::from))
            .await;

        tracing::info!(
            ingestion_id = %ingestion_id,
            priority = %priority,
            ids = ids.len(),
            batches = batches.len(),
            "ingestion submitted"
        );
        Ok(ingestion_id)
    }

    async fn status(&self, ingestion_id: &str) -> Result<Ingestion, SchedulerError> {
        self.shared.refresh(ingestion_id).await
    }
}
