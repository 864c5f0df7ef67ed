//! Split a submission into batches of at most [`MAX_BATCH_LEN`] ids.

use batch_types::{Batch, BatchStatus, Priority, MAX_BATCH_LEN};
use chrono::{DateTime, Utc};

/// Consecutive chunks of `ids` in submission order; `batch_id` is the 1-based chunk index.
pub fn partition(
    ingestion_id: &str,
    ids: &[serde_json::Value],
    priority: Priority,
    timestamp: DateTime<Utc>,
) -> Vec<Batch> {
    ids.chunks(MAX_BATCH_LEN)
        .enumerate()
        .map(|(i, chunk)| Batch {
            batch_id: i as u32 + 1,
            ingestion_id: ingestion_id.to_string(),
            ids: chunk.to_vec(),
            status: BatchStatus::YetToStart,
            priority,
            timestamp,
            attempts: 0,
        })
        .collect()
}
