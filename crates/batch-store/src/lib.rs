//! Batch and ingestion stores (process lifetime only).

mod batches;
mod ingestions;

pub use batch_types::{BatchStore, IngestionStore, StoreError};
pub use batches::InMemoryBatchStore;
pub use ingestions::InMemoryIngestionStore;
