//! In-memory batch store.

use batch_types::{Batch, BatchKey, BatchStatus, BatchStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory BatchStore: batches keyed by (ingestion_id, batch_id). Grows for the process lifetime.
pub struct InMemoryBatchStore {
    batches: Arc<RwLock<HashMap<BatchKey, Batch>>>,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.batches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.batches.read().await.is_empty()
    }
}

impl Default for InMemoryBatchStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BatchStore for InMemoryBatchStore {
    async fn insert_batches(&self, batches: &[Batch]) -> Result<(), StoreError> {
        let mut guard = self.batches.write().await;
        if let Some(dup) = batches.iter().find(|b| guard.contains_key(&b.key())) {
            return Err(StoreError::AlreadyExists(dup.key().to_string()));
        }
        for batch in batches {
            guard.insert(batch.key(), batch.clone());
        }
        Ok(())
    }

    async fn get_batch(&self, key: &BatchKey) -> Result<Option<Batch>, StoreError> {
        Ok(self.batches.read().await.get(key).cloned())
    }

    async fn transition(&self, key: &BatchKey, next: BatchStatus) -> Result<Batch, StoreError> {
        let mut guard = self.batches.write().await;
        let batch = guard
            .get_mut(key)
            .ok_or_else(|| StoreError::BatchNotFound(key.clone()))?;
        if !batch.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                key: key.clone(),
                from: batch.status,
                to: next,
            });
        }
        batch.status = next;
        Ok(batch.clone())
    }

    async fn record_attempt(&self, key: &BatchKey) -> Result<u32, StoreError> {
        let mut guard = self.batches.write().await;
        let batch = guard
            .get_mut(key)
            .ok_or_else(|| StoreError::BatchNotFound(key.clone()))?;
        batch.attempts += 1;
        Ok(batch.attempts)
    }

    async fn statuses(&self, keys: &[BatchKey]) -> Result<Vec<Option<BatchStatus>>, StoreError> {
        let guard = self.batches.read().await;
        Ok(keys.iter().map(|k| guard.get(k).map(|b| b.status)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_types::Priority;
    use chrono::Utc;

    fn batch(ingestion_id: &str, batch_id: u32) -> Batch {
        Batch {
            batch_id,
            ingestion_id: ingestion_id.to_string(),
            ids: vec![serde_json::json!(batch_id)],
            status: BatchStatus::YetToStart,
            priority: Priority::Medium,
            timestamp: Utc::now(),
            attempts: 0,
        }
    }

    #[tokio::test]
    async fn same_batch_id_in_two_ingestions_does_not_collide() {
        let store = InMemoryBatchStore::new();
        store
            .insert_batches(&[batch("a", 1), batch("a", 2)])
            .await
            .unwrap();
        store.insert_batches(&[batch("b", 1)]).await.unwrap();
        assert_eq!(store.len().await, 3);

        store
            .transition(&BatchKey::new("a", 1), BatchStatus::Triggered)
            .await
            .unwrap();
        let b1 = store.get_batch(&BatchKey::new("b", 1)).await.unwrap().unwrap();
        assert_eq!(b1.status, BatchStatus::YetToStart);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected_without_partial_write() {
        let store = InMemoryBatchStore::new();
        store.insert_batches(&[batch("a", 1)]).await.unwrap();
        let err = store
            .insert_batches(&[batch("a", 2), batch("a", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert!(store.get_batch(&BatchKey::new("a", 2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transition_enforces_lifecycle() {
        let store = InMemoryBatchStore::new();
        store.insert_batches(&[batch("a", 1)]).await.unwrap();
        let key = BatchKey::new("a", 1);

        let err = store
            .transition(&key, BatchStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        store.transition(&key, BatchStatus::Triggered).await.unwrap();
        let done = store.transition(&key, BatchStatus::Completed).await.unwrap();
        assert_eq!(done.status, BatchStatus::Completed);

        assert!(store.transition(&key, BatchStatus::Triggered).await.is_err());
        assert!(matches!(
            store
                .transition(&BatchKey::new("zz", 1), BatchStatus::Triggered)
                .await,
            Err(StoreError::BatchNotFound(_))
        ));
    }

    #[tokio::test]
    async fn statuses_preserve_key_order_and_mark_missing() {
        let store = InMemoryBatchStore::new();
        store
            .insert_batches(&[batch("a", 1), batch("a", 2)])
            .await
            .unwrap();
        store
            .transition(&BatchKey::new("a", 2), BatchStatus::Triggered)
            .await
            .unwrap();
        assert_eq!(store.record_attempt(&BatchKey::new("a", 2)).await.unwrap(), 1);
        assert_eq!(store.record_attempt(&BatchKey::new("a", 2)).await.unwrap(), 2);

        let got = store
            .statuses(&[
                BatchKey::new("a", 2),
                BatchKey::new("a", 9),
                BatchKey::new("a", 1),
            ])
            .await
            .unwrap();
        assert_eq!(
            got,
            vec![
                Some(BatchStatus::Triggered),
                None,
                Some(BatchStatus::YetToStart)
            ]
        );
    }
}
