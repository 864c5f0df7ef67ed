//! In-memory ingestion store.

use batch_types::{Ingestion, IngestionStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory IngestionStore: ingestion_id -> projection.
pub struct InMemoryIngestionStore {
    ingestions: Arc<RwLock<HashMap<String, Ingestion>>>,
}

impl InMemoryIngestionStore {
    pub fn new() -> Self {
        Self {
            ingestions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.ingestions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ingestions.read().await.is_empty()
    }
}

impl Default for InMemoryIngestionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IngestionStore for InMemoryIngestionStore {
    async fn insert_ingestion(&self, ingestion: Ingestion) -> Result<(), StoreError> {
        let mut guard = self.ingestions.write().await;
        if guard.contains_key(&ingestion.ingestion_id) {
            return Err(StoreError::AlreadyExists(ingestion.ingestion_id));
        }
        guard.insert(ingestion.ingestion_id.clone(), ingestion);
        Ok(())
    }

    async fn get_ingestion(&self, ingestion_id: &str) -> Result<Option<Ingestion>, StoreError> {
        Ok(self.ingestions.read().await.get(ingestion_id).cloned())
    }

    async fn put_ingestion(&self, ingestion: Ingestion) -> Result<(), StoreError> {
        let mut guard = self.ingestions.write().await;
        match guard.get_mut(&ingestion.ingestion_id) {
            Some(slot) => {
                *slot = ingestion;
                Ok(())
            }
            None => Err(StoreError::IngestionNotFound(ingestion.ingestion_id)),
        }
    }
}
