//! Stand-in downstream call: wait a fixed time, then succeed.

use batch_types::{Batch, BatchExecutor, ExecutorError};
use std::time::Duration;

const DEFAULT_DELAY_MS: u64 = 5000;

/// Executor that sleeps for a fixed duration per batch and always succeeds.
pub struct DelayExecutor {
    delay: Duration,
}

impl DelayExecutor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Reads `INGEST_SIMULATED_DELAY_MS`; defaults to 5s.
    pub fn from_env() -> Self {
        Self::new(resolve_delay(std::env::var("INGEST_SIMULATED_DELAY_MS").ok()))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Zero, missing or unparseable values keep the default.
fn resolve_delay(raw: Option<String>) -> Duration {
    Duration::from_millis(crate::positive_ms(raw).unwrap_or(DEFAULT_DELAY_MS))
}

impl Default for DelayExecutor {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DELAY_MS))
    }
}

#[async_trait::async_trait]
impl BatchExecutor for DelayExecutor {
    async fn execute(&self, batch: &Batch) -> Result<(), ExecutorError> {
        tracing::debug!(
            ingestion_id = %batch.ingestion_id,
            batch_id = batch.batch_id,
            ids = batch.ids.len(),
            "simulating downstream call"
        );
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batch_types::{BatchStatus, Priority};

    #[tokio::test(start_paused = true)]
    async fn waits_the_configured_delay() {
        let exec = DelayExecutor::new(Duration::from_secs(5));
        let batch = Batch {
            batch_id: 1,
            ingestion_id: "i".to_string(),
            ids: vec![serde_json::json!(1)],
            status: BatchStatus::Triggered,
            priority: Priority::High,
            timestamp: chrono::Utc::now(),
            attempts: 0,
        };
        let start = tokio::time::Instant::now();
        exec.execute(&batch).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn delay_falls_back_on_zero_or_garbage() {
        let default = Duration::from_millis(DEFAULT_DELAY_MS);
        assert_eq!(resolve_delay(Some("250".into())), Duration::from_millis(250));
        assert_eq!(resolve_delay(None), default);
        assert_eq!(resolve_delay(Some("0".into())), default);
        assert_eq!(resolve_delay(Some("soon".into())), default);
        assert_eq!(resolve_delay(Some("-5".into())), default);
    }
}
