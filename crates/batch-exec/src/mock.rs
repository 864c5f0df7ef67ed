//! Mock executor for tests: records calls, optionally gated, scripted failures. No network.

use batch_types::{Batch, BatchExecutor, BatchKey, ExecutorError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Releases a gated [`MockExecutor`] one batch at a time.
#[derive(Clone)]
pub struct MockGate {
    permits: Arc<Semaphore>,
}

impl MockGate {
    /// Let `n` more executor calls finish.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }

    pub fn open(&self) {
        self.permits.add_permits(1 << 20);
    }
}

pub struct MockExecutor {
    calls: Arc<Mutex<Vec<BatchKey>>>,
    gate: Option<Arc<Semaphore>>,
    transient_failures: AtomicUsize,
    reject_marker: Option<serde_json::Value>,
    panic_marker: Option<serde_json::Value>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
            transient_failures: AtomicUsize::new(0),
            reject_marker: None,
            panic_marker: None,
        }
    }

    /// Every call blocks until the returned gate releases a permit for it.
    pub fn gated(mut self) -> (Self, MockGate) {
        let permits = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&permits));
        (self, MockGate { permits })
    }

    /// The first `n` calls (across all batches) fail with a transient error.
    pub fn failing_first(self, n: usize) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Batches containing `marker` among their ids are rejected.
    pub fn rejecting(mut self, marker: serde_json::Value) -> Self {
        self.reject_marker = Some(marker);
        self
    }

    /// Batches containing `marker` among their ids panic inside `execute`.
    pub fn panicking_on(mut self, marker: serde_json::Value) -> Self {
        self.panic_marker = Some(marker);
        self
    }

    /// Shared handle to the call log, usable after the executor moved into a scheduler.
    /// Keys appear in call order; retries appear more than once.
    pub fn call_log(&self) -> Arc<Mutex<Vec<BatchKey>>> {
        Arc::clone(&self.calls)
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BatchExecutor for MockExecutor {
    async fn execute(&self, batch: &Batch) -> Result<(), ExecutorError> {
        if let Ok(mut g) = self.calls.lock() {
            g.push(batch.key());
        }
        if let Some(ref gate) = self.gate {
            gate.acquire()
                .await
                .map_err(|e| ExecutorError::Transient(e.to_string()))?
                .forget();
        }
        if let Some(ref marker) = self.panic_marker {
            if batch.ids.contains(marker) {
                panic!("mock executor asked to panic on {}", marker);
            }
        }
        let failed = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ExecutorError::Transient("mock transient failure".to_string()));
        }
        if let Some(ref marker) = self.reject_marker {
            if batch.ids.contains(marker) {
                return Err(ExecutorError::Rejected(format!("mock rejects {}", marker)));
            }
        }
        Ok(())
    }
}
