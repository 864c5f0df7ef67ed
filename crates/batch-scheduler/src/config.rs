//! Scheduler configuration.

use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 200;

/// Executor retry policy. Only transient executor errors are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total executor calls per batch, first attempt included. At least 1.
    pub max_attempts: u32,
    /// Linear backoff step: wait `backoff * attempt` before the next try.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Worker loops draining the pending queue. 1 means strictly one batch in flight.
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            retry: RetryPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    /// Reads `INGEST_WORKERS`, `INGEST_MAX_ATTEMPTS`, `INGEST_RETRY_BACKOFF_MS`.
    /// Missing, unparseable or zero values keep the defaults.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var("INGEST_WORKERS").ok(),
            std::env::var("INGEST_MAX_ATTEMPTS").ok(),
            std::env::var("INGEST_RETRY_BACKOFF_MS").ok(),
        )
    }

    fn resolve(
        workers: Option<String>,
        max_attempts: Option<String>,
        backoff_ms: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        let workers = positive(workers)
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(defaults.workers);
        let max_attempts = positive(max_attempts)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(defaults.retry.max_attempts);
        let backoff = positive(backoff_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry.backoff);
        Self {
            workers,
            retry: RetryPolicy {
                max_attempts,
                backoff,
            },
        }
    }
}

fn positive(raw: Option<String>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|v| *v > 0)
}
