//! Executors that perform the downstream work for one batch.

mod delay;
mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use batch_types::{BatchExecutor, ExecutorError};
pub use delay::DelayExecutor;
pub use http::HttpExecutor;

#[cfg(feature = "test-util")]
pub use mock::{MockExecutor, MockGate};

/// Millisecond setting from the environment; zero or unparseable counts as unset.
pub(crate) fn positive_ms(raw: Option<String>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).filter(|v| *v > 0)
}
