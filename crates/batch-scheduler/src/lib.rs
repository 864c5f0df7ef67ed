//! Priority batch scheduler: splits submissions into batches, drains them in priority order.

mod config;
mod memory;
mod partition;
mod queue;
mod trait_;

pub use config::{RetryPolicy, SchedulerConfig};
pub use memory::InMemoryScheduler;
pub use partition::partition;
pub use queue::{PendingBatch, PendingQueue};
pub use trait_::{Scheduler, SchedulerError};
