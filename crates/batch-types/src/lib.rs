//! Core types and traits for the batch ingestion scheduler.
//!
//! Wire DTOs keep the JSON shape of the `/ingest` and `/status` endpoints.

mod dto;
mod lifecycle;
mod traits;

pub use dto::*;
pub use lifecycle::*;
pub use traits::*;
