//! HTTP surface of the batch ingestion scheduler.

pub mod config;
pub mod server;
