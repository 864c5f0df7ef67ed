//! Records and request/response DTOs for the ingestion API.

use crate::BatchStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Maximum number of identifiers in one batch.
pub const MAX_BATCH_LEN: usize = 3;

/// Submission priority. Label must match exactly (`HIGH`, `MEDIUM`, `LOW`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Ordering weight: HIGH=3, MEDIUM=2, LOW=1.
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

/// Process-wide address of a batch. `batch_id` alone restarts at 1 for every ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchKey {
    pub ingestion_id: String,
    pub batch_id: u32,
}

impl BatchKey {
    pub fn new(ingestion_id: impl Into<String>, batch_id: u32) -> Self {
        Self {
            ingestion_id: ingestion_id.into(),
            batch_id,
        }
    }
}

impl std::fmt::Display for BatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.ingestion_id, self.batch_id)
    }
}

/// One unit of scheduled work: up to [`MAX_BATCH_LEN`] identifiers from one ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: u32,
    pub ingestion_id: String,
    /// Opaque identifiers, in submission order.
    pub ids: Vec<serde_json::Value>,
    pub status: BatchStatus,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl Batch {
    pub fn key(&self) -> BatchKey {
        BatchKey::new(self.ingestion_id.clone(), self.batch_id)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            batch_id: self.batch_id,
            ids: self.ids.clone(),
            status: self.status,
        }
    }
}

/// Read-side projection of a batch, as embedded in an [`Ingestion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_id: u32,
    pub ids: Vec<serde_json::Value>,
    pub status: BatchStatus,
}

/// One submission, tracked as an aggregate of its batches. Also the `/status` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingestion {
    pub ingestion_id: String,
    pub status: BatchStatus,
    pub batches: Vec<BatchSummary>,
}

impl Ingestion {
    pub fn batch_keys(&self) -> impl Iterator<Item = BatchKey> + '_ {
        self.batches
            .iter()
            .map(|b| BatchKey::new(self.ingestion_id.clone(), b.batch_id))
    }
}

/// `POST /ingest` body. Fields stay loose so shape errors surface as 400s, not extractor rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub ids: Option<serde_json::Value>,
    #[serde(default)]
    pub priority: Option<serde_json::Value>,
}

/// `POST /ingest` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ingestion_id: String,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
