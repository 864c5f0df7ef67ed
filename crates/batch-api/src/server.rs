//! Axum server and routes.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use batch_scheduler::{Scheduler, SchedulerError};
use batch_types::{ErrorResponse, IngestRequest, IngestResponse, Ingestion, Priority};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub scheduler: Arc<dyn Scheduler + Send + Sync>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ingest", post(handle_ingest))
        .route("/status/:ingestion_id", get(handle_status))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Error surfaced to HTTP clients as `{"error": ...}` with a matching status code.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SchedulerError> for ApiError {
    fn from(e: SchedulerError) -> Self {
        match e {
            SchedulerError::InvalidSubmission(msg) => ApiError::BadRequest(msg),
            SchedulerError::NotFound(_) => ApiError::NotFound("Ingestion not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Shape checks done before the request reaches the scheduler.
pub fn validate_ingest(
    req: IngestRequest,
) -> Result<(Vec<serde_json::Value>, Priority), ApiError> {
    let ids = match req.ids {
        Some(serde_json::Value::Array(ids)) if !ids.is_empty() => ids,
        _ => return Err(ApiError::BadRequest("Invalid ids array".to_string())),
    };
    let priority = req
        .priority
        .as_ref()
        .and_then(|p| p.as_str())
        .and_then(|p| p.parse::<Priority>().ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid priority".to_string()))?;
    Ok((ids, priority))
}

async fn handle_ingest(
    State(state): State<Arc<AppState>>,
    body: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(req) = body.map_err(|e| {
        tracing::debug!(error = %e, "rejected ingest body");
        ApiError::BadRequest("Invalid request body".to_string())
    })?;
    let (ids, priority) = validate_ingest(req)?;
    let ingestion_id = state.scheduler.submit(ids, priority).await?;
    Ok(Json(IngestResponse { ingestion_id }))
}

async fn handle_status(
    State(state): State<Arc<AppState>>,
    Path(ingestion_id): Path<String>,
) -> Result<Json<Ingestion>, ApiError> {
    let ingestion = state.scheduler.status(&ingestion_id).await?;
    Ok(Json(ingestion))
}

async fn handle_health() -> &'static str {
    "ok"
}
