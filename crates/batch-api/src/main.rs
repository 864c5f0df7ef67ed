//! Batch ingestion API server: POST /ingest, GET /status/:ingestion_id.

use batch_api::config::ServerConfig;
use batch_api::server::{self, AppState};
use batch_exec::{DelayExecutor, HttpExecutor};
use batch_scheduler::{InMemoryScheduler, SchedulerConfig};
use batch_types::BatchExecutor;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let executor: Arc<dyn BatchExecutor + Send + Sync> = match HttpExecutor::from_env() {
        Some(http) => {
            tracing::info!(
                url = %http.url(),
                timeout_ms = http.timeout().as_millis() as u64,
                "batches go to downstream HTTP executor"
            );
            Arc::new(http)
        }
        None => {
            let delay = DelayExecutor::from_env();
            tracing::info!(
                delay_ms = delay.delay().as_millis() as u64,
                "batches use simulated delay"
            );
            Arc::new(delay)
        }
    };
    let sched_config = SchedulerConfig::from_env();
    tracing::info!(
        workers = sched_config.workers,
        max_attempts = sched_config.retry.max_attempts,
        "starting scheduler"
    );
    let scheduler = Arc::new(InMemoryScheduler::new(executor, sched_config));

    let app = server::router(Arc::new(AppState { scheduler }));
    let config = ServerConfig::from_env()?;
    tracing::info!("batch ingestion API listening on {}", config.listen);
    axum::serve(
        tokio::net::TcpListener::bind(config.listen).await?,
        app.into_make_service(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown requested");
    })
    .await?;
    Ok(())
}
