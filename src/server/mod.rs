//! HTTP API for line controllers and dashboards.

pub mod handlers;
pub mod payload;

use crate::core::retention::RetentionTask;
use crate::core::service::LineService;
use crate::errors::{AppError, AppResult};
use axum::{
    Router,
    routing::{get, post},
};
use chrono::Utc;
use handlers::SharedService;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Build the API router around a shared service.
pub fn build_router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/set-mode", post(handlers::set_mode))
        .route("/job-done", post(handlers::job_done))
        .route("/mode-status", get(handlers::mode_status))
        .route("/job-event", get(handlers::job_event))
        .route("/graph-data", get(handlers::graph_data))
        .route("/set-target", post(handlers::set_target))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Server settings resolved from config and CLI flags.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub bind_address: String,
    pub port: u16,
    pub sweep_interval: Duration,
}

/// Startup retention pass, periodic retention task, then serve until Ctrl-C.
pub async fn serve(service: Arc<LineService>, opts: ServeOptions) -> AppResult<()> {
    // Startup safety: prune whatever went stale while the server was down.
    let sweeper = service.retention().clone();
    match sweeper.run(Utc::now()) {
        Ok(stats) => info!(
            cycles = stats.cycles_removed,
            breaks = stats.breaks_removed,
            "startup cleanup done"
        ),
        Err(e) => warn!("startup cleanup failed: {}", e),
    }

    if !opts.sweep_interval.is_zero() {
        let task = RetentionTask::new(sweeper, opts.sweep_interval);
        tokio::spawn(task.start());
    }

    let addr = format!("{}:{}", opts.bind_address, opts.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("cannot bind {addr}: {e}")))?;

    info!("Starting line API server on {}", addr);

    if let Err(e) = service.store().audit("serve", &addr, "API server started") {
        warn!("failed to write internal log: {}", e);
    }

    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
