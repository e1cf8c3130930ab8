use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use super::state::ServerState;
use super::{log_requests, ServerConfig};
use crate::inference::InferenceProvider;
use crate::items::{format_timestamp, ItemStore};
use crate::mcp::mcp_handler;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthyStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: String,
    pub version: String,
}

#[derive(Serialize)]
struct UnhealthyStatus {
    pub status: &'static str,
    pub error: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> Response {
    match state.item_store.health_check() {
        Ok(()) => Json(HealthyStatus {
            status: "healthy",
            timestamp: format_timestamp(&chrono::Utc::now()),
            uptime: format_uptime(state.start_time.elapsed()),
            version: format!("{}-{}", env!("CARGO_PKG_VERSION"), state.hash),
        })
        .into_response(),
        Err(err) => {
            warn!("Health check failed: {:#}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(UnhealthyStatus {
                    status: "unhealthy",
                    error: format!("{:#}", err),
                }),
            )
                .into_response()
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    item_store: Arc<dyn ItemStore>,
    inference: Arc<dyn InferenceProvider>,
) -> Router {
    let state = ServerState::new(config, item_store, inference);

    Router::new()
        .route("/health", get(health))
        .route("/mcp", post(mcp_handler))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

pub async fn run_server(
    config: ServerConfig,
    item_store: Arc<dyn ItemStore>,
    inference: Arc<dyn InferenceProvider>,
) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, item_store, inference);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Ready to serve at {}!", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
