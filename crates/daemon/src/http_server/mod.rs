use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

pub mod admin;
pub mod api;
mod config;
mod handlers;
mod health;

pub use config::Config;

use crate::ServiceState;

const API_PREFIX: &str = "/api";
const ADMIN_PREFIX: &str = "/admin";
const STATUS_PREFIX: &str = "/_status";

/// Request bodies are small JSON documents
pub const MAX_BODY_SIZE_BYTES: usize = 64 * 1024;

/// Routes served by the public API listener: /_status + /api
pub fn api_router(config: &Config, state: ServiceState) -> Router {
    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(API_PREFIX, api::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES))
        .layer(Extension(config.clone()))
        .with_state(state)
}

/// Routes served by the admin listener: /_status + /admin
pub fn admin_router(config: &Config, state: ServiceState) -> Router {
    Router::new()
        .nest(STATUS_PREFIX, health::router(state.clone()))
        .nest(ADMIN_PREFIX, admin::router(state.clone()))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE_BYTES))
        .layer(Extension(config.clone()))
        .with_state(state)
}

/// Run the public API HTTP server (bucket lifecycle, capability-authenticated).
pub async fn run_api(
    config: Config,
    state: ServiceState,
    shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let router = api_router(&config, state);
    serve("API", config, router, shutdown_rx).await
}

/// Run the admin HTTP server (projects and keys, unauthenticated, loopback only).
pub async fn run_admin(
    config: Config,
    state: ServiceState,
    shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    if !config.listen_addr.ip().is_loopback() {
        tracing::warn!(addr = ?config.listen_addr, "admin server bound to a non-loopback address");
    }
    let router = admin_router(&config, state);
    serve("Admin", config, router, shutdown_rx).await
}

async fn serve(
    name: &str,
    config: Config,
    router: Router,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));
    let router = router.layer(trace_layer);

    tracing::info!(addr = ?listen_addr, "{} server listening", name);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
