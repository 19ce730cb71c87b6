//! Application startup and server initialization.
//!
//! This module builds the metric registry and the application state, wires
//! the routes and serves them until a shutdown signal arrives.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::{ConfigV1, ServiceRole};
use crate::metrics::{HttpMetrics, MetricRegistry, MetricsError};
use crate::routes;
use crate::state::AppState;

/// Declares the metric set for the configured role in a fresh registry.
///
/// # Errors
///
/// Any registration error is a configuration mistake and must stop startup.
pub fn build_metrics(config: &ConfigV1) -> Result<HttpMetrics, MetricsError> {
    let registry = MetricRegistry::new();
    let metrics = HttpMetrics::new(&registry, &config.metrics.duration_buckets)?;
    match config.service.role {
        ServiceRole::Backend => metrics.with_backend_calls(),
        ServiceRole::Frontend => Ok(metrics),
    }
}

/// Builds the shared state handed to every handler.
pub fn build_state(config: Arc<ConfigV1>) -> Result<AppState, Box<dyn std::error::Error>> {
    let metrics = build_metrics(&config)?;
    let http_client = reqwest::Client::builder().build()?;

    if config.service.role == ServiceRole::Frontend && config.upstream.is_none() {
        warn!("No upstream configured; /hello will answer without calling it");
    }

    Ok(AppState {
        config,
        metrics,
        http_client,
    })
}

/// Initializes and runs the application server.
///
/// # Errors
///
/// Returns an error if the metrics cannot be declared, the server fails to
/// bind to the configured address, or serving fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config.clone())?;
    let app = routes::create_router(state);

    info!(
        service = %config.service.name,
        role = config.service.role.as_str(),
        "Starting server on {}",
        config.bind_address
    );

    let listener = TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
