//! Metrics exposition endpoint.

use crate::metrics::TEXT_FORMAT;
use crate::state::AppState;
use axum::{extract::State, http::header, http::StatusCode, response::IntoResponse, routing::get, Router};

/// Creates the metrics route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Handler for the /metrics endpoint.
///
/// Returns a snapshot of the registry in Prometheus text format.
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics_text = state.metrics.render();

    (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], metrics_text)
}
