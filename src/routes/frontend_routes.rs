//! Endpoints of the frontend service.

use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::{debug, warn};

use crate::config::UpstreamConfig;
use crate::state::AppState;
use crate::utils::http_helpers::HTTPError;

/// Registers the frontend routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hello", get(hello))
        .fallback(not_found)
}

/// Calls the upstream, then greets.
///
/// The upstream outcome never changes the answer: failures are only logged.
async fn hello(State(state): State<AppState>) -> impl IntoResponse {
    if let Some(upstream) = &state.config.upstream {
        call_upstream(&state.http_client, upstream).await;
    }
    "Service A response"
}

async fn call_upstream(client: &reqwest::Client, upstream: &UpstreamConfig) {
    let result = client
        .get(&upstream.url)
        .timeout(Duration::from_millis(upstream.timeout_in_ms))
        .send()
        .await;

    match result {
        Ok(response) => {
            debug!(url = %upstream.url, status = response.status().as_u16(), "Upstream answered");
        }
        Err(e) => {
            warn!(url = %upstream.url, error = %e, "Error calling upstream");
        }
    }
}

async fn not_found(uri: Uri) -> HTTPError {
    HTTPError::new(StatusCode::NOT_FOUND, format!("No route for {}", uri.path()))
}
