//! Endpoints of the backend service.

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Router;

use crate::metrics::HttpMetrics;
use crate::middleware::{respond, Handler, RequestInfo, ResponseSink};
use crate::state::AppState;

/// Registers the backend routes: every path not claimed elsewhere.
pub fn routes() -> Router<AppState> {
    Router::new().fallback(backend)
}

async fn backend(State(state): State<AppState>, request: Request) -> Response {
    let handler = BackendHandler {
        metrics: state.metrics,
    };
    respond(&handler, request).await
}

/// Counts the call and answers with a fixed body.
struct BackendHandler {
    metrics: HttpMetrics,
}

#[async_trait]
impl Handler for BackendHandler {
    async fn serve(&self, _request: &RequestInfo, sink: &mut dyn ResponseSink) {
        self.metrics.record_backend_call();
        sink.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        sink.write(b"Service B response");
    }
}
