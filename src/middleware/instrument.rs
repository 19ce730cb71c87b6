//! Request measurement and the sink-style instrumentation wrapper.

use std::thread;
use std::time::Instant;

use async_trait::async_trait;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, StatusCode};
use tracing::debug;

use super::status::{ResponseSink, StatusCapturingResponder};
use crate::metrics::MetricsRecorder;

/// Status label used when the caller stopped waiting before the handler
/// finished (the request future was dropped).
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Measures one request and records it when dropped.
///
/// Recording lives in `Drop` so it happens on every exit path: a normal
/// [`finish`](Self::finish), an error reported through
/// [`fail`](Self::fail), a panic unwinding through the owner (counted as
/// `500`) and cancellation (counted as [`CLIENT_CLOSED_REQUEST`]).
pub struct RequestMeasurement<R: MetricsRecorder> {
    recorder: R,
    method: String,
    path: String,
    start: Instant,
    outcome: Option<u16>,
}

impl<R: MetricsRecorder> RequestMeasurement<R> {
    pub fn start(recorder: R, method: impl Into<String>, path: impl Into<String>) -> Self {
        RequestMeasurement {
            recorder,
            method: method.into(),
            path: path.into(),
            start: Instant::now(),
            outcome: None,
        }
    }

    /// Records the request with the status the handler produced.
    pub fn finish(mut self, status: StatusCode) {
        self.outcome = Some(status.as_u16());
    }

    /// Records the request as a server error.
    pub fn fail(mut self) {
        self.outcome = Some(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
    }
}

impl<R: MetricsRecorder> Drop for RequestMeasurement<R> {
    fn drop(&mut self) {
        let status = match self.outcome {
            Some(status) => status,
            None if thread::panicking() => StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            None => CLIENT_CLOSED_REQUEST,
        };
        let elapsed = self.start.elapsed();
        let status = status.to_string();

        self.recorder
            .record_request(&self.method, &self.path, &status);
        self.recorder
            .record_request_duration(&self.method, &self.path, elapsed.as_secs_f64());

        debug!(
            method = %self.method,
            path = %self.path,
            status = %status,
            latency_ms = elapsed.as_secs_f64() * 1000.0,
            "Request completed"
        );
    }
}

/// What a sink-style handler knows about the request it serves.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        RequestInfo {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }

    pub fn from_parts(parts: &Parts) -> Self {
        RequestInfo {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
        }
    }
}

/// Request handling logic that writes its response into a sink.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, request: &RequestInfo, sink: &mut dyn ResponseSink);
}

/// Wraps a [`Handler`] and records `http_requests_total` and
/// `http_request_duration_seconds` for every request it serves.
///
/// The wrapped handler sees a [`StatusCapturingResponder`] in place of the
/// real sink; body, headers and status reach the caller unchanged.
pub struct Instrumented<H, R> {
    inner: H,
    recorder: R,
}

impl<H: Handler, R: MetricsRecorder> Instrumented<H, R> {
    pub fn new(inner: H, recorder: R) -> Self {
        Instrumented { inner, recorder }
    }
}

#[async_trait]
impl<H: Handler, R: MetricsRecorder> Handler for Instrumented<H, R> {
    async fn serve(&self, request: &RequestInfo, sink: &mut dyn ResponseSink) {
        let measurement = RequestMeasurement::start(
            self.recorder.clone(),
            request.method.as_str(),
            request.path.as_str(),
        );
        let mut responder = StatusCapturingResponder::new(sink);

        self.inner.serve(request, &mut responder).await;

        measurement.finish(responder.status());
    }
}
