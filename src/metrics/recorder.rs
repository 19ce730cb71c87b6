//! The HTTP metric set and the recording interface used by the middleware.

use tracing::error;

use super::counter::CounterVec;
use super::encoder::TextEncoder;
use super::error::MetricsError;
use super::histogram::HistogramVec;
use super::labeled::Opts;
use super::registry::MetricRegistry;

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const BACKEND_CALLS_TOTAL: &str = "backend_calls_total";

/// Trait for recording per-request HTTP metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Counts one completed request.
    fn record_request(&self, method: &str, path: &str, status: &str);

    /// Records how long a request took.
    fn record_request_duration(&self, method: &str, path: &str, duration_secs: f64);
}

/// Prometheus metrics for the HTTP surface of a service.
#[derive(Clone)]
pub struct HttpMetrics {
    registry: MetricRegistry,

    requests_total: CounterVec,
    request_duration_seconds: HistogramVec,

    // Only registered by services answering as the backend.
    backend_calls_total: Option<CounterVec>,
}

impl HttpMetrics {
    /// Declares the request metrics in `registry`.
    ///
    /// # Errors
    ///
    /// Fails if either name is already taken or `buckets` is not a valid
    /// ascending sequence. Both are startup configuration mistakes.
    pub fn new(registry: &MetricRegistry, buckets: &[f64]) -> Result<Self, MetricsError> {
        let requests_total = registry.counter_vec(
            Opts::new(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;

        let request_duration_seconds = registry.histogram_vec(
            Opts::new(HTTP_REQUEST_DURATION_SECONDS, "HTTP request durations"),
            &["method", "path"],
            buckets,
        )?;

        Ok(HttpMetrics {
            registry: registry.clone(),
            requests_total,
            request_duration_seconds,
            backend_calls_total: None,
        })
    }

    /// Adds the backend call counter.
    pub fn with_backend_calls(mut self) -> Result<Self, MetricsError> {
        let counter = self.registry.counter_vec(
            Opts::new(BACKEND_CALLS_TOTAL, "Total number of calls to the backend service"),
            &[],
        )?;
        self.backend_calls_total = Some(counter);
        Ok(self)
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    pub fn record_backend_call(&self) {
        if let Some(counter) = &self.backend_calls_total {
            report(counter.inc(&[]));
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        TextEncoder::new().encode(&self.registry.snapshot())
    }
}

impl MetricsRecorder for HttpMetrics {
    fn record_request(&self, method: &str, path: &str, status: &str) {
        report(self.requests_total.inc(&[method, path, status]));
    }

    fn record_request_duration(&self, method: &str, path: &str, duration_secs: f64) {
        report(
            self.request_duration_seconds
                .observe(&[method, path], duration_secs),
        );
    }
}

// The label sets above are fixed at compile time, so an error here is a bug.
fn report(result: Result<(), MetricsError>) {
    if let Err(e) = result {
        error!(error = %e, "Failed to record metric");
        debug_assert!(false, "metric recording failed: {e}");
    }
}
