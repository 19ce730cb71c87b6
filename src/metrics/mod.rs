//! Metrics collection and exposition for Prometheus.
//!
//! Label-dimensioned counters and histograms, the registry holding them, and
//! the HTTP metric set recorded by the instrumentation middleware.

mod atomic;
mod counter;
mod encoder;
mod error;
mod histogram;
mod labeled;
mod recorder;
mod registry;
mod snapshot;

pub use counter::CounterVec;
pub use encoder::{TextEncoder, TEXT_FORMAT};
pub use error::MetricsError;
pub use histogram::{HistogramVec, DEFAULT_BUCKETS};
pub use labeled::{Desc, LabeledMetric, MetricKind, Opts};
pub use recorder::{
    HttpMetrics, MetricsRecorder, BACKEND_CALLS_TOTAL, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
};
pub use registry::{Collector, MetricRegistry};
pub use snapshot::{HistogramSample, MetricFamily, Sample, SampleValue, Snapshot};
