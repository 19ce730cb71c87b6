//! Errors raised by metric declaration, registration and observation.

use thiserror::Error;

/// Failures of the metrics core.
///
/// None of these are per-request conditions: they signal a mistake in how a
/// metric was declared or called, and callers are expected to surface them
/// immediately rather than retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("a metric named '{0}' is already registered")]
    DuplicateMetricName(String),

    #[error("metric '{metric}' expects {expected} label values, got {actual}")]
    LabelArityMismatch {
        metric: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid metric name '{0}'")]
    InvalidMetricName(String),

    #[error("invalid label name '{label}' for metric '{metric}'")]
    InvalidLabelName { metric: String, label: String },

    #[error("invalid buckets for metric '{metric}': {reason}")]
    InvalidBuckets { metric: String, reason: String },

    #[error("invalid value {value} for metric '{metric}'")]
    InvalidValue { metric: String, value: f64 },
}
