use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::metrics::DEFAULT_BUCKETS;

/// Metric declaration settings.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct MetricsConfig {
    #[serde(default)]
    pub path_label: PathLabel,
    /// Upper bounds of the request duration histogram, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            path_label: PathLabel::default(),
            duration_buckets: default_duration_buckets(),
        }
    }
}

fn default_duration_buckets() -> Vec<f64> {
    DEFAULT_BUCKETS.to_vec()
}

/// What goes into the `path` label.
///
/// `raw` uses the literal request path, so every distinct path becomes its
/// own series. `matched` uses the route template (`/users/:id`) when the
/// router matched one and the raw path otherwise.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PathLabel {
    #[default]
    Raw,
    Matched,
}
