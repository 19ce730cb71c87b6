//! Point-in-time copies of registry contents, handed to exposition.

use super::labeled::MetricKind;

/// Cumulative state of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSample {
    pub count: u64,
    pub sum: f64,
    /// `(upper_bound, cumulative_count)` for every finite bound, ascending.
    /// The implicit `+Inf` bucket equals `count`.
    pub buckets: Vec<(f64, u64)>,
}

impl HistogramSample {
    /// Cumulative count of the bucket whose upper bound is `le`.
    pub fn bucket(&self, le: f64) -> Option<u64> {
        self.buckets
            .iter()
            .find(|(bound, _)| *bound == le)
            .map(|(_, count)| *count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Counter(f64),
    Histogram(HistogramSample),
}

/// One series of a metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label_values: Vec<String>,
    pub value: SampleValue,
}

/// Everything known about one registered metric at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn sample(&self, label_values: &[&str]) -> Option<&Sample> {
        self.samples.iter().find(|sample| {
            sample.label_values.len() == label_values.len()
                && sample
                    .label_values
                    .iter()
                    .zip(label_values)
                    .all(|(have, want)| have.as_str() == *want)
        })
    }
}

/// Immutable copy of a registry, families ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub families: Vec<MetricFamily>,
}

impl Snapshot {
    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.iter().find(|family| family.name == name)
    }

    /// Value of a counter series, if the counter exists and has seen the tuple.
    pub fn counter(&self, name: &str, label_values: &[&str]) -> Option<f64> {
        match self.family(name)?.sample(label_values)?.value {
            SampleValue::Counter(value) => Some(value),
            SampleValue::Histogram(_) => None,
        }
    }

    /// State of a histogram series, if the histogram exists and has seen the tuple.
    pub fn histogram(&self, name: &str, label_values: &[&str]) -> Option<&HistogramSample> {
        match &self.family(name)?.sample(label_values)?.value {
            SampleValue::Histogram(sample) => Some(sample),
            SampleValue::Counter(_) => None,
        }
    }
}
