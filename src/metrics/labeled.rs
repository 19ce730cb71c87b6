//! Shared machinery for label-dimensioned metrics.
//!
//! A [`LabeledMetric`] owns a descriptor (name, help text, ordered label
//! names) and a concurrent map from label-value tuples to accumulators. The
//! typed front ends ([`CounterVec`](super::CounterVec) and
//! [`HistogramVec`](super::HistogramVec)) only decide what an accumulator is
//! and how it is read back.

use dashmap::DashMap;

use super::error::MetricsError;

/// The kind of a registered metric, as reported in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Counter,
    Histogram,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
        }
    }
}

/// Name and help text of a metric being declared.
#[derive(Debug, Clone)]
pub struct Opts {
    pub name: String,
    pub help: String,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Opts {
            name: name.into(),
            help: help.into(),
        }
    }
}

/// Immutable description of a metric, fixed at creation time.
#[derive(Debug, Clone)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Box<[String]>,
}

impl Desc {
    pub(crate) fn new(
        opts: Opts,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Result<Self, MetricsError> {
        if !is_valid_metric_name(&opts.name) {
            return Err(MetricsError::InvalidMetricName(opts.name));
        }

        for (i, label) in label_names.iter().enumerate() {
            let reserved = kind == MetricKind::Histogram && *label == "le";
            let repeated = label_names[..i].contains(label);
            if !is_valid_label_name(label) || reserved || repeated {
                return Err(MetricsError::InvalidLabelName {
                    metric: opts.name,
                    label: label.to_string(),
                });
            }
        }

        Ok(Desc {
            name: opts.name,
            help: opts.help,
            kind,
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
        })
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A metric whose series are keyed by an ordered tuple of label values.
///
/// Keys are compared exactly: order matters and values are not normalised.
#[derive(Debug)]
pub struct LabeledMetric<A> {
    desc: Desc,
    series: DashMap<Box<[String]>, A>,
}

impl<A> LabeledMetric<A> {
    pub(crate) fn new(desc: Desc) -> Self {
        LabeledMetric {
            desc,
            series: DashMap::new(),
        }
    }

    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Number of distinct label tuples observed so far.
    pub fn cardinality(&self) -> usize {
        self.series.len()
    }

    fn check_arity(&self, label_values: &[&str]) -> Result<(), MetricsError> {
        if label_values.len() != self.desc.label_names.len() {
            return Err(MetricsError::LabelArityMismatch {
                metric: self.desc.name.clone(),
                expected: self.desc.label_names.len(),
                actual: label_values.len(),
            });
        }
        Ok(())
    }

    /// Runs `update` against the accumulator for `label_values`, creating it
    /// with `init` on first use.
    ///
    /// Existing series are updated under a shard read lock. A first-seen tuple
    /// goes through `entry`, which holds the shard write lock across the
    /// check and the insert, so racing first observations share one
    /// accumulator.
    pub(crate) fn with_series<R>(
        &self,
        label_values: &[&str],
        init: impl FnOnce() -> A,
        update: impl FnOnce(&A) -> R,
    ) -> Result<R, MetricsError> {
        self.check_arity(label_values)?;
        let key: Box<[String]> = label_values.iter().map(|v| v.to_string()).collect();

        if let Some(existing) = self.series.get(&key) {
            return Ok(update(existing.value()));
        }

        let entry = self.series.entry(key).or_insert_with(init);
        Ok(update(entry.value()))
    }

    /// Reads a single series without creating it.
    pub(crate) fn read_series<R>(
        &self,
        label_values: &[&str],
        read: impl FnOnce(&A) -> R,
    ) -> Result<Option<R>, MetricsError> {
        self.check_arity(label_values)?;
        let key: Box<[String]> = label_values.iter().map(|v| v.to_string()).collect();
        Ok(self.series.get(&key).map(|entry| read(entry.value())))
    }

    /// Reads every series, ordered by label tuple.
    pub(crate) fn read_all<R>(&self, read: impl Fn(&A) -> R) -> Vec<(Vec<String>, R)> {
        let mut out: Vec<(Vec<String>, R)> = self
            .series
            .iter()
            .map(|entry| (entry.key().to_vec(), read(entry.value())))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
