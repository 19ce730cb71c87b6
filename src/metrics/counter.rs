//! Monotonic counters dimensioned by labels.

use std::sync::Arc;

use super::atomic::AtomicF64;
use super::error::MetricsError;
use super::labeled::{Desc, LabeledMetric, MetricKind, Opts};
use super::registry::Collector;
use super::snapshot::{MetricFamily, Sample, SampleValue};

/// A family of counters, one per label-value tuple.
///
/// Cloning is cheap and every clone updates the same series, so a handle can
/// be registered and kept for recording at the same time.
#[derive(Clone, Debug)]
pub struct CounterVec {
    inner: Arc<LabeledMetric<AtomicF64>>,
}

impl CounterVec {
    pub fn new(opts: Opts, label_names: &[&str]) -> Result<Self, MetricsError> {
        let desc = Desc::new(opts, MetricKind::Counter, label_names)?;
        Ok(CounterVec {
            inner: Arc::new(LabeledMetric::new(desc)),
        })
    }

    /// Increments the series for `label_values` by one.
    pub fn inc(&self, label_values: &[&str]) -> Result<(), MetricsError> {
        self.inc_by(label_values, 1.0)
    }

    /// Increments the series for `label_values` by `amount`.
    ///
    /// Counters never go down: negative, infinite and `NaN` amounts are
    /// rejected before anything is touched.
    pub fn inc_by(&self, label_values: &[&str], amount: f64) -> Result<(), MetricsError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(MetricsError::InvalidValue {
                metric: self.inner.desc().name.clone(),
                value: amount,
            });
        }
        self.inner
            .with_series(label_values, AtomicF64::default, |value| value.add(amount))
    }

    /// Current value of a series; unseen tuples read as zero.
    pub fn get(&self, label_values: &[&str]) -> Result<f64, MetricsError> {
        let value = self.inner.read_series(label_values, AtomicF64::get)?;
        Ok(value.unwrap_or(0.0))
    }

    pub fn cardinality(&self) -> usize {
        self.inner.cardinality()
    }
}

impl Collector for CounterVec {
    fn desc(&self) -> &Desc {
        self.inner.desc()
    }

    fn collect(&self) -> MetricFamily {
        let desc = self.inner.desc();
        let samples = self
            .inner
            .read_all(AtomicF64::get)
            .into_iter()
            .map(|(label_values, value)| Sample {
                label_values,
                value: SampleValue::Counter(value),
            })
            .collect();

        MetricFamily {
            name: desc.name.clone(),
            help: desc.help.clone(),
            kind: desc.kind,
            label_names: desc.label_names.to_vec(),
            samples,
        }
    }
}
