//! Fixed-bucket histograms dimensioned by labels.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::atomic::AtomicF64;
use super::error::MetricsError;
use super::labeled::{Desc, LabeledMetric, MetricKind, Opts};
use super::registry::Collector;
use super::snapshot::{HistogramSample, MetricFamily, Sample, SampleValue};

/// Request latency buckets in seconds.
pub const DEFAULT_BUCKETS: &[f64] = &[0.1, 0.2, 0.5, 1.0, 2.0];

/// Per-series state.
///
/// Each observation bumps exactly one slot (the first bound `>= v`, or the
/// trailing `+Inf` slot). Cumulative counts and the total are summed up at
/// read time, which keeps every read cumulative and never lets the `+Inf`
/// bucket disagree with the count. The sum is a separate atomic and may lag
/// the buckets by in-flight observations.
#[derive(Debug)]
struct HistogramState {
    slots: Box<[AtomicU64]>,
    sum: AtomicF64,
}

impl HistogramState {
    fn new(bounds: usize) -> Self {
        HistogramState {
            slots: (0..=bounds).map(|_| AtomicU64::new(0)).collect(),
            sum: AtomicF64::default(),
        }
    }

    fn observe(&self, slot: usize, value: f64) {
        self.slots[slot].fetch_add(1, Ordering::Relaxed);
        self.sum.add(value);
    }

    fn sample(&self, bounds: &[f64]) -> HistogramSample {
        let mut cumulative = 0;
        let mut buckets = Vec::with_capacity(bounds.len());
        for (bound, slot) in bounds.iter().zip(self.slots.iter()) {
            cumulative += slot.load(Ordering::Relaxed);
            buckets.push((*bound, cumulative));
        }
        let count = cumulative + self.slots[bounds.len()].load(Ordering::Relaxed);

        HistogramSample {
            count,
            sum: self.sum.get(),
            buckets,
        }
    }
}

/// A family of histograms sharing one set of bucket bounds.
#[derive(Clone, Debug)]
pub struct HistogramVec {
    inner: Arc<LabeledMetric<HistogramState>>,
    bounds: Arc<[f64]>,
}

impl HistogramVec {
    /// Declares a histogram. `buckets` are upper bounds and must be strictly
    /// ascending; a trailing `+Inf` is accepted and dropped since that bucket
    /// is always implied.
    pub fn new(opts: Opts, label_names: &[&str], buckets: &[f64]) -> Result<Self, MetricsError> {
        let bounds = check_buckets(&opts.name, buckets)?;
        let desc = Desc::new(opts, MetricKind::Histogram, label_names)?;
        Ok(HistogramVec {
            inner: Arc::new(LabeledMetric::new(desc)),
            bounds,
        })
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Records `value` into the series for `label_values`.
    pub fn observe(&self, label_values: &[&str], value: f64) -> Result<(), MetricsError> {
        if value.is_nan() {
            return Err(MetricsError::InvalidValue {
                metric: self.inner.desc().name.clone(),
                value,
            });
        }
        let slot = self.bounds.partition_point(|bound| *bound < value);
        self.inner.with_series(
            label_values,
            || HistogramState::new(self.bounds.len()),
            |state| state.observe(slot, value),
        )
    }

    /// Records a duration in seconds.
    pub fn observe_duration(
        &self,
        label_values: &[&str],
        elapsed: Duration,
    ) -> Result<(), MetricsError> {
        self.observe(label_values, elapsed.as_secs_f64())
    }

    /// Current state of a series, `None` if the tuple was never observed.
    pub fn get(&self, label_values: &[&str]) -> Result<Option<HistogramSample>, MetricsError> {
        self.inner
            .read_series(label_values, |state| state.sample(&self.bounds))
    }

    pub fn cardinality(&self) -> usize {
        self.inner.cardinality()
    }
}

fn check_buckets(metric: &str, buckets: &[f64]) -> Result<Arc<[f64]>, MetricsError> {
    let invalid = |reason: &str| MetricsError::InvalidBuckets {
        metric: metric.to_string(),
        reason: reason.to_string(),
    };

    let bounds = match buckets.split_last() {
        Some((last, rest)) if *last == f64::INFINITY => rest,
        _ => buckets,
    };
    if bounds.is_empty() {
        return Err(invalid("at least one finite bucket is required"));
    }
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(invalid("bucket bounds must be finite"));
    }
    if bounds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("bucket bounds must be strictly ascending"));
    }
    Ok(bounds.into())
}

impl Collector for HistogramVec {
    fn desc(&self) -> &Desc {
        self.inner.desc()
    }

    fn collect(&self) -> MetricFamily {
        let desc = self.inner.desc();
        let samples = self
            .inner
            .read_all(|state| state.sample(&self.bounds))
            .into_iter()
            .map(|(label_values, sample)| Sample {
                label_values,
                value: SampleValue::Histogram(sample),
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
