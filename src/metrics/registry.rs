//! The registry that owns every declared metric.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::counter::CounterVec;
use super::error::MetricsError;
use super::histogram::HistogramVec;
use super::labeled::{Desc, Opts};
use super::snapshot::{MetricFamily, Snapshot};

/// Anything the registry can hold and read back.
pub trait Collector: Send + Sync + 'static {
    fn desc(&self) -> &Desc;

    /// Copies the current state of every series.
    fn collect(&self) -> MetricFamily;
}

/// Collection of named metrics.
///
/// Built once at startup and shared through the application state; there is
/// no global instance. Names are unique and registrations are permanent.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: Arc<DashMap<String, Arc<dyn Collector>>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metric. A second metric with an existing name is refused and the
    /// first one stays as it was.
    pub fn register<C: Collector>(&self, metric: C) -> Result<(), MetricsError> {
        let name = metric.desc().name.clone();
        match self.metrics.entry(name) {
            Entry::Occupied(entry) => Err(MetricsError::DuplicateMetricName(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(metric = %entry.key(), "Registered metric");
                entry.insert(Arc::new(metric));
                Ok(())
            }
        }
    }

    /// Declares and registers a counter family, returning a handle to it.
    pub fn counter_vec(&self, opts: Opts, label_names: &[&str]) -> Result<CounterVec, MetricsError> {
        let counter = CounterVec::new(opts, label_names)?;
        self.register(counter.clone())?;
        Ok(counter)
    }

    /// Declares and registers a histogram family, returning a handle to it.
    pub fn histogram_vec(
        &self,
        opts: Opts,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<HistogramVec, MetricsError> {
        let histogram = HistogramVec::new(opts, label_names, buckets)?;
        self.register(histogram.clone())?;
        Ok(histogram)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Copies every registered metric, ordered by name.
    ///
    /// Each series is read atomically on its own; the snapshot as a whole is
    /// not a single instant across series.
    pub fn snapshot(&self) -> Snapshot {
        let collectors: Vec<Arc<dyn Collector>> = self
            .metrics
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        let mut families: Vec<MetricFamily> = collectors.iter().map(|c| c.collect()).collect();
        families.sort_by(|a, b| a.name.cmp(&b.name));
        Snapshot { families }
    }
}
