//! Registry of metrics for one aggregation scope.
//!
//! `MetricIdentifier -> Arc<Metric>`, with get-or-create semantics:
//! - at most one `Metric` per identifier, even under concurrent first use
//! - a metric's configuration is fixed at creation; later lookups either omit
//!   the configuration or pass an equal one

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use telemetrics_core::error::{Result, TelemetryError};
use telemetrics_core::{MetricConfiguration, MetricIdentifier};

use crate::metric::{Metric, MetricAggregate};

pub struct MetricRegistry {
    metrics: DashMap<MetricIdentifier, Arc<Metric>>,
    default_configuration: MetricConfiguration,
    created: AtomicU64,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new(MetricConfiguration::default())
    }
}

impl MetricRegistry {
    /// `default_configuration` is used for metrics created without an explicit one.
    pub fn new(default_configuration: MetricConfiguration) -> Self {
        Self {
            metrics: DashMap::new(),
            default_configuration,
            created: AtomicU64::new(0),
        }
    }

    pub fn default_configuration(&self) -> &MetricConfiguration {
        &self.default_configuration
    }

    /// Return the metric registered under `identifier`, creating it if needed.
    ///
    /// # Configuration
    /// - `None` reuses whatever configuration the existing metric has (or the
    ///   registry default when the metric is created now).
    /// - `Some(c)` must equal the existing metric's configuration, otherwise
    ///   `ConfigurationConflict` is returned and the existing metric is untouched.
    pub fn get_or_create(
        &self,
        identifier: &MetricIdentifier,
        configuration: Option<&MetricConfiguration>,
    ) -> Result<Arc<Metric>> {
        if let Some(existing) = self.metrics.get(identifier) {
            return reuse(existing.value(), configuration);
        }

        match self.metrics.entry(identifier.clone()) {
            Entry::Occupied(e) => reuse(e.get(), configuration),
            Entry::Vacant(e) => {
                let cfg = configuration.copied().unwrap_or(self.default_configuration);
                let metric = Arc::new(Metric::new(identifier.clone(), cfg));
                e.insert(Arc::clone(&metric));
                self.created.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(metric = %identifier, configuration = %cfg, "metric created");
                Ok(metric)
            }
        }
    }

    pub fn get(&self, identifier: &MetricIdentifier) -> Option<Arc<Metric>> {
        self.metrics.get(identifier).map(|r| Arc::clone(r.value()))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Number of `Metric` constructions performed by this registry.
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Handles to every registered metric (unordered).
    pub fn metrics(&self) -> Vec<Arc<Metric>> {
        self.metrics.iter().map(|r| Arc::clone(r.value())).collect()
    }

    /// Drain the pending aggregates of every metric.
    pub fn flush(&self) -> Vec<MetricAggregate> {
        self.metrics().iter().flat_map(|m| m.flush()).collect()
    }
}

fn reuse(existing: &Arc<Metric>, requested: Option<&MetricConfiguration>) -> Result<Arc<Metric>> {
    match requested {
        Some(cfg) if cfg != existing.configuration() => Err(TelemetryError::ConfigurationConflict {
            identifier: existing.identifier().to_string(),
            existing: existing.configuration().to_string(),
            requested: cfg.to_string(),
        }),
        _ => Ok(Arc::clone(existing)),
    }
}
