//! `Metric`: an aggregation container bound to one identifier and one
//! configuration for its whole life.
//!
//! Each distinct tuple of dimension values gets its own data series. Series
//! are created lazily on the first tracked value, within the limits of the
//! metric's configuration.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashmap::DashMap;
use serde::Serialize;

use telemetrics_core::error::{Result, TelemetryError};
use telemetrics_core::{AggregationKind, MetricConfiguration, MetricIdentifier};

pub struct Metric {
    identifier: MetricIdentifier,
    configuration: MetricConfiguration,
    series: DashMap<Vec<String>, Arc<MetricSeries>>,
    /// Distinct values seen per dimension position. Also serializes series creation.
    index: Mutex<Vec<HashSet<String>>>,
}

impl Metric {
    pub(crate) fn new(identifier: MetricIdentifier, configuration: MetricConfiguration) -> Self {
        let index = vec![HashSet::new(); identifier.dimension_count()];
        Self {
            identifier,
            configuration,
            series: DashMap::new(),
            index: Mutex::new(index),
        }
    }

    pub fn identifier(&self) -> &MetricIdentifier {
        &self.identifier
    }

    pub fn configuration(&self) -> &MetricConfiguration {
        &self.configuration
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Track one value for the given dimension values (one per dimension name, in order).
    ///
    /// Returns `Ok(false)` when the value was dropped because a new series
    /// would exceed the configured limits.
    pub fn track_value(&self, value: f64, dimension_values: &[&str]) -> Result<bool> {
        if !value.is_finite() {
            return Err(TelemetryError::InvalidArgument(format!(
                "metric {}: tracked value must be finite, got {value}",
                self.identifier
            )));
        }
        let key = self.series_key(dimension_values)?;

        if let Some(series) = self.existing_series(&key) {
            series.track(value);
            return Ok(true);
        }

        match self.create_series(key) {
            Some(series) => {
                series.track(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drain every series that received values since the previous flush.
    pub fn flush(&self) -> Vec<MetricAggregate> {
        let all: Vec<Arc<MetricSeries>> = self.series.iter().map(|r| Arc::clone(r.value())).collect();
        all.iter().filter_map(|s| s.take(self)).collect()
    }

    fn series_key(&self, dimension_values: &[&str]) -> Result<Vec<String>> {
        let expected = self.identifier.dimension_count();
        if dimension_values.len() != expected {
            return Err(TelemetryError::InvalidArgument(format!(
                "metric {}: expected {expected} dimension values, got {}",
                self.identifier,
                dimension_values.len()
            )));
        }
        dimension_values
            .iter()
            .zip(self.identifier.dimension_names())
            .map(|(v, name)| {
                let v = v.trim();
                if v.is_empty() {
                    Err(TelemetryError::InvalidArgument(format!(
                        "metric {}: value for dimension {name:?} must not be empty",
                        self.identifier
                    )))
                } else {
                    Ok(v.to_string())
                }
            })
            .collect()
    }

    fn existing_series(&self, key: &[String]) -> Option<Arc<MetricSeries>> {
        self.series.get(key).map(|r| Arc::clone(r.value()))
    }

    fn create_series(&self, key: Vec<String>) -> Option<Arc<MetricSeries>> {
        let mut index = lock(&self.index);

        // Another caller may have created it while we waited.
        if let Some(series) = self.existing_series(&key) {
            return Some(series);
        }

        if self.series.len() >= self.configuration.series_count_limit() as usize {
            tracing::debug!(metric = %self.identifier, limit = self.configuration.series_count_limit(), "series count limit reached; value dropped");
            return None;
        }

        let per_dim_limit = self.configuration.values_per_dimension_limit() as usize;
        for (seen, value) in index.iter().zip(&key) {
            if !seen.contains(value) && seen.len() >= per_dim_limit {
                tracing::debug!(metric = %self.identifier, value = %value, limit = per_dim_limit, "values-per-dimension limit reached; value dropped");
                return None;
            }
        }
        for (seen, value) in index.iter_mut().zip(&key) {
            seen.insert(value.clone());
        }

        let series = Arc::new(MetricSeries::new(key.clone()));
        self.series.insert(key, Arc::clone(&series));
        Some(series)
    }
}

impl std::fmt::Debug for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metric")
            .field("identifier", &self.identifier)
            .field("configuration", &self.configuration)
            .field("series", &self.series.len())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One aggregation cell: a metric restricted to one tuple of dimension values.
struct MetricSeries {
    dimension_values: Vec<String>,
    state: Mutex<SeriesState>,
}

#[derive(Default)]
struct SeriesState {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl MetricSeries {
    fn new(dimension_values: Vec<String>) -> Self {
        Self {
            dimension_values,
            state: Mutex::new(SeriesState::default()),
        }
    }

    fn track(&self, value: f64) {
        let mut s = lock(&self.state);
        if s.count == 0 {
            s.min = value;
            s.max = value;
        } else {
            s.min = s.min.min(value);
            s.max = s.max.max(value);
        }
        s.count += 1;
        s.sum += value;
        s.last = value;
    }

    fn take(&self, metric: &Metric) -> Option<MetricAggregate> {
        let s = std::mem::take(&mut *lock(&self.state));
        if s.count == 0 {
            return None;
        }

        let id = metric.identifier();
        let aggregation = metric.configuration().aggregation();
        let dimensions = id
            .dimension_names()
            .iter()
            .cloned()
            .zip(self.dimension_values.iter().cloned())
            .collect();

        Some(MetricAggregate {
            namespace: id.namespace().to_string(),
            id: id.id().to_string(),
            dimensions,
            aggregation,
            count: s.count,
            sum: (aggregation == AggregationKind::Measurement).then_some(s.sum),
            min: s.min,
            max: s.max,
            last: (aggregation == AggregationKind::Gauge).then_some(s.last),
        })
    }
}

/// Aggregated values of one data series over one flush period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAggregate {
    pub namespace: String,
    pub id: String,
    pub dimensions: BTreeMap<String, String>,
    pub aggregation: AggregationKind,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<f64>,
}
