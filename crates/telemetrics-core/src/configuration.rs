//! How tracked values of a metric are aggregated.
//!
//! A `MetricConfiguration` is a plain value: two configurations are the same
//! configuration iff all their fields are equal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TelemetryError};

pub const DEFAULT_SERIES_COUNT_LIMIT: u32 = 1000;
pub const DEFAULT_VALUES_PER_DIMENSION_LIMIT: u32 = 100;

/// Aggregation applied to each data series of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    /// count, sum, min, max
    #[default]
    Measurement,
    /// last value, plus min and max
    Gauge,
}

impl AggregationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationKind::Measurement => "measurement",
            AggregationKind::Gauge => "gauge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricConfiguration {
    series_count_limit: u32,
    values_per_dimension_limit: u32,
    aggregation: AggregationKind,
}

impl Default for MetricConfiguration {
    fn default() -> Self {
        Self {
            series_count_limit: DEFAULT_SERIES_COUNT_LIMIT,
            values_per_dimension_limit: DEFAULT_VALUES_PER_DIMENSION_LIMIT,
            aggregation: AggregationKind::Measurement,
        }
    }
}

impl MetricConfiguration {
    pub fn new(series_count_limit: u32, values_per_dimension_limit: u32, aggregation: AggregationKind) -> Result<Self> {
        if series_count_limit == 0 {
            return Err(TelemetryError::InvalidArgument("series_count_limit must be at least 1".into()));
        }
        if values_per_dimension_limit == 0 {
            return Err(TelemetryError::InvalidArgument(
                "values_per_dimension_limit must be at least 1".into(),
            ));
        }
        Ok(Self {
            series_count_limit,
            values_per_dimension_limit,
            aggregation,
        })
    }

    /// Default limits, count/sum/min/max aggregation.
    pub fn measurement() -> Self {
        Self::default()
    }

    /// Default limits, last-value aggregation.
    pub fn gauge() -> Self {
        Self {
            aggregation: AggregationKind::Gauge,
            ..Self::default()
        }
    }

    pub fn series_count_limit(&self) -> u32 {
        self.series_count_limit
    }

    pub fn values_per_dimension_limit(&self) -> u32 {
        self.values_per_dimension_limit
    }

    pub fn aggregation(&self) -> AggregationKind {
        self.aggregation
    }
}

impl fmt::Display for MetricConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(series<={}, values/dim<={})",
            self.aggregation.as_str(),
            self.series_count_limit,
            self.values_per_dimension_limit
        )
    }
}
