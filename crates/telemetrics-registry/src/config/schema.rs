use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use telemetrics_core::configuration::{DEFAULT_SERIES_COUNT_LIMIT, DEFAULT_VALUES_PER_DIMENSION_LIMIT};
use telemetrics_core::error::{Result, TelemetryError};
use telemetrics_core::{AggregationKind, AggregationScope, MetricConfiguration, MetricIdentifier};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySettings {
    pub version: u32,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    #[serde(default)]
    pub defaults: MetricSection,

    /// Named metric configurations referenced by `metrics[].preset`.
    #[serde(default)]
    pub presets: BTreeMap<String, MetricSection>,

    /// Metrics created at startup.
    #[serde(default)]
    pub metrics: Vec<MetricDeclaration>,
}

impl TelemetrySettings {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TelemetryError::Config(format!("unsupported version {}", self.version)));
        }
        if !(1_000..=3_600_000).contains(&self.flush_interval_ms) {
            return Err(TelemetryError::Config(
                "flush_interval_ms must be between 1000 and 3600000".into(),
            ));
        }

        self.defaults
            .to_configuration()
            .map_err(|e| TelemetryError::Config(format!("defaults: {e}")))?;
        for (name, preset) in &self.presets {
            preset
                .to_configuration()
                .map_err(|e| TelemetryError::Config(format!("presets.{name}: {e}")))?;
        }

        // The agent feeds metrics by `namespace/id`, so that pair must be unique.
        let mut names = HashSet::new();
        for (i, m) in self.metrics.iter().enumerate() {
            let identifier = m
                .identifier()
                .map_err(|e| TelemetryError::Config(format!("metrics[{i}]: {e}")))?;
            let name = format!("{}/{}", identifier.namespace(), identifier.id());
            if !names.insert(name.clone()) {
                return Err(TelemetryError::Config(format!(
                    "metrics[{i}]: {name} is declared more than once"
                )));
            }
            if let Some(preset) = &m.preset {
                if !self.presets.contains_key(preset) {
                    return Err(TelemetryError::Config(format!(
                        "metrics[{i}]: unknown preset {preset:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Configuration to use for a declaration: its preset, or `None` for the default.
    pub fn configuration_for(&self, m: &MetricDeclaration) -> Result<Option<MetricConfiguration>> {
        let Some(name) = &m.preset else { return Ok(None) };
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| TelemetryError::Config(format!("unknown preset {name:?}")))?;
        preset.to_configuration().map(Some)
    }
}

fn default_flush_interval_ms() -> u64 {
    60_000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricSection {
    #[serde(default = "default_series_count_limit")]
    pub series_count_limit: u32,

    #[serde(default = "default_values_per_dimension_limit")]
    pub values_per_dimension_limit: u32,

    #[serde(default)]
    pub aggregation: AggregationKind,
}

impl Default for MetricSection {
    fn default() -> Self {
        Self {
            series_count_limit: default_series_count_limit(),
            values_per_dimension_limit: default_values_per_dimension_limit(),
            aggregation: AggregationKind::default(),
        }
    }
}

impl MetricSection {
    pub fn to_configuration(&self) -> Result<MetricConfiguration> {
        MetricConfiguration::new(self.series_count_limit, self.values_per_dimension_limit, self.aggregation)
    }
}

fn default_series_count_limit() -> u32 {
    DEFAULT_SERIES_COUNT_LIMIT
}
fn default_values_per_dimension_limit() -> u32 {
    DEFAULT_VALUES_PER_DIMENSION_LIMIT
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricDeclaration {
    #[serde(default)]
    pub namespace: Option<String>,
    pub id: String,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub scope: AggregationScope,
}

impl MetricDeclaration {
    pub fn identifier(&self) -> Result<MetricIdentifier> {
        let mut b = MetricIdentifier::builder(self.id.as_str()).dimensions(self.dimensions.iter().cloned());
        if let Some(ns) = &self.namespace {
            b = b.namespace(ns.as_str());
        }
        b.build()
    }
}
