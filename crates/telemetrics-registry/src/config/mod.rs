//! Settings loader (strict parsing).

pub mod schema;

use std::fs;
use std::sync::Arc;

use telemetrics_core::error::{Result, TelemetryError};

use crate::metric::Metric;
use crate::telemetry::TelemetryClient;

pub use schema::{MetricDeclaration, MetricSection, TelemetrySettings};

pub fn load_from_file(path: &str) -> Result<TelemetrySettings> {
    let s = fs::read_to_string(path)
        .map_err(|e| TelemetryError::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<TelemetrySettings> {
    let settings: TelemetrySettings = serde_yaml::from_str(s)
        .map_err(|e| TelemetryError::Config(format!("invalid yaml: {e}")))?;
    settings.validate()?;
    Ok(settings)
}

/// Create every metric declared in `settings`, in declaration order.
pub fn declare_metrics(settings: &TelemetrySettings, client: &TelemetryClient) -> Result<Vec<Arc<Metric>>> {
    settings
        .metrics
        .iter()
        .map(|m| {
            let identifier = m.identifier()?;
            let cfg = settings.configuration_for(m)?;
            let metric = client.get_metric(&identifier, cfg.as_ref(), Some(m.scope))?;
            tracing::info!(metric = %identifier, scope = ?m.scope, "metric declared");
            Ok(metric)
        })
        .collect()
}
