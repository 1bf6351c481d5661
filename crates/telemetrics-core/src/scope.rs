use serde::Deserialize;

/// Sharing boundary for metrics with identical identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationScope {
    /// One registry shared by every client bound to the same telemetry configuration.
    #[default]
    PerTelemetryConfiguration,
    /// A registry private to one client.
    PerTelemetryClient,
}
