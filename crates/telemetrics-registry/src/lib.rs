//! telemetrics registry library entry.
//!
//! Wires metric registries, the telemetry configuration/client owners that
//! select a registry per aggregation scope, the outbound channel seam, and the
//! periodic flush task. Consumed by the agent binary (`main.rs`) and by
//! integration tests.

pub mod channel;
pub mod config;
pub mod flush;
pub mod ingest;
pub mod metric;
pub mod registry;
pub mod telemetry;

pub use channel::{InMemoryChannel, JsonLinesChannel, TelemetryChannel};
pub use metric::{Metric, MetricAggregate};
pub use registry::MetricRegistry;
pub use telemetry::{TelemetryClient, TelemetryConfiguration, TelemetryConfigurationBuilder};
