//! telemetrics core: metric identity, metric configuration, error types, and
//! the best-effort executor used around optional instrumentation.
//!
//! This crate carries no async runtime or I/O dependencies so it can be
//! shared by the registry, by embedders, and by test tooling.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. All fallible paths
//! surface as `TelemetryError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod configuration;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod scope;

pub use configuration::{AggregationKind, MetricConfiguration};
pub use error::{ErrorCode, Result, TelemetryError};
pub use identifier::{MetricIdentifier, DEFAULT_METRIC_NAMESPACE, MAX_DIMENSIONS};
pub use scope::AggregationScope;
