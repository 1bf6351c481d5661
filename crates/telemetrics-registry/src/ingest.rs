//! Text ingestion for the agent binary.
//!
//! One sample per line: `<namespace>/<id> <value> [dimension values...]`.
//! Only metrics declared up front can be fed, because their dimension names
//! come from the declaration.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use telemetrics_core::error::{Result, TelemetryError};

use crate::metric::Metric;

pub struct LineIngestor {
    metrics: HashMap<String, Arc<Metric>>,
}

impl LineIngestor {
    /// Fails if two metrics share the same `namespace/id`: lines could not tell them apart.
    pub fn new(metrics: impl IntoIterator<Item = Arc<Metric>>) -> Result<Self> {
        let mut by_name: HashMap<String, Arc<Metric>> = HashMap::new();
        for m in metrics {
            let id = m.identifier();
            match by_name.entry(format!("{}/{}", id.namespace(), id.id())) {
                Entry::Occupied(e) => {
                    return Err(TelemetryError::InvalidArgument(format!(
                        "{} and {} are both addressed as {}",
                        e.get().identifier(),
                        id,
                        e.key()
                    )))
                }
                Entry::Vacant(e) => {
                    e.insert(Arc::clone(&m));
                }
            }
        }
        Ok(Self { metrics: by_name })
    }

    /// Returns `Ok(false)` for blank lines and for values dropped by series limits.
    pub fn ingest_line(&self, line: &str) -> Result<bool> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else { return Ok(false) };

        let metric = self
            .metrics
            .get(name)
            .ok_or_else(|| TelemetryError::InvalidArgument(format!("undeclared metric {name}")))?;

        let raw = parts
            .next()
            .ok_or_else(|| TelemetryError::InvalidArgument(format!("{name}: missing value")))?;
        let value: f64 = raw
            .parse()
            .map_err(|e| TelemetryError::InvalidArgument(format!("{name}: bad value {raw:?}: {e}")))?;

        let dims: Vec<&str> = parts.collect();
        metric.track_value(value, &dims)
    }
}
