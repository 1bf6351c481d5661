//! Outbound seam: where flushed aggregates go.
//!
//! The ingestion backend is not part of this crate. Embedders install their
//! own `TelemetryChannel` on the telemetry configuration; tests install an
//! `InMemoryChannel` and inspect what was sent.

use std::io::Write;
use std::sync::Mutex;

use telemetrics_core::error::{Result, TelemetryError};

use crate::metric::MetricAggregate;

pub trait TelemetryChannel: Send + Sync {
    fn send(&self, batch: &[MetricAggregate]) -> Result<()>;
}

/// Keeps every batch in memory.
#[derive(Default)]
pub struct InMemoryChannel {
    batches: Mutex<Vec<Vec<MetricAggregate>>>,
}

impl InMemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<MetricAggregate>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// All aggregates sent so far, flattened.
    pub fn aggregates(&self) -> Vec<MetricAggregate> {
        self.batches().into_iter().flatten().collect()
    }
}

impl TelemetryChannel for InMemoryChannel {
    fn send(&self, batch: &[MetricAggregate]) -> Result<()> {
        self.batches
            .lock()
            .map_err(|_| TelemetryError::Channel("in-memory channel poisoned".into()))?
            .push(batch.to_vec());
        Ok(())
    }
}

/// Writes one JSON object per aggregate, one per line.
pub struct JsonLinesChannel<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesChannel<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|p| p.into_inner())
    }
}

impl<W: Write + Send> TelemetryChannel for JsonLinesChannel<W> {
    fn send(&self, batch: &[MetricAggregate]) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| TelemetryError::Channel("writer poisoned".into()))?;
        for agg in batch {
            serde_json::to_writer(&mut *out, agg)
                .map_err(|e| TelemetryError::Channel(format!("encode failed: {e}")))?;
            out.write_all(b"\n")
                .map_err(|e| TelemetryError::Channel(format!("write failed: {e}")))?;
        }
        out.flush()
            .map_err(|e| TelemetryError::Channel(format!("write failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MetricRegistry;
    use telemetrics_core::MetricIdentifier;

    #[test]
    fn json_lines_one_object_per_line() {
        let reg = MetricRegistry::default();
        let id = MetricIdentifier::with_namespace("app", "Latency", ["route"]).unwrap();
        let m = reg.get_or_create(&id, None).unwrap();
        m.track_value(12.0, &["/a"]).unwrap();
        m.track_value(3.0, &["/b"]).unwrap();

        let ch = JsonLinesChannel::new(Vec::new());
        ch.send(&reg.flush()).unwrap();
        let text = String::from_utf8(ch.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let v: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(v["id"], "Latency");
            assert_eq!(v["count"], 1);
        }
    }
}
