//! Periodic flush task.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use telemetrics_core::error::{Result, TelemetryError};

use crate::telemetry::TelemetryClient;

/// Flush `client`'s registry and its configuration's shared registry every
/// `every`. Setting the shutdown flag (or dropping its sender) triggers one
/// last flush, then the task ends.
///
/// `every` must be non-zero. Must be called from within a tokio runtime.
pub fn spawn_flush_loop(
    client: TelemetryClient,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>> {
    if every.is_zero() {
        return Err(TelemetryError::InvalidArgument("flush interval must be non-zero".into()));
    }

    Ok(tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick fires immediately
        tick.tick().await;

        loop {
            tokio::select! {
                _ = tick.tick() => flush_all(&client),
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        flush_all(&client);
        tracing::debug!("flush loop stopped");
    }))
}

fn flush_all(client: &TelemetryClient) {
    client.flush();
    client.configuration().flush();
}
