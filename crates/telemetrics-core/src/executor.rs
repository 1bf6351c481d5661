//! Best-effort execution of optional instrumentation code.
//!
//! Telemetry must never break the code it observes. [`exception_safe`] runs an
//! action, reports start and outcome as tracing events, and swallows both
//! `Err` results and panics.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run `action`, logging start/stop/failure under `module` and `activity`.
///
/// The closure is consumed by the call, so anything it acquired (locks,
/// guards, buffers) has been released by the time the outcome is logged.
/// Callers that need arguments capture them in the closure.
///
/// A panic does not propagate, but it still goes through the process panic
/// hook first (the default hook prints it to stderr).
pub fn exception_safe<F, E>(module: &str, activity: &str, action: F)
where
    F: FnOnce() -> Result<(), E>,
    E: fmt::Display,
{
    tracing::debug!(module, activity, "telemetry module execution started");

    let outcome = catch_unwind(AssertUnwindSafe(action));

    match outcome {
        Ok(Ok(())) => {
            tracing::debug!(module, activity, "telemetry module execution stopped");
        }
        Ok(Err(e)) => {
            tracing::warn!(module, activity, error = %e, "telemetry module execution failed");
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::warn!(module, activity, error = %msg, "telemetry module execution failed (panic)");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
