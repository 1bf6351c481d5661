//! Top-level facade crate for telemetrics.
//!
//! Re-exports core types and the registry library so users can depend on a single crate.

pub mod core {
    pub use telemetrics_core::*;
}

pub mod registry {
    pub use telemetrics_registry::*;
}
