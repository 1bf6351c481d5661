//! Shared error type across telemetrics crates.

use thiserror::Error;

/// Stable error codes (used in logs and by callers that match on kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Empty id, bad namespace, bad or duplicate dimension names, too many dimensions.
    InvalidIdentifier,
    /// A different configuration was requested for an existing metric.
    ConfigurationConflict,
    /// A required collaborator was not supplied.
    NullArgument,
    /// A value handed to a metric or a configuration is out of range.
    InvalidArgument,
    /// Settings could not be read or failed validation.
    Config,
    /// The outbound channel rejected a batch.
    Channel,
}

impl ErrorCode {
    /// String representation used in structured logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorCode::ConfigurationConflict => "CONFIGURATION_CONFLICT",
            ErrorCode::NullArgument => "NULL_ARGUMENT",
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::Config => "CONFIG",
            ErrorCode::Channel => "CHANNEL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Unified error type used by core and registry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid metric identifier: {0}")]
    InvalidIdentifier(String),
    #[error(
        "metric {identifier} already exists with configuration {existing}; \
         requested {requested} (omit the configuration to reuse the existing one)"
    )]
    ConfigurationConflict {
        identifier: String,
        existing: String,
        requested: String,
    },
    #[error("required argument missing: {0}")]
    NullArgument(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("config: {0}")]
    Config(String),
    #[error("channel: {0}")]
    Channel(String),
}

impl TelemetryError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            TelemetryError::InvalidIdentifier(_) => ErrorCode::InvalidIdentifier,
            TelemetryError::ConfigurationConflict { .. } => ErrorCode::ConfigurationConflict,
            TelemetryError::NullArgument(_) => ErrorCode::NullArgument,
            TelemetryError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            TelemetryError::Config(_) => ErrorCode::Config,
            TelemetryError::Channel(_) => ErrorCode::Channel,
        }
    }
}
