//! Error type for configuration validation.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating or constructing configuration records.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was empty.
    #[error("missing configuration field")]
    MissingField {
        /// Operation identifier.
        operation: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field contained a value that failed validation.
    #[error("invalid configuration field")]
    InvalidField {
        /// Operation identifier.
        operation: &'static str,
        /// Name of the offending field.
        field: &'static str,
        /// Offending value, when it is safe to surface (never the password field).
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// The host URL could not be parsed.
    #[error("invalid host url")]
    InvalidHost {
        /// Operation identifier.
        operation: &'static str,
        /// Source parse error.
        #[source]
        source: url::ParseError,
    },
}
