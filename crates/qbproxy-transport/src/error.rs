//! Error type for the qBittorrent Web API transport.

use qbproxy_core::ErrorKind;
use thiserror::Error;

/// Result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while speaking the qBittorrent Web API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request URL could not be constructed.
    #[error("invalid request url")]
    InvalidUrl {
        /// Operation identifier.
        operation: &'static str,
        /// Source URL parse error.
        #[source]
        source: url::ParseError,
    },
    /// The underlying HTTP request failed (connection refused, timeout, DNS).
    #[error("http request failed")]
    Http {
        /// Operation identifier.
        operation: &'static str,
        /// Source reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The remote returned a non-success status, classified into a coarse kind.
    #[error("http response status error ({status})")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code returned.
        status: u16,
        /// Response body, truncated, used for classification and diagnostics.
        body: String,
        /// Coarse classification of the failure.
        kind: ErrorKind,
    },
    /// The response body could not be decoded into the expected shape.
    #[error("failed to decode response body")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Source JSON decode error.
        #[source]
        source: serde_json::Error,
    },
    /// The operation's deadline elapsed or its context was cancelled.
    #[error("operation timed out")]
    Timeout {
        /// Operation identifier.
        operation: &'static str,
    },
    /// Login was rejected outright (bad credentials, no ban/rate-limit language).
    #[error("authentication rejected")]
    AuthInvalid {
        /// Operation identifier.
        operation: &'static str,
    },
}

impl TransportError {
    /// Coarse classification used by the Sync Manager and Pool to drive
    /// retry/backoff decisions without downcasting.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl { .. } => ErrorKind::ValidationError,
            Self::Http { .. } => ErrorKind::Transient,
            Self::Status { kind, .. } => *kind,
            Self::Decode { .. } => ErrorKind::ProtocolDecode,
            Self::Timeout { .. } => ErrorKind::Cancelled,
            Self::AuthInvalid { .. } => ErrorKind::AuthInvalid,
        }
    }
}
