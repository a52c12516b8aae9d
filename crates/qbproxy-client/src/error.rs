//! Error type for per-instance Client operations.

use qbproxy_core::ErrorKind;
use qbproxy_sync::SyncError;
use qbproxy_transport::TransportError;
use thiserror::Error;

/// Result alias for Client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by a [`crate::Client`]'s typed operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying transport call failed.
    #[error("client operation {operation} failed")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Source transport error.
        #[source]
        source: TransportError,
    },
    /// The underlying Sync Manager reported a failure.
    #[error("client operation {operation} failed")]
    Sync {
        /// Operation identifier.
        operation: &'static str,
        /// Source sync error.
        #[source]
        source: SyncError,
    },
    /// Caller-supplied input was invalid for this operation.
    #[error("client operation {operation} rejected: {reason}")]
    Validation {
        /// Operation identifier.
        operation: &'static str,
        /// Machine-readable reason for rejection.
        reason: &'static str,
    },
    /// The requested torrent or resource could not be resolved.
    #[error("client operation {operation}: hash {hash} not found")]
    NotFound {
        /// Operation identifier.
        operation: &'static str,
        /// Hash that failed to resolve.
        hash: String,
    },
}

impl ClientError {
    /// Coarse classification used by the Pool to drive retry/backoff
    /// decisions without downcasting.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { source, .. } => source.kind(),
            Self::Sync { source, .. } => source.kind(),
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}
