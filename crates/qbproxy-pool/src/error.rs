//! Error type for Client Pool operations.

use qbproxy_core::model::InstanceId;
use qbproxy_core::ErrorKind;
use thiserror::Error;

/// Result alias for Pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors raised while constructing, locating, or operating on a pooled
/// Client. Cheap to clone: every waiter of a single-flight construction
/// receives its own owned copy of the same failure.
#[derive(Debug, Clone, Error)]
pub enum PoolError {
    /// Client construction failed (transport build, or the instance record
    /// itself could not be loaded).
    #[error("failed to construct client for instance {instance_id}: {message}")]
    Construction {
        /// Instance the construction attempt was for.
        instance_id: InstanceId,
        /// Human-readable failure detail.
        message: String,
        /// Coarse classification driving backoff.
        kind: ErrorKind,
    },
    /// The instance is currently in a backoff window from a prior failure.
    #[error("instance {instance_id} is in backoff, retry later")]
    InBackoff {
        /// Instance currently backed off.
        instance_id: InstanceId,
    },
    /// No instance is configured with the requested id.
    #[error("no instance configured with id {instance_id}")]
    UnknownInstance {
        /// Instance id that could not be resolved.
        instance_id: InstanceId,
    },
    /// The `InstanceStore` collaborator itself failed.
    #[error("instance store operation {operation} failed: {message}")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Human-readable failure detail.
        message: String,
    },
}

impl PoolError {
    /// Coarse classification, mirroring every other crate's error type.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Construction { kind, .. } => *kind,
            Self::InBackoff { .. } | Self::Store { .. } => ErrorKind::Transient,
            Self::UnknownInstance { .. } => ErrorKind::NotFound,
        }
    }
}
