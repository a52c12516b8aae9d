//! Error type for the Sync Manager poll loop.

use qbproxy_core::ErrorKind;
use qbproxy_transport::TransportError;
use thiserror::Error;

/// Result alias for Sync Manager operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while driving a single instance's poll loop.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The underlying transport call failed.
    #[error("sync poll failed during {operation}")]
    Transport {
        /// Operation identifier (always `"poll"` today; kept for symmetry
        /// with the other per-crate error enums).
        operation: &'static str,
        /// Source transport error.
        #[source]
        source: TransportError,
    },
}

impl SyncError {
    /// Coarse classification, delegated to the wrapped [`TransportError`].
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { source, .. } => source.kind(),
        }
    }
}
