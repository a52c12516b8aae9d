#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
#![allow(unexpected_cfgs)]

//! Sync-event sink and completion-handler collaborator interfaces.
//!
//! These are the only two external interfaces the Sync Manager and Client
//! dispatch *to*; implementations live outside this workspace (or, for
//! tests, in `qbproxy-test-support`). Per spec.md §9, implementers are
//! expected to return quickly from these callbacks and offload heavy work
//! to their own queues — nothing here blocks a caller beyond enqueueing.

use async_trait::async_trait;
use qbproxy_core::model::{InstanceId, MainDataSnapshot, Torrent};
use std::fmt;
use thiserror::Error;

/// Error surfaced to a sink when a Sync Manager poll fails.
///
/// This is a thin, display-only wrapper: the Sync Manager already
/// classified the failure into a [`qbproxy_core::ErrorKind`] before
/// constructing one, so sinks that want to branch on severity should match
/// on [`SyncEventError::kind`] rather than parse `message`.
#[derive(Debug, Error, Clone)]
#[error("sync error for instance {instance_id}: {message}")]
pub struct SyncEventError {
    /// Instance the failure occurred on.
    pub instance_id: InstanceId,
    /// Coarse classification driving retry/backoff decisions upstream.
    pub kind: qbproxy_core::ErrorKind,
    /// Human-readable detail, already stripped of secrets.
    pub message: String,
}

impl SyncEventError {
    /// Construct a new sink-facing sync error.
    #[must_use]
    pub fn new(instance_id: InstanceId, kind: qbproxy_core::ErrorKind, message: impl Into<String>) -> Self {
        Self {
            instance_id,
            kind,
            message: message.into(),
        }
    }
}

/// Consumer of `MainData` snapshots and sync errors, fanned out to by every
/// Client's Sync Manager. One sink is installed per process (see
/// `qbproxy-pool::Pool::set_sync_event_sink`) and propagated to all Clients.
#[async_trait]
pub trait SyncEventSink: Send + Sync + fmt::Debug {
    /// Called after every successful poll with the merged snapshot.
    ///
    /// Dispatch is strictly ordered per instance: the Sync Manager does not
    /// begin the next poll's merge until this call returns.
    async fn handle_main_data(&self, instance_id: InstanceId, snapshot: &MainDataSnapshot);

    /// Called when a poll fails, after the Sync Manager has classified the
    /// failure and updated its own retry/backoff state.
    async fn handle_sync_error(&self, instance_id: InstanceId, error: &SyncEventError);
}

/// Invoked exactly once per completion transition detected by
/// `qbproxy-client::completion`. See spec.md §4.H and invariant 8.
#[async_trait]
pub trait CompletionHandler: Send + Sync + fmt::Debug {
    /// Notify that `torrent` transitioned from not-complete to complete on
    /// `instance_id`.
    async fn handle_completion(&self, instance_id: InstanceId, torrent: &Torrent);
}
