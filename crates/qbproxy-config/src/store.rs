//! Collaborator interfaces the core consumes but does not implement:
//! instance persistence, per-instance error history, and tracker
//! display-name customization. Concrete implementations (backed by SQL,
//! a config file, or an in-memory fake for tests) live outside this crate.

use crate::error::ConfigResult;
use crate::model::InstanceRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qbproxy_core::ErrorKind;
use qbproxy_core::model::InstanceId;

/// Lists, updates, and deletes configured instance records. Passwords are
/// expected to be decrypted in-memory by the time a record reaches this
/// crate; `InstanceStore` implementations own that decryption.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// List configured instances, including disabled ones when requested.
    async fn list(&self, include_disabled: bool) -> ConfigResult<Vec<InstanceRecord>>;

    /// Fetch a single instance by id.
    async fn get(&self, id: InstanceId) -> ConfigResult<InstanceRecord>;

    /// Persist a created or edited instance record.
    async fn update(&self, record: InstanceRecord) -> ConfigResult<()>;

    /// Remove an instance record.
    async fn delete(&self, id: InstanceId) -> ConfigResult<()>;

    /// Persist a new display ordering among sibling instances.
    async fn reorder(&self, ids: &[InstanceId]) -> ConfigResult<()>;
}

/// A previously recorded connection error against one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    /// Instance the error was recorded against.
    pub instance_id: InstanceId,
    /// Human-readable failure message, as surfaced by the transport.
    pub message: String,
    /// Coarse classification at the time the error was recorded.
    pub classification: ErrorKind,
    /// When the error was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Records and lists recent connection errors per instance, independent of
/// the Pool's in-memory backoff state, for display in the UI's history.
#[async_trait]
pub trait ErrorStore: Send + Sync {
    /// Record a connection error against an instance.
    async fn record(&self, instance_id: InstanceId, message: String, classification: ErrorKind) -> ConfigResult<()>;

    /// List recently recorded errors for an instance, most recent first.
    async fn list_recent(&self, instance_id: InstanceId) -> ConfigResult<Vec<RecordedError>>;

    /// Clear recorded errors for an instance.
    async fn clear(&self, instance_id: InstanceId) -> ConfigResult<()>;
}

/// A user-defined grouping of tracker domains under one display name, used
/// to merge tracker columns that would otherwise show raw hostnames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerCustomization {
    /// Name shown in place of the raw tracker domain.
    pub display_name: String,
    /// Domains that roll up under `display_name`.
    pub domains: Vec<String>,
}

/// Lists the configured tracker display-name customizations.
#[async_trait]
pub trait TrackerCustomizationLister: Send + Sync {
    /// List all configured customizations.
    async fn list(&self) -> ConfigResult<Vec<TrackerCustomization>>;
}
