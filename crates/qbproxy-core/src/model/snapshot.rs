//! The merged `MainData` view maintained by the Sync Manager.

use crate::model::category::CategoryMap;
use crate::model::torrent::Torrent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-wide state fields reported alongside `MainData`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerState {
    /// Aggregate download speed across all torrents, bytes/sec.
    #[serde(default)]
    pub dl_info_speed: i64,
    /// Aggregate upload speed across all torrents, bytes/sec.
    #[serde(default)]
    pub up_info_speed: i64,
    /// Free disk space at the default save path, bytes.
    #[serde(default)]
    pub free_space_on_disk: i64,
    /// Whether the remote's connection status is reachable.
    #[serde(default)]
    pub connection_status: String,
}

/// The in-memory image the Sync Manager maintains for one instance,
/// published to the installed sink after every successful poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainDataSnapshot {
    /// Last revision id acknowledged by this snapshot.
    pub rid: i64,
    /// Whether this snapshot represents a full refresh rather than an increment.
    pub full: bool,
    /// Current torrents, keyed by primary hash.
    pub torrents: BTreeMap<String, Torrent>,
    /// Current categories, keyed by name.
    pub categories: CategoryMap,
    /// Current tags, insertion order is not preserved across merges (kept sorted).
    pub tags: Vec<String>,
    /// Tracker URL to the hashes of torrents currently registered with it.
    pub trackers: BTreeMap<String, Vec<String>>,
    /// Server-wide state fields.
    pub server_state: ServerState,
    /// Timestamp this snapshot was last refreshed, set by the Sync Manager.
    pub synced_at: DateTime<Utc>,
}

impl MainDataSnapshot {
    /// An empty, not-yet-synced snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_torrents() {
        let snapshot = MainDataSnapshot::empty();
        assert!(snapshot.torrents.is_empty());
        assert!(!snapshot.full);
    }
}
