//! Raw wire-format DTOs for the qBittorrent Web API, and their conversion
//! into `qbproxy-core`'s domain types.
//!
//! Every field here matches the JSON shape the remote actually returns
//! (`rid`, `full_update`, `torrents_removed`, …, per spec.md §6), kept
//! distinct from `qbproxy_core::model` so a wire-format quirk (e.g. a field
//! arriving as an absent key rather than an empty collection) never leaks
//! into the domain model.

use qbproxy_core::model::{Category, FilePriority, ServerState, Torrent, TorrentFile, TorrentState, Tracker, TrackerStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw `GET /api/v2/sync/maindata` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMainData {
    /// Response id the client should echo on the next poll.
    pub rid: i64,
    /// Whether this is a full snapshot rather than a delta.
    #[serde(default)]
    pub full_update: bool,
    /// Added or updated torrents since the last poll, keyed by hash.
    #[serde(default)]
    pub torrents: HashMap<String, RawTorrent>,
    /// Hashes removed since the last poll.
    #[serde(default)]
    pub torrents_removed: Vec<String>,
    /// Added or updated categories since the last poll, keyed by name.
    #[serde(default)]
    pub categories: HashMap<String, RawCategory>,
    /// Category names removed since the last poll.
    #[serde(default)]
    pub categories_removed: Vec<String>,
    /// Tags added since the last poll.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tags removed since the last poll.
    #[serde(default)]
    pub tags_removed: Vec<String>,
    /// Tracker URL to hashes currently registered with it.
    #[serde(default)]
    pub trackers: HashMap<String, Vec<String>>,
    /// Global transfer/server state.
    #[serde(default)]
    pub server_state: RawServerState,
}

/// Raw per-torrent fields as reported by `torrents/info` and `sync/maindata`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTorrent {
    /// Primary hash (absent in `maindata` increments that only patch fields;
    /// the Sync Manager supplies the map key in that case).
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub infohash_v1: String,
    #[serde(default)]
    pub infohash_v2: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: Option<TorrentState>,
    #[serde(default)]
    pub added_on: Option<i64>,
    #[serde(default)]
    pub completion_on: Option<i64>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub dlspeed: Option<i64>,
    #[serde(default)]
    pub upspeed: Option<i64>,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub downloaded: Option<i64>,
    #[serde(default)]
    pub uploaded: Option<i64>,
    #[serde(default)]
    pub ratio: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub tracker: Option<String>,
    #[serde(default)]
    pub trackers: Option<Vec<String>>,
    #[serde(default)]
    pub save_path: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub eta: Option<i64>,
    #[serde(default)]
    pub num_seeds: Option<i64>,
    #[serde(default)]
    pub num_leechs: Option<i64>,
    #[serde(default)]
    pub force_start: Option<bool>,
    #[serde(default)]
    pub super_seeding: Option<bool>,
    #[serde(default)]
    pub availability: Option<f64>,
    #[serde(default)]
    pub last_activity: Option<i64>,
}

impl RawTorrent {
    /// Merge this patch onto an existing torrent (for `maindata` increments),
    /// overwriting only the fields that were actually present.
    pub fn merge_onto(&self, existing: &mut Torrent) {
        if let Some(v) = &self.hash {
            existing.hash.clone_from(v);
        }
        if !self.infohash_v1.is_empty() {
            existing.infohash_v1.clone_from(&self.infohash_v1);
        }
        if !self.infohash_v2.is_empty() {
            existing.infohash_v2.clone_from(&self.infohash_v2);
        }
        if !self.name.is_empty() {
            existing.name.clone_from(&self.name);
        }
        if let Some(v) = self.state {
            existing.state = v;
        }
        if let Some(v) = self.added_on {
            existing.added_on = v;
        }
        if let Some(v) = self.completion_on {
            existing.completion_on = v;
        }
        if let Some(v) = self.progress {
            existing.progress = v;
        }
        if let Some(v) = self.dlspeed {
            existing.dlspeed = v;
        }
        if let Some(v) = self.upspeed {
            existing.upspeed = v;
        }
        if let Some(v) = self.size {
            existing.size = v;
        }
        if let Some(v) = self.downloaded {
            existing.downloaded = v;
        }
        if let Some(v) = self.uploaded {
            existing.uploaded = v;
        }
        if let Some(v) = self.ratio {
            existing.ratio = v;
        }
        if let Some(v) = &self.category {
            existing.category.clone_from(v);
        }
        if let Some(v) = &self.tags {
            existing.tags.clone_from(v);
        }
        if let Some(v) = &self.tracker {
            existing.tracker.clone_from(v);
        }
        if let Some(v) = &self.trackers {
            existing.trackers.clone_from(v);
        }
        if let Some(v) = &self.save_path {
            existing.save_path.clone_from(v);
        }
        if let Some(v) = self.priority {
            existing.priority = v;
        }
        if let Some(v) = self.eta {
            existing.eta = v;
        }
        if let Some(v) = self.num_seeds {
            existing.num_seeds = v;
        }
        if let Some(v) = self.num_leechs {
            existing.num_leechs = v;
        }
        if let Some(v) = self.force_start {
            existing.force_start = v;
        }
        if let Some(v) = self.super_seeding {
            existing.super_seeding = v;
        }
        if let Some(v) = self.availability {
            existing.availability = v;
        }
        if let Some(v) = self.last_activity {
            existing.last_activity = v;
        }
    }

    /// Build a fresh [`Torrent`] from this patch, using `hash` as the
    /// fallback primary hash when the payload omitted it (the `maindata`
    /// map key).
    #[must_use]
    pub fn into_torrent(self, hash: &str) -> Torrent {
        let mut torrent = Torrent {
            hash: self.hash.clone().unwrap_or_else(|| hash.to_string()),
            infohash_v1: self.infohash_v1.clone(),
            infohash_v2: self.infohash_v2.clone(),
            name: self.name.clone(),
            state: self.state.unwrap_or(TorrentState::Unknown),
            added_on: self.added_on.unwrap_or(0),
            completion_on: self.completion_on.unwrap_or(-1),
            progress: self.progress.unwrap_or(0.0),
            dlspeed: self.dlspeed.unwrap_or(0),
            upspeed: self.upspeed.unwrap_or(0),
            size: self.size.unwrap_or(0),
            downloaded: self.downloaded.unwrap_or(0),
            uploaded: self.uploaded.unwrap_or(0),
            ratio: self.ratio.unwrap_or(0.0),
            category: self.category.clone().unwrap_or_default(),
            tags: self.tags.clone().unwrap_or_default(),
            tracker: self.tracker.clone().unwrap_or_default(),
            trackers: self.trackers.clone().unwrap_or_default(),
            save_path: self.save_path.clone().unwrap_or_default(),
            priority: self.priority.unwrap_or(0),
            eta: self.eta.unwrap_or(-1),
            num_seeds: self.num_seeds.unwrap_or(0),
            num_leechs: self.num_leechs.unwrap_or(0),
            force_start: self.force_start.unwrap_or(false),
            super_seeding: self.super_seeding.unwrap_or(false),
            availability: self.availability.unwrap_or(0.0),
            last_activity: self.last_activity.unwrap_or(0),
        };
        self.merge_onto(&mut torrent);
        torrent
    }
}

/// Raw category entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub save_path: String,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        Self {
            name: raw.name,
            save_path: raw.save_path,
        }
    }
}

/// Raw server-state fields the core cares about; other fields the remote
/// reports (alltime stats, DHT nodes, …) are out of scope and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawServerState {
    #[serde(default)]
    pub dl_info_speed: i64,
    #[serde(default)]
    pub up_info_speed: i64,
    #[serde(default)]
    pub free_space_on_disk: i64,
    #[serde(default)]
    pub connection_status: String,
}

impl From<RawServerState> for ServerState {
    fn from(raw: RawServerState) -> Self {
        Self {
            dl_info_speed: raw.dl_info_speed,
            up_info_speed: raw.up_info_speed,
            free_space_on_disk: raw.free_space_on_disk,
            connection_status: raw.connection_status,
        }
    }
}

/// Raw per-file entry from `GET /api/v2/torrents/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTorrentFile {
    pub index: u32,
    pub name: String,
    pub size: i64,
    pub progress: f64,
    pub priority: i8,
    #[serde(default)]
    pub availability: f64,
}

impl From<RawTorrentFile> for TorrentFile {
    fn from(raw: RawTorrentFile) -> Self {
        let priority = match raw.priority {
            0 => FilePriority::Skip,
            6 => FilePriority::High,
            7 => FilePriority::Maximal,
            _ => FilePriority::Normal,
        };
        Self {
            index: raw.index,
            name: raw.name,
            size: raw.size,
            progress: raw.progress,
            priority,
            availability: raw.availability,
        }
    }
}

/// Raw per-tracker entry from `GET /api/v2/torrents/trackers`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTracker {
    pub url: String,
    pub status: i8,
    pub tier: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub num_peers: i64,
    #[serde(default)]
    pub num_seeds: i64,
    #[serde(default)]
    pub num_leeches: i64,
    #[serde(default)]
    pub num_downloaded: i64,
}

impl From<RawTracker> for Tracker {
    fn from(raw: RawTracker) -> Self {
        let status = match raw.status {
            0 => TrackerStatus::Disabled,
            1 => TrackerStatus::NotContacted,
            2 => TrackerStatus::Working,
            3 => TrackerStatus::Updating,
            _ => TrackerStatus::NotWorking,
        };
        Self {
            url: raw.url,
            status,
            tier: raw.tier,
            message: raw.msg,
            num_peers: raw.num_peers,
            num_seeds: raw.num_seeds,
            num_leeches: raw.num_leeches,
            num_downloaded: raw.num_downloaded,
        }
    }
}

/// Raw `GET /api/v2/app/preferences` response. Only the fields the core
/// needs are modeled; unknown fields are ignored by `serde_json`'s default
/// behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAppPreferences {
    #[serde(default)]
    pub save_path: String,
    #[serde(default)]
    pub max_active_downloads: i64,
    #[serde(default)]
    pub max_active_uploads: i64,
    #[serde(default)]
    pub max_active_torrents: i64,
    #[serde(default)]
    pub dht: bool,
    #[serde(default)]
    pub pex: bool,
    #[serde(default)]
    pub lsd: bool,
}

/// Raw `GET /api/v2/app/buildInfo` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBuildInfo {
    #[serde(default)]
    pub qt: String,
    #[serde(default)]
    pub libtorrent: String,
    #[serde(default)]
    pub boost: String,
    #[serde(default)]
    pub openssl: String,
    #[serde(default)]
    pub bitness: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_core::model::Torrent;

    fn base_torrent() -> Torrent {
        Torrent {
            hash: "abc".into(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: "demo".into(),
            state: TorrentState::Downloading,
            added_on: 0,
            completion_on: -1,
            progress: 0.1,
            dlspeed: 0,
            upspeed: 0,
            size: 100,
            downloaded: 10,
            uploaded: 0,
            ratio: 0.0,
            category: String::new(),
            tags: String::new(),
            tracker: String::new(),
            trackers: Vec::new(),
            save_path: String::new(),
            priority: 0,
            eta: -1,
            num_seeds: 0,
            num_leechs: 0,
            force_start: false,
            super_seeding: false,
            availability: 0.0,
            last_activity: 0,
        }
    }

    #[test]
    fn merge_onto_only_overwrites_present_fields() {
        let mut torrent = base_torrent();
        let patch = RawTorrent {
            progress: Some(1.0),
            state: Some(TorrentState::Uploading),
            completion_on: Some(1_700_000_000),
            ..Default::default()
        };
        patch.merge_onto(&mut torrent);
        assert_eq!(torrent.progress, 1.0);
        assert_eq!(torrent.state, TorrentState::Uploading);
        assert_eq!(torrent.name, "demo");
    }

    #[test]
    fn into_torrent_falls_back_to_map_key_for_missing_hash() {
        let raw = RawTorrent {
            name: "demo".into(),
            ..Default::default()
        };
        let torrent = raw.into_torrent("abc123");
        assert_eq!(torrent.hash, "abc123");
        assert_eq!(torrent.completion_on, -1);
    }

    #[test]
    fn tracker_status_codes_map_to_known_variants() {
        let raw = RawTracker {
            url: "https://tracker.example".into(),
            status: 2,
            tier: 0,
            msg: String::new(),
            num_peers: 0,
            num_seeds: 0,
            num_leeches: 0,
            num_downloaded: 0,
        };
        let tracker: Tracker = raw.into();
        assert_eq!(tracker.status, TrackerStatus::Working);
    }
}
