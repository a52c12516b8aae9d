//! Builders for the domain types test suites construct most often.
//!
//! `Torrent` and `InstanceRecord` carry enough fields that hand-writing a
//! full struct literal in every test obscures which fields the test
//! actually cares about. These builders return a fully defaulted value;
//! callers override what matters with struct-update syntax:
//!
//! ```ignore
//! let t = Torrent { state: TorrentState::Uploading, progress: 1.0, ..torrent("abc") };
//! ```

use chrono::Utc;
use qbproxy_config::InstanceRecord;
use qbproxy_core::model::{InstanceId, MainDataSnapshot, Torrent, TorrentState};
use url::Url;

/// A fully defaulted, not-yet-complete torrent identified by `hash`.
///
/// `state` is [`TorrentState::Downloading`], `progress` is `0.0`, and
/// `completion_on` is `-1` (never observed complete) — override via
/// struct-update syntax for any other shape.
#[must_use]
pub fn torrent(hash: &str) -> Torrent {
    Torrent {
        hash: hash.to_string(),
        infohash_v1: String::new(),
        infohash_v2: String::new(),
        name: hash.to_string(),
        state: TorrentState::Downloading,
        added_on: 0,
        completion_on: -1,
        progress: 0.0,
        dlspeed: 0,
        upspeed: 0,
        size: 0,
        downloaded: 0,
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

/// A `MainDataSnapshot` containing `torrents`, marked `full`, with `rid`
/// and `synced_at` set to plausible non-default values.
#[must_use]
pub fn main_data_snapshot(torrents: impl IntoIterator<Item = Torrent>) -> MainDataSnapshot {
    let mut snapshot = MainDataSnapshot {
        rid: 1,
        full: true,
        synced_at: Utc::now(),
        ..MainDataSnapshot::empty()
    };
    for t in torrents {
        snapshot.torrents.insert(t.hash.clone(), t);
    }
    snapshot
}

/// An enabled `InstanceRecord` with a valid `host` URL and placeholder
/// credentials, suitable for `InstanceStore` fakes.
///
/// # Panics
///
/// Panics if `host` is not a valid URL; fixtures are expected to pass
/// literal, well-formed URLs.
#[must_use]
pub fn instance_record(id: i64, name: &str, host: &str) -> InstanceRecord {
    InstanceRecord {
        id: InstanceId::new(id),
        name: name.to_string(),
        host: Url::parse(host).expect("fixture host must be a valid URL"),
        username: "admin".to_string(),
        password: "adminadmin".to_string(),
        basic_auth: None,
        tls_skip_verify: false,
        enabled: true,
        order: 0,
    }
}
