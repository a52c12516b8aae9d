//! Torrent domain types as surfaced by the qBittorrent Web API.

use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the remote for a torrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TorrentState {
    /// Torrent is being downloaded and data is being transferred.
    #[serde(rename = "downloading")]
    Downloading,
    /// Torrent is being seeded and data is being transferred.
    #[serde(rename = "uploading")]
    Uploading,
    /// Torrent is paused and has NOT finished downloading.
    #[serde(rename = "pausedDL")]
    PausedDl,
    /// Torrent is paused and has finished downloading.
    #[serde(rename = "pausedUP")]
    PausedUp,
    /// Torrent is stopped and has NOT finished downloading.
    #[serde(rename = "stoppedDL")]
    StoppedDl,
    /// Torrent is stopped and has finished downloading.
    #[serde(rename = "stoppedUP")]
    StoppedUp,
    /// Queuing is enabled and torrent is queued for download.
    #[serde(rename = "queuedDL")]
    QueuedDl,
    /// Queuing is enabled and torrent is queued for upload.
    #[serde(rename = "queuedUP")]
    QueuedUp,
    /// Torrent is being downloaded, but no connections were made.
    #[serde(rename = "stalledDL")]
    StalledDl,
    /// Torrent is being seeded, but no connections were made.
    #[serde(rename = "stalledUP")]
    StalledUp,
    /// Same as `checkingUP`, but torrent has NOT finished downloading.
    #[serde(rename = "checkingDL")]
    CheckingDl,
    /// Torrent has finished downloading and is being checked.
    #[serde(rename = "checkingUP")]
    CheckingUp,
    /// Checking resume data on qBittorrent startup.
    #[serde(rename = "checkingResumeData")]
    CheckingResumeData,
    /// Torrent is forced to downloading to ignore queue limit.
    #[serde(rename = "forcedDL")]
    ForcedDl,
    /// Torrent is forced to uploading and ignores queue limit.
    #[serde(rename = "forcedUP")]
    ForcedUp,
    /// Some error occurred, applies to paused/stopped torrents.
    #[serde(rename = "error")]
    Error,
    /// Torrent data files are missing.
    #[serde(rename = "missingFiles")]
    MissingFiles,
    /// Torrent is moving to another location.
    #[serde(rename = "moving")]
    Moving,
    /// Torrent is allocating disk space for download.
    #[serde(rename = "allocating")]
    Allocating,
    /// Torrent has just started downloading and is fetching metadata.
    #[serde(rename = "metaDL")]
    MetaDl,
    /// Unknown status.
    #[serde(rename = "unknown")]
    Unknown,
}

/// Terminal states in which a torrent with `progress == 1.0` counts as complete.
pub const COMPLETE_STATES: &[TorrentState] = &[
    TorrentState::Uploading,
    TorrentState::StalledUp,
    TorrentState::QueuedUp,
    TorrentState::CheckingUp,
    TorrentState::ForcedUp,
    TorrentState::PausedUp,
    TorrentState::StoppedUp,
];

impl TorrentState {
    /// Whether this state is one of the recognized "seeding-complete" states.
    #[must_use]
    pub fn is_complete_state(self) -> bool {
        COMPLETE_STATES.contains(&self)
    }

    /// Relative ordering priority used as the primary sort key for the
    /// "state" sort column. Lower values sort first.
    #[must_use]
    pub const fn sort_priority(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::MissingFiles => 1,
            Self::Downloading => 2,
            Self::ForcedDl => 3,
            Self::MetaDl => 4,
            Self::Allocating => 5,
            Self::StalledDl => 6,
            Self::QueuedDl => 7,
            Self::CheckingDl => 8,
            Self::CheckingResumeData => 9,
            Self::PausedDl => 10,
            Self::StoppedDl => 11,
            Self::Moving => 12,
            Self::Uploading => 13,
            Self::ForcedUp => 14,
            Self::StalledUp => 15,
            Self::QueuedUp => 16,
            Self::CheckingUp => 17,
            Self::PausedUp => 18,
            Self::StoppedUp => 19,
            Self::Unknown => 20,
        }
    }
}

/// A torrent as surfaced by the Sync Manager's MainData view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torrent {
    /// Primary identifier used by callers; the first non-empty of the
    /// remote's reported hash, `infohash_v1`, or `infohash_v2`.
    pub hash: String,
    /// BitTorrent v1 info-hash, when present.
    #[serde(default)]
    pub infohash_v1: String,
    /// BitTorrent v2 info-hash, when present.
    #[serde(default)]
    pub infohash_v2: String,
    /// Display name.
    pub name: String,
    /// Current lifecycle state.
    pub state: TorrentState,
    /// Unix timestamp the torrent was added.
    pub added_on: i64,
    /// Unix timestamp the torrent completed, or -1 if never observed complete.
    pub completion_on: i64,
    /// Completion fraction in `[0.0, 1.0]`.
    pub progress: f64,
    /// Current download rate in bytes/sec.
    pub dlspeed: i64,
    /// Current upload rate in bytes/sec.
    pub upspeed: i64,
    /// Total payload size in bytes.
    pub size: i64,
    /// Total bytes downloaded so far.
    pub downloaded: i64,
    /// Total bytes uploaded so far.
    pub uploaded: i64,
    /// Share ratio (uploaded / downloaded).
    pub ratio: f64,
    /// Assigned category name, or empty string if uncategorized.
    #[serde(default)]
    pub category: String,
    /// Comma-joined, insertion-ordered tag list.
    #[serde(default)]
    pub tags: String,
    /// Primary tracker URL.
    #[serde(default)]
    pub tracker: String,
    /// All tracker URLs known for this torrent.
    #[serde(default)]
    pub trackers: Vec<String>,
    /// On-disk save path.
    #[serde(default)]
    pub save_path: String,
    /// Queue priority (-1 when queuing is disabled).
    #[serde(default)]
    pub priority: i64,
    /// Estimated seconds remaining, or -1 when unknown/infinite.
    #[serde(default)]
    pub eta: i64,
    /// Connected seed count.
    #[serde(default)]
    pub num_seeds: i64,
    /// Connected leech count.
    #[serde(default)]
    pub num_leechs: i64,
    /// Whether force-start is active.
    #[serde(default)]
    pub force_start: bool,
    /// Whether super-seeding is active.
    #[serde(default)]
    pub super_seeding: bool,
    /// Piece availability ratio.
    #[serde(default)]
    pub availability: f64,
    /// Unix timestamp of the last observed activity.
    #[serde(default)]
    pub last_activity: i64,
}

impl Torrent {
    /// `isTorrentComplete`: `completionOn > 0` OR (`progress == 1.0` AND the
    /// state is one of the recognized "seeding-complete" states).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completion_on > 0 || ((self.progress - 1.0).abs() < f64::EPSILON && self.state.is_complete_state())
    }

    /// Tags as an ordered, trimmed list split on commas.
    #[must_use]
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// The primary hash to use for display and lookup, case-preserved.
    #[must_use]
    pub fn primary_hash(&self) -> &str {
        if !self.hash.is_empty() {
            &self.hash
        } else if !self.infohash_v1.is_empty() {
            &self.infohash_v1
        } else {
            &self.infohash_v2
        }
    }
}

/// Priority level accepted by the file-priority action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i8)]
pub enum FilePriority {
    /// Do not download.
    Skip = 0,
    /// Normal priority.
    Normal = 1,
    /// High priority.
    High = 6,
    /// Maximal priority.
    Maximal = 7,
}

/// An individual file exposed by a torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Index of the file within the torrent metainfo.
    pub index: u32,
    /// Relative path of the file within the torrent payload.
    pub name: String,
    /// Total size of the file in bytes.
    pub size: i64,
    /// Fraction of this file downloaded so far, `[0.0, 1.0]`.
    pub progress: f64,
    /// Current priority level.
    pub priority: FilePriority,
    /// Piece availability for this file.
    #[serde(default)]
    pub availability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_torrent() -> Torrent {
        Torrent {
            hash: "abc".into(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: "demo".into(),
            state: TorrentState::Downloading,
            added_on: 0,
            completion_on: -1,
            progress: 0.5,
            dlspeed: 0,
            upspeed: 0,
            size: 100,
            downloaded: 50,
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
    fn is_complete_requires_completion_marker_or_terminal_state() {
        let mut t = base_torrent();
        assert!(!t.is_complete());

        t.completion_on = 1_700_000_000;
        assert!(t.is_complete());

        let mut t2 = base_torrent();
        t2.progress = 1.0;
        t2.state = TorrentState::StalledUp;
        assert!(t2.is_complete());

        let mut t3 = base_torrent();
        t3.progress = 1.0;
        t3.state = TorrentState::CheckingResumeData;
        assert!(!t3.is_complete(), "transient checking state is not complete without completion_on");
    }

    #[test]
    fn tag_list_trims_and_drops_empties() {
        let mut t = base_torrent();
        t.tags = "a,  b ,,c".into();
        assert_eq!(t.tag_list(), vec!["a", "b", "c"]);
    }

    #[test]
    fn primary_hash_falls_back_through_infohashes() {
        let mut t = base_torrent();
        t.hash = String::new();
        t.infohash_v1 = "v1hash".into();
        assert_eq!(t.primary_hash(), "v1hash");

        t.infohash_v1 = String::new();
        t.infohash_v2 = "v2hash".into();
        assert_eq!(t.primary_hash(), "v2hash");
    }

    #[test]
    fn state_serializes_to_wire_strings() {
        let json = serde_json::to_string(&TorrentState::PausedUp).expect("serialize");
        assert_eq!(json, "\"pausedUP\"");
        let back: TorrentState = serde_json::from_str("\"checkingResumeData\"").expect("deserialize");
        assert_eq!(back, TorrentState::CheckingResumeData);
    }
}
