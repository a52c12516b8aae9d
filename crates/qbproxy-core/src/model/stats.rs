//! Aggregate statistics and counts derived from a torrent set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate totals over a torrent set, as returned by `calculate_stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TorrentStats {
    /// Total torrent count.
    pub total: u64,
    /// Torrents actively downloading (state-based, not just category).
    pub downloading: u64,
    /// Torrents actively seeding.
    pub seeding: u64,
    /// Torrents paused or stopped.
    pub paused: u64,
    /// Torrents in an error or missing-files state.
    pub error: u64,
    /// Torrents actively checking (including resume-data checks).
    pub checking: u64,
    /// Sum of current download speeds, bytes/sec.
    pub dl_speed: i64,
    /// Sum of current upload speeds, bytes/sec.
    pub up_speed: i64,
    /// Sum of total sizes, bytes.
    pub size: i64,
    /// Sum of bytes remaining to download across incomplete torrents.
    pub remaining: i64,
    /// Sum of sizes for torrents currently seeding.
    pub seeding_size: i64,
}

impl TorrentStats {
    /// Merge another instance's stats into this one. Commutative and
    /// associative: every field is a plain sum.
    pub fn merge(&mut self, other: &Self) {
        self.total += other.total;
        self.downloading += other.downloading;
        self.seeding += other.seeding;
        self.paused += other.paused;
        self.error += other.error;
        self.checking += other.checking;
        self.dl_speed += other.dl_speed;
        self.up_speed += other.up_speed;
        self.size += other.size;
        self.remaining += other.remaining;
        self.seeding_size += other.seeding_size;
    }
}

/// Aggregate transfer totals attributed to a single tracker, as accumulated
/// by `compute_counts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerTransfer {
    /// Sum of bytes uploaded by torrents using this tracker.
    pub uploaded: i64,
    /// Sum of bytes downloaded by torrents using this tracker.
    pub downloaded: i64,
    /// Sum of total sizes of torrents using this tracker.
    pub total_size: i64,
    /// Number of torrents using this tracker.
    pub count: u64,
}

impl TrackerTransfer {
    /// Merge another instance's transfer totals into this one, field by
    /// field; a missing entry on either side is treated as zero.
    pub fn merge(&mut self, other: &Self) {
        self.uploaded += other.uploaded;
        self.downloaded += other.downloaded;
        self.total_size += other.total_size;
        self.count += other.count;
    }
}

/// Per-dimension counts over a torrent set, as returned by `compute_counts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TorrentCounts {
    /// Count of torrents per logical status group.
    pub status: BTreeMap<String, u64>,
    /// Count of torrents per category name.
    pub categories: BTreeMap<String, u64>,
    /// Sum of torrent sizes per category name.
    pub category_sizes: BTreeMap<String, i64>,
    /// Count of torrents per tag.
    pub tags: BTreeMap<String, u64>,
    /// Sum of torrent sizes per tag.
    pub tag_sizes: BTreeMap<String, i64>,
    /// Count of torrents per tracker domain.
    pub trackers: BTreeMap<String, u64>,
    /// Transfer totals per tracker domain.
    pub tracker_transfers: BTreeMap<String, TrackerTransfer>,
    /// Total torrent count.
    pub total: u64,
}

impl TorrentCounts {
    /// Merge another instance's counts into this one. Integer maps add
    /// key-wise; `tracker_transfers` merges field-by-field per key; a key
    /// missing on one side is treated as zero.
    pub fn merge(&mut self, other: &Self) {
        merge_count_map(&mut self.status, &other.status);
        merge_count_map(&mut self.categories, &other.categories);
        merge_sum_map(&mut self.category_sizes, &other.category_sizes);
        merge_count_map(&mut self.tags, &other.tags);
        merge_sum_map(&mut self.tag_sizes, &other.tag_sizes);
        merge_count_map(&mut self.trackers, &other.trackers);
        for (domain, transfer) in &other.tracker_transfers {
            self.tracker_transfers
                .entry(domain.clone())
                .or_default()
                .merge(transfer);
        }
        self.total += other.total;
    }
}

fn merge_count_map(into: &mut BTreeMap<String, u64>, from: &BTreeMap<String, u64>) {
    for (key, value) in from {
        *into.entry(key.clone()).or_insert(0) += value;
    }
}

fn merge_sum_map(into: &mut BTreeMap<String, i64>, from: &BTreeMap<String, i64>) {
    for (key, value) in from {
        *into.entry(key.clone()).or_insert(0) += value;
    }
}
