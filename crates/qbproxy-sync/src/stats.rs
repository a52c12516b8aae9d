//! `calculateStats` and `computeCounts`: aggregate a torrent set into the
//! [`TorrentStats`]/[`TorrentCounts`] DTOs merged across instances by
//! `qbproxy-pool::aggregate`.

use crate::filter::tracker_domain;
use qbproxy_core::model::{Torrent, TorrentCounts, TorrentState, TorrentStats, TrackerTransfer};

/// Aggregate totals over `torrents`.
#[must_use]
pub fn calculate_stats(torrents: &[Torrent]) -> TorrentStats {
    let mut stats = TorrentStats::default();
    for t in torrents {
        stats.total += 1;
        stats.dl_speed += t.dlspeed;
        stats.up_speed += t.upspeed;
        stats.size += t.size;
        if !t.is_complete() {
            stats.remaining += t.size - t.downloaded;
        }

        match t.state {
            TorrentState::Downloading | TorrentState::StalledDl | TorrentState::QueuedDl | TorrentState::ForcedDl => {
                stats.downloading += 1;
            }
            TorrentState::Uploading | TorrentState::StalledUp | TorrentState::QueuedUp | TorrentState::ForcedUp => {
                stats.seeding += 1;
                stats.seeding_size += t.size;
            }
            TorrentState::PausedDl | TorrentState::PausedUp | TorrentState::StoppedDl | TorrentState::StoppedUp => {
                stats.paused += 1;
            }
            TorrentState::Error | TorrentState::MissingFiles => {
                stats.error += 1;
            }
            TorrentState::CheckingDl | TorrentState::CheckingUp | TorrentState::CheckingResumeData => {
                stats.checking += 1;
            }
            _ => {}
        }
    }
    stats
}

/// Per-dimension counts over `torrents`. `status` counts every logical
/// group a torrent belongs to (a torrent can count toward multiple groups,
/// e.g. both `downloading` and `active`), matching the UI's sidebar badges.
#[must_use]
pub fn compute_counts(torrents: &[Torrent]) -> TorrentCounts {
    let mut counts = TorrentCounts::default();
    for t in torrents {
        counts.total += 1;
        *counts.categories.entry(t.category.clone()).or_insert(0) += 1;
        *counts.category_sizes.entry(t.category.clone()).or_insert(0) += t.size;

        for tag in t.tag_list() {
            *counts.tags.entry(tag.to_string()).or_insert(0) += 1;
            *counts.tag_sizes.entry(tag.to_string()).or_insert(0) += t.size;
        }

        let domain = tracker_domain(&t.tracker);
        *counts.status.entry(status_group(t).to_string()).or_insert(0) += 1;
        if t.dlspeed > 0 || t.upspeed > 0 {
            *counts.status.entry("active".to_string()).or_insert(0) += 1;
        } else {
            *counts.status.entry("inactive".to_string()).or_insert(0) += 1;
        }

        *counts.trackers.entry(domain.clone()).or_insert(0) += 1;
        let transfer = counts.tracker_transfers.entry(domain).or_default();
        transfer.uploaded += t.uploaded;
        transfer.downloaded += t.downloaded;
        transfer.total_size += t.size;
        transfer.count += 1;
    }
    counts
}

fn status_group(t: &Torrent) -> &'static str {
    match t.state {
        TorrentState::Downloading | TorrentState::StalledDl | TorrentState::QueuedDl | TorrentState::ForcedDl => "downloading",
        TorrentState::Uploading | TorrentState::StalledUp | TorrentState::QueuedUp | TorrentState::ForcedUp => "seeding",
        TorrentState::PausedDl | TorrentState::PausedUp | TorrentState::StoppedDl | TorrentState::StoppedUp => "paused",
        TorrentState::Error | TorrentState::MissingFiles => "errored",
        TorrentState::CheckingDl | TorrentState::CheckingUp | TorrentState::CheckingResumeData => "checking",
        _ => "other",
    }
}

/// Extend `into` with another instance's transfer totals, used by
/// `qbproxy-pool::aggregate` when merging per-instance [`TorrentCounts`].
pub fn merge_tracker_transfer(into: &mut TrackerTransfer, other: &TrackerTransfer) {
    into.merge(other);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn torrent(state: TorrentState, category: &str, tags: &str, size: i64) -> Torrent {
        Torrent {
            hash: "abc".into(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: "demo".into(),
            state,
            added_on: 0,
            completion_on: -1,
            progress: 0.5,
            dlspeed: 10,
            upspeed: 5,
            size,
            downloaded: size / 2,
            uploaded: 0,
            ratio: 0.0,
            category: category.into(),
            tags: tags.into(),
            tracker: "https://tracker.example/announce".into(),
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
    fn calculate_stats_sums_speeds_and_sizes() {
        let torrents = vec![torrent(TorrentState::Downloading, "", "", 100), torrent(TorrentState::Uploading, "", "", 50)];
        let stats = calculate_stats(&torrents);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.downloading, 1);
        assert_eq!(stats.seeding, 1);
        assert_eq!(stats.dl_speed, 20);
        assert_eq!(stats.size, 150);
    }

    #[test]
    fn compute_counts_groups_by_category_and_tag() {
        let torrents = vec![
            torrent(TorrentState::Downloading, "movies", "hd,new", 100),
            torrent(TorrentState::Downloading, "movies", "new", 200),
        ];
        let counts = compute_counts(&torrents);
        assert_eq!(counts.categories.get("movies"), Some(&2));
        assert_eq!(counts.category_sizes.get("movies"), Some(&300));
        assert_eq!(counts.tags.get("new"), Some(&2));
        assert_eq!(counts.tags.get("hd"), Some(&1));
    }

    #[test]
    fn compute_counts_accumulates_tracker_transfers() {
        let torrents = vec![torrent(TorrentState::Uploading, "", "", 100)];
        let counts = compute_counts(&torrents);
        let transfer = counts.tracker_transfers.get("tracker.example").unwrap();
        assert_eq!(transfer.count, 1);
        assert_eq!(transfer.total_size, 100);
    }
}
