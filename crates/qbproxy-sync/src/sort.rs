//! Torrent-list sorting: column dispatch, state-priority/name/hash
//! tie-breakers, timestamp sign handling, and tracker-column grouping.

use qbproxy_core::model::Torrent;
use std::cmp::Ordering;

use crate::filter::tracker_domain;

/// Seconds per bucket used to coarsen timestamp comparisons for the
/// `last_activity` column before falling back to the tie-breaker chain,
/// so torrents active within the same minute compare as equal on that key.
const LAST_ACTIVITY_BUCKET_SECONDS: i64 = 60;

/// Resolves a tracker domain to a user-facing display name for grouping
/// merged tracker domains together in the `tracker` sort column. Returns
/// `None` when the domain has no customization, in which case the domain
/// itself is used as the display name.
pub trait TrackerDisplayNameLookup {
    /// Look up the display name for `domain`, if customized.
    fn display_name(&self, domain: &str) -> Option<String>;
}

impl<F: Fn(&str) -> Option<String>> TrackerDisplayNameLookup for F {
    fn display_name(&self, domain: &str) -> Option<String> {
        self(domain)
    }
}

fn case_insensitive_tie_break(a: &Torrent, b: &Torrent) -> Ordering {
    a.state
        .sort_priority()
        .cmp(&b.state.sort_priority())
        .then_with(|| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()))
        .then_with(|| a.hash.to_ascii_lowercase().cmp(&b.hash.to_ascii_lowercase()))
}

fn timestamp_value(torrent: &Torrent, column: &str) -> i64 {
    match column {
        "added_on" => torrent.added_on,
        "completion_on" => torrent.completion_on,
        "last_activity" => torrent.last_activity,
        _ => 0,
    }
}

fn bucket(value: i64, bucket_seconds: i64) -> i64 {
    if value <= 0 {
        value
    } else {
        value / bucket_seconds
    }
}

fn numeric_value(torrent: &Torrent, column: &str) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    match column {
        "size" => Some(torrent.size as f64),
        "progress" => Some(torrent.progress),
        "dlspeed" => Some(torrent.dlspeed as f64),
        "upspeed" => Some(torrent.upspeed as f64),
        "ratio" => Some(torrent.ratio),
        "eta" => Some(torrent.eta as f64),
        "num_seeds" => Some(torrent.num_seeds as f64),
        "num_leechs" => Some(torrent.num_leechs as f64),
        "availability" => Some(torrent.availability),
        _ => None,
    }
}

fn compare_tracker_column(a: &Torrent, b: &Torrent, reverse: bool, lookup: Option<&dyn TrackerDisplayNameLookup>) -> Ordering {
    let domain_a = tracker_domain(&a.tracker);
    let domain_b = tracker_domain(&b.tracker);
    let empty_a = domain_a.is_empty();
    let empty_b = domain_b.is_empty();
    // Torrents without a tracker sort to the end in both directions: this
    // placement is independent of `reverse`.
    if empty_a != empty_b {
        return if empty_a { Ordering::Greater } else { Ordering::Less };
    }
    if empty_a && empty_b {
        return Ordering::Equal;
    }
    let name_a = lookup.and_then(|l| l.display_name(&domain_a)).unwrap_or_else(|| domain_a.clone());
    let name_b = lookup.and_then(|l| l.display_name(&domain_b)).unwrap_or_else(|| domain_b.clone());
    let mut ordering = name_a
        .to_ascii_lowercase()
        .cmp(&name_b.to_ascii_lowercase())
        .then_with(|| domain_a.to_ascii_lowercase().cmp(&domain_b.to_ascii_lowercase()));
    if reverse {
        ordering = ordering.reverse();
    }
    ordering
}

/// Compare two torrents for `column`, honoring `reverse`, and finally the
/// state-priority/name/hash tie-breaker chain (which is never itself
/// reversed by `reverse` — only the primary key is).
#[must_use]
pub fn compare_torrents(a: &Torrent, b: &Torrent, column: &str, reverse: bool, tracker_lookup: Option<&dyn TrackerDisplayNameLookup>) -> Ordering {
    let primary = match column {
        "tracker" => return compare_tracker_column(a, b, reverse, tracker_lookup).then_with(|| case_insensitive_tie_break(a, b)),
        "added_on" | "completion_on" => {
            let (va, vb) = (timestamp_value(a, column), timestamp_value(b, column));
            let ordering = va.cmp(&vb);
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        }
        "last_activity" => {
            let (va, vb) = (
                bucket(timestamp_value(a, column), LAST_ACTIVITY_BUCKET_SECONDS),
                bucket(timestamp_value(b, column), LAST_ACTIVITY_BUCKET_SECONDS),
            );
            let ordering = va.cmp(&vb);
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        }
        "name" => {
            let ordering = a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase());
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        }
        "hash" => {
            let ordering = a.hash.to_ascii_lowercase().cmp(&b.hash.to_ascii_lowercase());
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        }
        "state" => {
            let ordering = a.state.sort_priority().cmp(&b.state.sort_priority());
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        }
        _ => match (numeric_value(a, column), numeric_value(b, column)) {
            (Some(va), Some(vb)) => {
                let ordering = va.partial_cmp(&vb).unwrap_or(Ordering::Equal);
                if reverse {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            _ => Ordering::Equal,
        },
    };
    primary.then_with(|| case_insensitive_tie_break(a, b))
}

/// Sort `torrents` in place by `column`.
pub fn sort_torrents(torrents: &mut [&Torrent], column: &str, reverse: bool, tracker_lookup: Option<&dyn TrackerDisplayNameLookup>) {
    torrents.sort_by(|a, b| compare_torrents(a, b, column, reverse, tracker_lookup));
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_core::model::TorrentState;

    fn torrent(hash: &str, name: &str, added_on: i64, tracker: &str, last_activity: i64) -> Torrent {
        Torrent {
            hash: hash.into(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: name.into(),
            state: TorrentState::Downloading,
            added_on,
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
            tracker: tracker.into(),
            trackers: Vec::new(),
            save_path: String::new(),
            priority: 0,
            eta: -1,
            num_seeds: 0,
            num_leechs: 0,
            force_start: false,
            super_seeding: false,
            availability: 0.0,
            last_activity,
        }
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let b = torrent("1", "banana", 0, "", 0);
        let a = torrent("2", "Apple", 0, "", 0);
        let mut list = vec![&b, &a];
        sort_torrents(&mut list, "name", false, None);
        assert_eq!(list[0].name, "Apple");
    }

    #[test]
    fn timestamps_respect_sign_ascending() {
        let never = torrent("1", "a", -1, "", 0);
        let old = torrent("2", "b", 100, "", 0);
        let zero = torrent("3", "c", 0, "", 0);
        let mut list = vec![&old, &never, &zero];
        sort_torrents(&mut list, "added_on", false, None);
        assert_eq!(list.iter().map(|t| t.added_on).collect::<Vec<_>>(), vec![-1, 0, 100]);
    }

    #[test]
    fn timestamps_respect_sign_descending() {
        let never = torrent("1", "a", -1, "", 0);
        let old = torrent("2", "b", 100, "", 0);
        let zero = torrent("3", "c", 0, "", 0);
        let mut list = vec![&old, &never, &zero];
        sort_torrents(&mut list, "added_on", true, None);
        assert_eq!(list.iter().map(|t| t.added_on).collect::<Vec<_>>(), vec![100, 0, -1]);
    }

    #[test]
    fn tracker_column_puts_no_tracker_last_in_both_directions() {
        let none = torrent("1", "a", 0, "", 0);
        let zed = torrent("2", "b", 0, "https://zed.example/announce", 0);
        let mut ascending = vec![&none, &zed];
        sort_torrents(&mut ascending, "tracker", false, None);
        assert_eq!(ascending[1].hash, "1");

        let mut descending = vec![&none, &zed];
        sort_torrents(&mut descending, "tracker", true, None);
        assert_eq!(descending[1].hash, "1");
    }

    #[test]
    fn tracker_customization_groups_merged_domains() {
        let merged_a = torrent("1", "a", 0, "https://tracker-a.example/announce", 0);
        let merged_b = torrent("2", "b", 0, "https://tracker-b.example/announce", 0);
        let other = torrent("3", "c", 0, "https://zeta.example/announce", 0);
        let lookup = |domain: &str| -> Option<String> {
            if domain.starts_with("tracker-") {
                Some("Merged Group".to_string())
            } else {
                None
            }
        };
        let mut list = vec![&other, &merged_b, &merged_a];
        sort_torrents(&mut list, "tracker", false, Some(&lookup));
        assert_eq!(list[0].hash, "1");
        assert_eq!(list[1].hash, "2");
        assert_eq!(list[2].hash, "3");
    }

    #[test]
    fn last_activity_buckets_coarse_intervals() {
        let a = torrent("1", "a", 0, "", 100);
        let b = torrent("2", "b", 0, "", 110);
        // Both fall in the same 60s bucket, so the tie-breaker (name) decides.
        let mut list = vec![&b, &a];
        sort_torrents(&mut list, "last_activity", false, None);
        assert_eq!(list[0].hash, "1");
    }
}
