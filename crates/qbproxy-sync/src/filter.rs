//! `ApplyManualFilters`: status/category/tag/tracker/hash inclusion and
//! exclusion, applied against a torrent set plus the `MainData` side-tables
//! needed to resolve the logical status groupings.

use qbproxy_core::model::{
    classify_tracker_health, FilterOptions, MainDataSnapshot, Torrent, TorrentState, Tracker,
};
use std::collections::{BTreeMap, HashSet};

/// Status groups that resolve to a set of [`TorrentState`] membership tests.
fn matches_status_group(group: &str, torrent: &Torrent, tracker_health: Option<qbproxy_core::model::TrackerHealth>) -> Option<bool> {
    use TorrentState::{
        CheckingDl, CheckingResumeData, CheckingUp, Downloading, Error, ForcedDl, ForcedUp, MissingFiles,
        PausedDl, PausedUp, QueuedDl, QueuedUp, StalledDl, StalledUp, StoppedDl, StoppedUp, Uploading,
    };
    let state = torrent.state;
    Some(match group {
        "all" => true,
        "downloading" => matches!(state, Downloading | StalledDl | QueuedDl | ForcedDl | CheckingDl),
        "uploading" | "seeding" => matches!(state, Uploading | StalledUp | QueuedUp | ForcedUp | CheckingUp),
        "paused" | "stopped" => matches!(state, PausedDl | PausedUp | StoppedDl | StoppedUp),
        "active" => torrent.dlspeed > 0 || torrent.upspeed > 0,
        "inactive" => torrent.dlspeed == 0 && torrent.upspeed == 0,
        "errored" => matches!(state, Error | MissingFiles),
        "checking" => matches!(state, CheckingDl | CheckingUp | CheckingResumeData),
        "completed" => torrent.is_complete(),
        "resumed" => !matches!(state, PausedDl | PausedUp | StoppedDl | StoppedUp),
        "unregistered" => return tracker_health.map(|h| h.unregistered),
        "tracker_down" => return tracker_health.map(|h| h.tracker_down),
        _ => return None,
    })
}

/// Whole-word match of `needle` against a comma-joined, trimmed tag string.
/// Never a substring match: `"movie"` must not match `"movies"`.
fn tag_list_contains(tags: &str, needle: &str) -> bool {
    tags.split(',').map(str::trim).any(|tag| tag.eq_ignore_ascii_case(needle))
}

fn hash_matches(hashes: &[String], hash: &str) -> bool {
    hashes.iter().any(|h| h.eq_ignore_ascii_case(hash))
}

/// Primary tracker domain used for filtering/grouping, derived from the
/// torrent's `tracker` URL (empty string if the torrent has none).
#[must_use]
pub fn tracker_domain(tracker_url: &str) -> String {
    let without_scheme = tracker_url.split("://").nth(1).unwrap_or(tracker_url);
    without_scheme.split(['/', ':']).next().unwrap_or("").to_string()
}

fn tracker_domain_matches(torrent: &Torrent, domains: &[String]) -> bool {
    let domain = tracker_domain(&torrent.tracker);
    domains.iter().any(|d| {
        if d.is_empty() {
            domain.is_empty()
        } else {
            d.eq_ignore_ascii_case(&domain)
        }
    })
}

/// Apply include/exclude criteria from `filters` to `torrents`.
///
/// `tracker_lookup` supplies per-hash [`Tracker`] lists when
/// `needs_tracker_data` is true (the caller is responsible for populating it
/// — see `filters_require_tracker_data`); when tracker data is required but
/// absent for a given hash, the `unregistered`/`tracker_down` pseudo-status
/// filters are skipped for that torrent rather than treated as a non-match.
#[must_use]
pub fn apply_manual_filters<'a>(
    torrents: &'a [Torrent],
    filters: &FilterOptions,
    _snapshot: &MainDataSnapshot,
    tracker_lookup: &BTreeMap<String, Vec<Tracker>>,
    needs_tracker_data: bool,
) -> Vec<&'a Torrent> {
    torrents
        .iter()
        .filter(|t| passes_filters(t, filters, tracker_lookup, needs_tracker_data))
        .collect()
}

fn passes_filters(
    torrent: &Torrent,
    filters: &FilterOptions,
    tracker_lookup: &BTreeMap<String, Vec<Tracker>>,
    needs_tracker_data: bool,
) -> bool {
    let health = if needs_tracker_data {
        tracker_lookup
            .get(torrent.primary_hash())
            .map(|trackers| classify_tracker_health(trackers))
    } else {
        None
    };

    if !filters.status.is_empty()
        && !filters
            .status
            .iter()
            .any(|group| matches_status_group(group, torrent, health).unwrap_or(true))
    {
        return false;
    }
    if filters
        .exclude_status
        .iter()
        .any(|group| matches_status_group(group, torrent, health).unwrap_or(false))
    {
        return false;
    }

    if !filters.categories.is_empty() && !filters.categories.iter().any(|c| c == &torrent.category) {
        return false;
    }
    if filters.exclude_categories.iter().any(|c| c == &torrent.category) {
        return false;
    }

    if !filters.tags.is_empty() && !filters.tags.iter().any(|tag| tag_list_contains(&torrent.tags, tag)) {
        return false;
    }
    if filters.exclude_tags.iter().any(|tag| tag_list_contains(&torrent.tags, tag)) {
        return false;
    }

    if !filters.trackers.is_empty() && !tracker_domain_matches(torrent, &filters.trackers) {
        return false;
    }
    if !filters.exclude_trackers.is_empty() && tracker_domain_matches(torrent, &filters.exclude_trackers) {
        return false;
    }

    if !filters.hashes.is_empty() && !hash_matches(&filters.hashes, torrent.primary_hash()) {
        return false;
    }
    if hash_matches(&filters.exclude_hashes, torrent.primary_hash()) {
        return false;
    }

    true
}

/// Resolve the set of hashes currently excluded for a given tracker domain
/// filter, per `TrackerExclusion` in spec.md §3: applied by the Client
/// before returning results, not by this function directly, but exposed
/// here so `qbproxy-client` can reuse `tracker_domain` for matching.
#[must_use]
pub fn hashes_excluded_for_domain(exclusions: &BTreeMap<String, HashSet<String>>, domain: &str) -> HashSet<String> {
    exclusions.get(domain).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_core::model::TorrentState;

    fn torrent(hash: &str, state: TorrentState, category: &str, tags: &str, tracker: &str) -> Torrent {
        Torrent {
            hash: hash.into(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: hash.into(),
            state,
            added_on: 0,
            completion_on: -1,
            progress: 0.5,
            dlspeed: 0,
            upspeed: 0,
            size: 0,
            downloaded: 0,
            uploaded: 0,
            ratio: 0.0,
            category: category.into(),
            tags: tags.into(),
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
            last_activity: 0,
        }
    }

    #[test]
    fn tag_matching_is_whole_word_not_substring() {
        assert!(tag_list_contains("movie, anime", "movie"));
        assert!(!tag_list_contains("movies, anime", "movie"));
    }

    #[test]
    fn status_filter_downloading_excludes_seeding() {
        let torrents = vec![
            torrent("a", TorrentState::Downloading, "", "", ""),
            torrent("b", TorrentState::Uploading, "", "", ""),
        ];
        let mut filters = FilterOptions::default();
        filters.status.push("downloading".to_string());
        let snapshot = MainDataSnapshot::empty();
        let result = apply_manual_filters(&torrents, &filters, &snapshot, &BTreeMap::new(), false);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hash, "a");
    }

    #[test]
    fn category_match_is_exact() {
        let torrents = vec![torrent("a", TorrentState::Downloading, "movies", "", "")];
        let mut filters = FilterOptions::default();
        filters.categories.push("movie".to_string());
        let snapshot = MainDataSnapshot::empty();
        let result = apply_manual_filters(&torrents, &filters, &snapshot, &BTreeMap::new(), false);
        assert!(result.is_empty());
    }

    #[test]
    fn exclude_trackers_empty_string_excludes_unknown_domain() {
        let torrents = vec![
            torrent("a", TorrentState::Downloading, "", "", ""),
            torrent("b", TorrentState::Downloading, "", "", "https://tracker.example/announce"),
        ];
        let mut filters = FilterOptions::default();
        filters.exclude_trackers.push(String::new());
        let snapshot = MainDataSnapshot::empty();
        let result = apply_manual_filters(&torrents, &filters, &snapshot, &BTreeMap::new(), false);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hash, "b");
    }

    #[test]
    fn unregistered_filter_skipped_without_tracker_data() {
        let torrents = vec![torrent("a", TorrentState::Downloading, "", "", "")];
        let mut filters = FilterOptions::default();
        filters.status.push("unregistered".to_string());
        let snapshot = MainDataSnapshot::empty();
        // needs_tracker_data = false means the pseudo-status is skipped
        // (treated as a pass), matching spec.md's "filter is skipped" rule.
        let result = apply_manual_filters(&torrents, &filters, &snapshot, &BTreeMap::new(), false);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn hash_matching_is_case_insensitive() {
        let torrents = vec![torrent("ABC123", TorrentState::Downloading, "", "", "")];
        let mut filters = FilterOptions::default();
        filters.hashes.push("abc123".to_string());
        let snapshot = MainDataSnapshot::empty();
        let result = apply_manual_filters(&torrents, &filters, &snapshot, &BTreeMap::new(), false);
        assert_eq!(result.len(), 1);
    }
}
