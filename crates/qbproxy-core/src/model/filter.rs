//! Manual-filter request shape consumed by the Sync Manager's filtering pass.

use serde::{Deserialize, Serialize};

/// Logical status groupings a caller can include/exclude in a filter.
///
/// Kept as plain strings (rather than an enum) because the remote and the
/// UI both treat these as free-form identifiers, including the
/// tracker-health pseudo-statuses (`unregistered`, `tracker_down`) that have
/// no counterpart in [`crate::model::TorrentState`].
pub type StatusFilter = String;

/// Selection/exclusion criteria applied by `apply_manual_filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Status groups a torrent must match at least one of, if non-empty.
    #[serde(default)]
    pub status: Vec<StatusFilter>,
    /// Category names a torrent must match at least one of, if non-empty.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Tag names a torrent must match at least one of, if non-empty.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Tracker domains a torrent must match at least one of, if non-empty.
    #[serde(default)]
    pub trackers: Vec<String>,
    /// Hashes (case-insensitive) a torrent must match at least one of, if non-empty.
    #[serde(default)]
    pub hashes: Vec<String>,
    /// Status groups that exclude a torrent if matched.
    #[serde(default)]
    pub exclude_status: Vec<StatusFilter>,
    /// Category names that exclude a torrent if matched.
    #[serde(default)]
    pub exclude_categories: Vec<String>,
    /// Tag names that exclude a torrent if matched.
    #[serde(default)]
    pub exclude_tags: Vec<String>,
    /// Tracker domains that exclude a torrent if matched. The empty string
    /// excludes torrents whose tracker domain is empty/unknown.
    #[serde(default)]
    pub exclude_trackers: Vec<String>,
    /// Hashes that exclude a torrent if matched.
    #[serde(default)]
    pub exclude_hashes: Vec<String>,
    /// Free-text search term, matched by `filter_torrents_by_search`.
    #[serde(default)]
    pub search: Option<String>,
    /// Column to sort by, matched against `qbproxy_sync::sort` column names.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// Whether to sort in reverse (descending) order.
    #[serde(default)]
    pub reverse: bool,
    /// Whether trackers should be embedded/fetched for this request.
    #[serde(default)]
    pub include_trackers: bool,
}

/// Pseudo-statuses that require tracker data to evaluate.
pub const TRACKER_HEALTH_STATUSES: &[&str] = &["unregistered", "tracker_down"];

/// `filtersRequireTrackerData`: true iff any include/exclude status
/// references one of the tracker-health pseudo-statuses.
#[must_use]
pub fn filters_require_tracker_data(filters: &FilterOptions) -> bool {
    filters
        .status
        .iter()
        .chain(filters.exclude_status.iter())
        .any(|s| TRACKER_HEALTH_STATUSES.contains(&s.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_tracker_data_when_status_references_health_pseudo_status() {
        let mut filters = FilterOptions::default();
        filters.status.push("unregistered".to_string());
        assert!(filters_require_tracker_data(&filters));
    }

    #[test]
    fn does_not_require_tracker_data_for_plain_statuses() {
        let mut filters = FilterOptions::default();
        filters.status.push("downloading".to_string());
        assert!(!filters_require_tracker_data(&filters));
    }
}
