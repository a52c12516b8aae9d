//! Duplicate / Hash Index: maps v1/v2/hybrid infohashes to primary torrent
//! identity, rebuilt atomically from every full `MainData` snapshot.
//!
//! The index is a bidirectional many-to-one mapping: every variant hash a
//! torrent reports (primary, `infohash_v1`, `infohash_v2`) is normalized
//! (trimmed, lowercased) and keyed to one shared [`DuplicateIndexEntry`].
//! Rebuilds construct a fresh `HashMap` and publish it under a single write
//! lock — the index is never mutated in place, so readers under the read
//! lock always see a fully-built generation.

use qbproxy_core::model::Torrent;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Canonical identity a set of variant hashes resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIndexEntry {
    /// Primary hash, case-preserved for display.
    pub canonical_hash: String,
    /// BitTorrent v1 info-hash, case-preserved, empty if absent.
    pub infohash_v1: String,
    /// BitTorrent v2 info-hash, case-preserved, empty if absent.
    pub infohash_v2: String,
    /// Display name at the time of the last rebuild.
    pub name: String,
}

/// One match returned by [`DuplicateIndex::lookup_duplicate_matches`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMatch {
    /// Canonical hash of the matched torrent.
    pub canonical_hash: String,
    /// Display name of the matched torrent.
    pub name: String,
    /// Distinct case variants of the input that matched this entry, in the
    /// order they were supplied (de-duplicated).
    pub matched_hashes: Vec<String>,
}

fn normalize(hash: &str) -> String {
    hash.trim().to_ascii_lowercase()
}

/// Rebuilt on every full `MainData` snapshot; "not ready" until the first
/// build completes, and that readiness latches once set.
#[derive(Debug, Default, Clone)]
pub struct DuplicateIndex {
    ready: bool,
    by_normalized_hash: HashMap<String, Arc<DuplicateIndexEntry>>,
}

impl DuplicateIndex {
    /// An empty, not-yet-built index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether at least one rebuild has completed.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Rebuild from the current torrent map, returning the new generation.
    /// The caller is responsible for publishing this under a write lock
    /// (see [`crate::client::Client`]).
    #[must_use]
    pub fn rebuild(torrents: &BTreeMap<String, Torrent>) -> Self {
        let mut by_normalized_hash = HashMap::with_capacity(torrents.len() * 2);
        for torrent in torrents.values() {
            let entry = Arc::new(DuplicateIndexEntry {
                canonical_hash: torrent.primary_hash().to_string(),
                infohash_v1: torrent.infohash_v1.clone(),
                infohash_v2: torrent.infohash_v2.clone(),
                name: torrent.name.clone(),
            });
            for variant in [torrent.primary_hash(), torrent.infohash_v1.as_str(), torrent.infohash_v2.as_str()] {
                if !variant.is_empty() {
                    by_normalized_hash.insert(normalize(variant), Arc::clone(&entry));
                }
            }
        }
        Self {
            ready: true,
            by_normalized_hash,
        }
    }

    /// `LookupDuplicateMatches`: one match per distinct canonical entry
    /// touched by `inputs`, each carrying the de-duplicated case variants of
    /// `inputs` that resolved to it. Sorted case-insensitively by name.
    #[must_use]
    pub fn lookup_duplicate_matches(&self, inputs: &[String]) -> Vec<DuplicateMatch> {
        let mut by_canonical: BTreeMap<String, (Arc<DuplicateIndexEntry>, Vec<String>)> = BTreeMap::new();
        for input in inputs {
            let Some(entry) = self.by_normalized_hash.get(&normalize(input)) else {
                continue;
            };
            let slot = by_canonical
                .entry(entry.canonical_hash.clone())
                .or_insert_with(|| (Arc::clone(entry), Vec::new()));
            if !slot.1.iter().any(|seen| seen == input) {
                slot.1.push(input.clone());
            }
        }
        let mut matches: Vec<DuplicateMatch> = by_canonical
            .into_values()
            .map(|(entry, matched_hashes)| DuplicateMatch {
                canonical_hash: entry.canonical_hash.clone(),
                name: entry.name.clone(),
                matched_hashes,
            })
            .collect();
        matches.sort_by(|a, b| a.name.to_ascii_lowercase().cmp(&b.name.to_ascii_lowercase()));
        matches
    }

    /// Hybrid-torrent resolution: exact-match the normalized primary hash
    /// first; on miss, fall back to scanning `torrents` for a matching
    /// `infohash_v1`/`infohash_v2` so a caller providing either variant of a
    /// hybrid torrent resolves to the same record.
    #[must_use]
    pub fn resolve_by_any_hash<'a>(torrents: &'a BTreeMap<String, Torrent>, input: &str) -> Option<&'a Torrent> {
        let needle = normalize(input);
        if let Some(direct) = torrents.values().find(|t| normalize(t.primary_hash()) == needle) {
            return Some(direct);
        }
        torrents
            .values()
            .find(|t| normalize(&t.infohash_v1) == needle || normalize(&t.infohash_v2) == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_core::model::TorrentState;

    fn torrent(hash: &str, v1: &str, v2: &str, name: &str) -> Torrent {
        Torrent {
            hash: hash.to_string(),
            infohash_v1: v1.to_string(),
            infohash_v2: v2.to_string(),
            name: name.to_string(),
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

    #[test]
    fn not_ready_until_first_build() {
        let index = DuplicateIndex::new();
        assert!(!index.is_ready());
    }

    #[test]
    fn lookup_returns_exactly_one_match_for_unique_torrent() {
        // Invariant 4.
        let mut torrents = BTreeMap::new();
        torrents.insert("abc".to_string(), torrent("abc", "v1abc", "v2abc", "Demo"));
        let index = DuplicateIndex::rebuild(&torrents);

        let matches = index.lookup_duplicate_matches(&["ABC".to_string()]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Demo");
        assert_eq!(matches[0].canonical_hash, "abc");
    }

    #[test]
    fn lookup_deduplicates_case_variants_but_preserves_each_distinct_case() {
        let mut torrents = BTreeMap::new();
        torrents.insert("abc".to_string(), torrent("abc", "", "", "Demo"));
        let index = DuplicateIndex::rebuild(&torrents);

        let matches = index.lookup_duplicate_matches(&["abc".to_string(), "ABC".to_string(), "abc".to_string()]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_hashes, vec!["abc".to_string(), "ABC".to_string()]);
    }

    #[test]
    fn lookup_sorts_results_case_insensitively_by_name() {
        let mut torrents = BTreeMap::new();
        torrents.insert("a".to_string(), torrent("a", "", "", "zeta"));
        torrents.insert("b".to_string(), torrent("b", "", "", "Alpha"));
        let index = DuplicateIndex::rebuild(&torrents);

        let matches = index.lookup_duplicate_matches(&["a".to_string(), "b".to_string()]);
        assert_eq!(matches.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(), vec!["Alpha", "zeta"]);
    }

    #[test]
    fn resolves_hybrid_torrent_by_either_variant() {
        // Scenario S5.
        let mut torrents = BTreeMap::new();
        torrents.insert("v2...456".to_string(), torrent("v2...456", "v1...456", "v2...456", "Hybrid"));

        let resolved = DuplicateIndex::resolve_by_any_hash(&torrents, "V1...456").expect("resolved");
        assert_eq!(resolved.hash, "v2...456");
    }

    #[test]
    fn lookup_ignores_hashes_with_no_match() {
        let torrents = BTreeMap::new();
        let index = DuplicateIndex::rebuild(&torrents);
        assert!(index.lookup_duplicate_matches(&["missing".to_string()]).is_empty());
    }
}
