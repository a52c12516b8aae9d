//! Completion-transition detection: fires a completion event exactly once
//! per torrent per not-complete → complete transition, and never on the
//! "startup flap" where a torrent is already complete the first time the
//! Client observes it.

use qbproxy_core::model::Torrent;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-hash "last known completion state", per spec.md §4.H.
///
/// The first observation of any hash is recorded without firing — this
/// resolves Open Question 1 (see `DESIGN.md`) conservatively: a torrent
/// that is already complete the first time this tracker sees it (whether
/// that is the very first `MainData` after `Start` or a torrent injected
/// mid-run) never fires a completion event for that observation.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    last_known: Mutex<HashMap<String, bool>>,
}

impl CompletionTracker {
    /// A tracker with no prior observations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the torrents that transitioned from not-complete to complete
    /// since the last call, updating internal state for the next call.
    #[must_use]
    pub fn detect_transitions(&self, torrents: &BTreeMap<String, Torrent>) -> Vec<Torrent> {
        let mut last_known = self.last_known.lock().expect("completion tracker lock poisoned");
        let mut fired = Vec::new();
        for (hash, torrent) in torrents {
            let complete = torrent.is_complete();
            match last_known.get(hash) {
                None => {
                    last_known.insert(hash.clone(), complete);
                }
                Some(&was_complete) => {
                    if !was_complete && complete {
                        fired.push(torrent.clone());
                    }
                    last_known.insert(hash.clone(), complete);
                }
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_core::model::TorrentState;

    fn torrent(hash: &str, state: TorrentState, progress: f64, completion_on: i64) -> Torrent {
        Torrent {
            hash: hash.to_string(),
            infohash_v1: String::new(),
            infohash_v2: String::new(),
            name: "demo".to_string(),
            state,
            added_on: 0,
            completion_on,
            progress,
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
    fn first_observation_never_fires_even_if_already_complete() {
        // Invariant 8 / scenario S3 (startup flap).
        let tracker = CompletionTracker::new();
        let mut torrents = BTreeMap::new();
        torrents.insert(
            "abc".to_string(),
            torrent("abc", TorrentState::CheckingResumeData, 1.0, 123),
        );
        assert!(tracker.detect_transitions(&torrents).is_empty());

        torrents.insert("abc".to_string(), torrent("abc", TorrentState::Uploading, 1.0, 123));
        assert!(
            tracker.detect_transitions(&torrents).is_empty(),
            "scenario S3: no event on either MainData"
        );
    }

    #[test]
    fn fires_exactly_once_on_not_complete_to_complete_transition() {
        // Scenario S2.
        let tracker = CompletionTracker::new();
        let mut torrents = BTreeMap::new();
        torrents.insert("abc".to_string(), torrent("abc", TorrentState::Downloading, 0.5, -1));
        assert!(tracker.detect_transitions(&torrents).is_empty());

        torrents.insert("abc".to_string(), torrent("abc", TorrentState::Uploading, 1.0, 1_700_000_000));
        let fired = tracker.detect_transitions(&torrents);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].hash, "abc");

        torrents.insert("abc".to_string(), torrent("abc", TorrentState::StalledUp, 1.0, 1_700_000_000));
        assert!(tracker.detect_transitions(&torrents).is_empty(), "no re-fire on an already-complete torrent");
    }

    #[test]
    fn unrelated_torrents_do_not_interfere() {
        let tracker = CompletionTracker::new();
        let mut torrents = BTreeMap::new();
        torrents.insert("a".to_string(), torrent("a", TorrentState::Downloading, 0.1, -1));
        torrents.insert("b".to_string(), torrent("b", TorrentState::Downloading, 0.2, -1));
        tracker.detect_transitions(&torrents);

        torrents.insert("a".to_string(), torrent("a", TorrentState::Uploading, 1.0, 1));
        let fired = tracker.detect_transitions(&torrents);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].hash, "a");
    }
}
