//! Tracker domain types and status-message classification.

use serde::{Deserialize, Serialize};

/// Status reported by the remote for a single tracker entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerStatus {
    /// Tracker is disabled.
    #[serde(rename = "disabled")]
    Disabled,
    /// Tracker has not been contacted yet.
    #[serde(rename = "not_contacted")]
    NotContacted,
    /// Tracker was contacted and is working.
    #[serde(rename = "working")]
    Working,
    /// Tracker is being updated.
    #[serde(rename = "updating")]
    Updating,
    /// Tracker was contacted but is not working.
    #[serde(rename = "not_working")]
    NotWorking,
}

/// A single tracker entry for a torrent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    /// Tracker announce URL.
    pub url: String,
    /// Current status.
    pub status: TrackerStatus,
    /// Tier within the torrent's tracker tier list.
    pub tier: i64,
    /// Human-readable status message from the tracker.
    #[serde(default)]
    pub message: String,
    /// Peers reported by this tracker.
    #[serde(default)]
    pub num_peers: i64,
    /// Seeds reported by this tracker.
    #[serde(default)]
    pub num_seeds: i64,
    /// Leeches reported by this tracker.
    #[serde(default)]
    pub num_leeches: i64,
    /// Total downloads reported by this tracker.
    #[serde(default)]
    pub num_downloaded: i64,
}

/// Substrings (checked case-insensitively, after URLs are stripped from the
/// message) that indicate a tracker has reported the torrent unregistered.
pub const UNREGISTERED_MATCHERS: &[&str] = &[
    "trumped",
    "not registered",
    "torrent not found",
    "unregistered",
    "nuked",
    "dead",
];

/// Substrings (checked case-insensitively, after URLs are stripped from the
/// message) that indicate a tracker is down at the transport level.
pub const DOWN_MATCHERS: &[&str] = &[
    "tracker is down",
    "forbidden",
    "service unavailable",
    "bad gateway",
    "timed out",
];

/// Strip `http(s)://` URLs embedded in a tracker message before matching,
/// so a message that merely echoes a URL containing a matcher keyword (e.g.
/// the literal text `http://example.com/down`) is not misclassified.
#[must_use]
pub fn strip_urls(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    loop {
        let Some(scheme_idx) = rest.find("http://").or_else(|| rest.find("https://")) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..scheme_idx]);
        let after_scheme = &rest[scheme_idx..];
        let url_len = after_scheme
            .find(|c: char| c.is_whitespace())
            .unwrap_or(after_scheme.len());
        rest = &after_scheme[url_len..];
    }
    out
}

/// `TrackerMessageMatchesDown`: true if the message (with embedded URLs
/// stripped) contains one of the [`DOWN_MATCHERS`] substrings.
#[must_use]
pub fn message_matches_down(message: &str) -> bool {
    let stripped = strip_urls(message).to_ascii_lowercase();
    DOWN_MATCHERS.iter().any(|needle| stripped.contains(needle))
}

/// `TrackerMessageMatchesUnregistered`: true if the message contains one of
/// the [`UNREGISTERED_MATCHERS`] substrings.
#[must_use]
pub fn message_matches_unregistered(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    UNREGISTERED_MATCHERS
        .iter()
        .any(|needle| lowered.contains(needle))
}

/// Classification of a torrent's tracker health, derived from its tracker list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerHealth {
    /// At least one tracker message matched the unregistered pattern set and
    /// no tracker reports `working`.
    pub unregistered: bool,
    /// At least one tracker is `not_working` with a down-matching message
    /// (or `updating` with an unregistered-matching message is also folded
    /// into `unregistered`, never `tracker_down`) and no tracker reports
    /// `working`.
    pub tracker_down: bool,
}

/// Classify a torrent's tracker list per spec: a torrent is unregistered or
/// tracker-down only if at least one matching tracker is present AND no
/// other tracker reports `Working`. `Updating` alone never counts as down,
/// to avoid flapping on transient announce cycles, but does count toward
/// `unregistered` when its message matches.
#[must_use]
pub fn classify_tracker_health(trackers: &[Tracker]) -> TrackerHealth {
    let any_working = trackers.iter().any(|t| t.status == TrackerStatus::Working);
    if any_working {
        return TrackerHealth {
            unregistered: false,
            tracker_down: false,
        };
    }

    let unregistered = trackers
        .iter()
        .any(|t| message_matches_unregistered(&t.message));

    let tracker_down = trackers.iter().any(|t| {
        t.status == TrackerStatus::NotWorking && message_matches_down(&t.message)
    });

    TrackerHealth {
        unregistered,
        tracker_down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(status: TrackerStatus, message: &str) -> Tracker {
        Tracker {
            url: "https://tracker.example/announce".into(),
            status,
            tier: 0,
            message: message.into(),
            num_peers: 0,
            num_seeds: 0,
            num_leeches: 0,
            num_downloaded: 0,
        }
    }

    #[test]
    fn down_message_false_for_url_literal_containing_keyword() {
        // Invariant 7: a message that is exactly a URL whose path contains a
        // down-keyword must not classify as down.
        assert!(!message_matches_down("http://example.com/forbidden/path"));
    }

    #[test]
    fn down_message_true_for_actual_text() {
        assert!(message_matches_down("This torrent is not working: Service Unavailable"));
    }

    #[test]
    fn unregistered_message_matches_common_phrases() {
        assert!(message_matches_unregistered("Torrent not registered with this tracker"));
        assert!(message_matches_unregistered("Unregistered torrent"));
        assert!(!message_matches_unregistered("all good"));
    }

    #[test]
    fn classify_requires_no_working_tracker() {
        let trackers = vec![
            tracker(TrackerStatus::NotWorking, "unregistered torrent"),
            tracker(TrackerStatus::Working, ""),
        ];
        let health = classify_tracker_health(&trackers);
        assert!(!health.unregistered);
        assert!(!health.tracker_down);
    }

    #[test]
    fn classify_updating_alone_never_reports_down() {
        let trackers = vec![tracker(TrackerStatus::Updating, "service unavailable")];
        let health = classify_tracker_health(&trackers);
        assert!(!health.tracker_down);
    }

    #[test]
    fn classify_updating_with_unregistered_message_reports_unregistered() {
        let trackers = vec![tracker(TrackerStatus::Updating, "torrent not found")];
        let health = classify_tracker_health(&trackers);
        assert!(health.unregistered);
        assert!(!health.tracker_down);
    }

    #[test]
    fn classify_not_working_with_down_message_reports_down() {
        let trackers = vec![tracker(TrackerStatus::NotWorking, "bad gateway")];
        let health = classify_tracker_health(&trackers);
        assert!(health.tracker_down);
        assert!(!health.unregistered);
    }
}
