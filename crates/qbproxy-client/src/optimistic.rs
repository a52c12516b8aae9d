//! Optimistic-update overlay: a short-lived client-side substitution of a
//! predicted torrent state, applied while waiting for the remote to confirm
//! an action issued through [`crate::client::Client::action`].

use qbproxy_core::model::{Torrent, TorrentState};
use qbproxy_cache::TtlCache;
use std::time::Duration;

/// Action kinds that install a predicted state per spec.md §4.C operation 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// `resume`.
    Resume,
    /// `force_resume`.
    ForceResume,
    /// `pause`.
    Pause,
    /// `recheck`.
    Recheck,
}

/// One entry in the optimistic-update overlay, keyed by hash in the owning
/// [`qbproxy_cache::TtlCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticUpdate {
    /// Predicted state the action should converge to.
    pub predicted_state: TorrentState,
    /// State observed at the moment the action was issued.
    pub original_state: TorrentState,
}

/// Predicted-state table from spec.md §4.C operation 8, keyed on whether the
/// torrent's progress is already complete (`progress == 1.0`).
#[must_use]
pub fn predicted_state(action: ActionKind, progress: f64) -> TorrentState {
    let complete = (progress - 1.0).abs() < f64::EPSILON;
    match (action, complete) {
        (ActionKind::Resume, true) => TorrentState::QueuedUp,
        (ActionKind::Resume, false) => TorrentState::QueuedDl,
        (ActionKind::ForceResume, true) => TorrentState::ForcedUp,
        (ActionKind::ForceResume, false) => TorrentState::ForcedDl,
        (ActionKind::Pause, true) => TorrentState::PausedUp,
        (ActionKind::Pause, false) => TorrentState::PausedDl,
        (ActionKind::Recheck, true) => TorrentState::CheckingUp,
        (ActionKind::Recheck, false) => TorrentState::CheckingDl,
    }
}

/// Apply the overlay in place: for every torrent with a live, unexpired
/// optimistic entry whose predicted state differs from the torrent's
/// current state, substitute the predicted state. When the remote has
/// already converged (predicted == current), the entry is cleared instead
/// so future reads see the raw value (scenario S4).
pub fn apply_overlay(torrents: &mut [Torrent], overlay: &TtlCache<String, OptimisticUpdate>) {
    for torrent in torrents.iter_mut() {
        let hash = torrent.primary_hash().to_string();
        let Some(update) = overlay.get(&hash) else {
            continue;
        };
        if update.predicted_state == torrent.state {
            overlay.delete(&hash);
        } else {
            torrent.state = update.predicted_state;
        }
    }
}

/// Install an optimistic update for `hash`, overwriting any prior entry.
pub fn install(overlay: &TtlCache<String, OptimisticUpdate>, hash: &str, action: ActionKind, progress: f64, original_state: TorrentState, ttl: Duration) {
    overlay.set_with_ttl(
        hash.to_string(),
        OptimisticUpdate {
            predicted_state: predicted_state(action, progress),
            original_state,
        },
        ttl,
    );
}
