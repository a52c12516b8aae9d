//! Merges a raw `MainData` payload onto an existing [`MainDataSnapshot`].
//!
//! A `full_update` response replaces every collection wholesale (the remote
//! sends a complete dump); an increment patches torrents in place, removes
//! what the remote signals gone, and merges categories/tags/trackers,
//! leaving everything else untouched.

use chrono::Utc;
use qbproxy_core::model::{Category, MainDataSnapshot};
use qbproxy_transport::wire::RawMainData;

/// Apply `raw` onto `snapshot` in place.
pub fn merge_main_data(snapshot: &mut MainDataSnapshot, raw: RawMainData) {
    if raw.full_update {
        apply_full(snapshot, &raw);
    } else {
        apply_increment(snapshot, &raw);
    }
    snapshot.server_state = raw.server_state.into();
    snapshot.rid = raw.rid;
    snapshot.full = raw.full_update;
    snapshot.synced_at = Utc::now();
}

fn apply_full(snapshot: &mut MainDataSnapshot, raw: &RawMainData) {
    snapshot.torrents = raw
        .torrents
        .iter()
        .map(|(hash, patch)| (hash.clone(), patch.clone().into_torrent(hash)))
        .collect();
    snapshot.categories = raw
        .categories
        .iter()
        .map(|(name, category)| (name.clone(), Category::from(category.clone())))
        .collect();
    let mut tags = raw.tags.clone();
    tags.sort();
    tags.dedup();
    snapshot.tags = tags;
    snapshot.trackers = raw.trackers.clone();
}

fn apply_increment(snapshot: &mut MainDataSnapshot, raw: &RawMainData) {
    for (hash, patch) in &raw.torrents {
        match snapshot.torrents.get_mut(hash) {
            Some(existing) => patch.merge_onto(existing),
            None => {
                snapshot.torrents.insert(hash.clone(), patch.clone().into_torrent(hash));
            }
        }
    }
    for hash in &raw.torrents_removed {
        snapshot.torrents.remove(hash);
    }

    for (name, category) in &raw.categories {
        snapshot.categories.insert(name.clone(), Category::from(category.clone()));
    }
    for name in &raw.categories_removed {
        snapshot.categories.remove(name);
    }

    for tag in &raw.tags {
        if !snapshot.tags.contains(tag) {
            snapshot.tags.push(tag.clone());
        }
    }
    snapshot.tags.retain(|tag| !raw.tags_removed.contains(tag));
    snapshot.tags.sort();

    for (tracker_url, hashes) in &raw.trackers {
        snapshot.trackers.insert(tracker_url.clone(), hashes.clone());
    }
}
