//! Plain-data domain types shared across the proxy core.

mod category;
mod filter;
mod instance;
mod snapshot;
mod stats;
mod torrent;
mod tracker;

pub use category::{Category, CategoryMap, Tag};
pub use filter::{filters_require_tracker_data, FilterOptions, StatusFilter, TRACKER_HEALTH_STATUSES};
pub use instance::{compare_versions, Capabilities, InstanceId, CAPABILITY_THRESHOLD};
pub use snapshot::{MainDataSnapshot, ServerState};
pub use stats::{TorrentCounts, TorrentStats, TrackerTransfer};
pub use torrent::{FilePriority, Torrent, TorrentFile, TorrentState, COMPLETE_STATES};
pub use tracker::{
    classify_tracker_health, message_matches_down, message_matches_unregistered, strip_urls,
    Tracker, TrackerHealth, TrackerStatus, DOWN_MATCHERS, UNREGISTERED_MATCHERS,
};
