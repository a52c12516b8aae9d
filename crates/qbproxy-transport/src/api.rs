//! Trait abstraction over [`Transport`] so that `qbproxy-sync`,
//! `qbproxy-client`, and `qbproxy-pool` can depend on the qBittorrent wire
//! protocol without depending on `reqwest` directly, and so tests can
//! substitute a fake implementation (see `qbproxy-test-support`).
//!
//! Mirrors the defaulted-trait-method shape the torrent engine abstraction
//! uses elsewhere in this workspace, except every method here is required:
//! the qBittorrent Web API exposes the full surface on every remote, so
//! there is no per-backend capability gap to default away.

use crate::client::{RawLogEntry, RawPeerLogEntry, TorrentListQuery, Transport};
use crate::error::TransportResult;
use crate::wire::{RawAppPreferences, RawBuildInfo, RawMainData, RawTorrent, RawTorrentFile, RawTracker};
use async_trait::async_trait;
use std::time::Duration;

/// The qBittorrent Web API v2 operations a single configured instance
/// exposes, independent of the concrete HTTP stack used to reach it.
#[async_trait]
pub trait QbittorrentTransport: Send + Sync {
    /// `POST /api/v2/auth/login`.
    async fn login(&self, username: &str, password: &str, deadline: Duration) -> TransportResult<()>;
    /// `GET /api/v2/app/version`.
    async fn get_app_version(&self, deadline: Duration) -> TransportResult<String>;
    /// `GET /api/v2/app/webapiVersion`.
    async fn get_webapi_version(&self, deadline: Duration) -> TransportResult<String>;
    /// `GET /api/v2/app/buildInfo`.
    async fn get_build_info(&self, deadline: Duration) -> TransportResult<RawBuildInfo>;
    /// `GET /api/v2/app/preferences`.
    async fn get_app_preferences(&self, deadline: Duration) -> TransportResult<RawAppPreferences>;
    /// `GET /api/v2/sync/maindata?rid=<last>`.
    async fn get_main_data(&self, rid: i64, deadline: Duration) -> TransportResult<RawMainData>;
    /// `GET /api/v2/torrents/info`.
    async fn get_torrents(&self, query: &TorrentListQuery, deadline: Duration) -> TransportResult<Vec<RawTorrent>>;
    /// `GET /api/v2/torrents/files?hash=<hash>`.
    async fn get_files_information(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<RawTorrentFile>>;
    /// `GET /api/v2/torrents/trackers?hash=<hash>`.
    async fn get_torrent_trackers(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<RawTracker>>;
    /// `POST /api/v2/torrents/resume`.
    async fn resume(&self, hashes: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/pause`.
    async fn pause(&self, hashes: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/recheck`.
    async fn recheck(&self, hashes: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setForceStart`.
    async fn force_start(&self, hashes: &[String], value: bool, deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/addTags`.
    async fn add_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setTags`. Requires `Capabilities::supports_set_tags`.
    async fn set_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/removeTags`.
    async fn remove_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setCategory`.
    async fn set_category(&self, hashes: &[String], category: &str, deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setLocation`.
    async fn set_location(&self, hashes: &[String], location: &str, deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setShareLimits`.
    async fn set_share_limits(
        &self,
        hashes: &[String],
        ratio_limit: f64,
        seeding_time_limit: i64,
        inactive_seeding_time_limit: i64,
        deadline: Duration,
    ) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setDownloadLimit` + `setUploadLimit`.
    async fn set_speed_limits(&self, hashes: &[String], download_limit: i64, upload_limit: i64, deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/setAutoManagement`.
    async fn set_auto_management(&self, hashes: &[String], enable: bool, deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/reannounce`.
    async fn reannounce(&self, hashes: &[String], deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/filePrio`.
    async fn set_file_priorities(&self, hash: &str, file_ids: &[u32], priority: i8, deadline: Duration) -> TransportResult<()>;
    /// `GET /api/v2/torrents/export?hash=<hash>`.
    async fn export_torrent(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<u8>>;
    /// `POST /api/v2/torrents/delete`.
    async fn delete(&self, hashes: &[String], delete_files: bool, deadline: Duration) -> TransportResult<()>;
    /// `POST /api/v2/torrents/add` (magnet/URL form).
    async fn add(&self, urls: &[String], save_path: Option<&str>, category: Option<&str>, deadline: Duration) -> TransportResult<()>;
    /// `GET /api/v2/log/main`.
    async fn get_main_logs(&self, last_known_id: i64, deadline: Duration) -> TransportResult<Vec<RawLogEntry>>;
    /// `GET /api/v2/log/peers`.
    async fn get_peer_logs(&self, last_known_id: i64, deadline: Duration) -> TransportResult<Vec<RawPeerLogEntry>>;
}

#[async_trait]
impl QbittorrentTransport for Transport {
    async fn login(&self, username: &str, password: &str, deadline: Duration) -> TransportResult<()> {
        Self::login(self, username, password, deadline).await
    }

    async fn get_app_version(&self, deadline: Duration) -> TransportResult<String> {
        Self::get_app_version(self, deadline).await
    }

    async fn get_webapi_version(&self, deadline: Duration) -> TransportResult<String> {
        Self::get_webapi_version(self, deadline).await
    }

    async fn get_build_info(&self, deadline: Duration) -> TransportResult<RawBuildInfo> {
        Self::get_build_info(self, deadline).await
    }

    async fn get_app_preferences(&self, deadline: Duration) -> TransportResult<RawAppPreferences> {
        Self::get_app_preferences(self, deadline).await
    }

    async fn get_main_data(&self, rid: i64, deadline: Duration) -> TransportResult<RawMainData> {
        Self::get_main_data(self, rid, deadline).await
    }

    async fn get_torrents(&self, query: &TorrentListQuery, deadline: Duration) -> TransportResult<Vec<RawTorrent>> {
        Self::get_torrents(self, query, deadline).await
    }

    async fn get_files_information(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<RawTorrentFile>> {
        Self::get_files_information(self, hash, deadline).await
    }

    async fn get_torrent_trackers(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<RawTracker>> {
        Self::get_torrent_trackers(self, hash, deadline).await
    }

    async fn resume(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        Self::resume(self, hashes, deadline).await
    }

    async fn pause(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        Self::pause(self, hashes, deadline).await
    }

    async fn recheck(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        Self::recheck(self, hashes, deadline).await
    }

    async fn force_start(&self, hashes: &[String], value: bool, deadline: Duration) -> TransportResult<()> {
        Self::force_start(self, hashes, value, deadline).await
    }

    async fn add_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()> {
        Self::add_tags(self, hashes, tags, deadline).await
    }

    async fn set_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()> {
        Self::set_tags(self, hashes, tags, deadline).await
    }

    async fn remove_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()> {
        Self::remove_tags(self, hashes, tags, deadline).await
    }

    async fn set_category(&self, hashes: &[String], category: &str, deadline: Duration) -> TransportResult<()> {
        Self::set_category(self, hashes, category, deadline).await
    }

    async fn set_location(&self, hashes: &[String], location: &str, deadline: Duration) -> TransportResult<()> {
        Self::set_location(self, hashes, location, deadline).await
    }

    async fn set_share_limits(
        &self,
        hashes: &[String],
        ratio_limit: f64,
        seeding_time_limit: i64,
        inactive_seeding_time_limit: i64,
        deadline: Duration,
    ) -> TransportResult<()> {
        Self::set_share_limits(self, hashes, ratio_limit, seeding_time_limit, inactive_seeding_time_limit, deadline).await
    }

    async fn set_speed_limits(&self, hashes: &[String], download_limit: i64, upload_limit: i64, deadline: Duration) -> TransportResult<()> {
        Self::set_speed_limits(self, hashes, download_limit, upload_limit, deadline).await
    }

    async fn set_auto_management(&self, hashes: &[String], enable: bool, deadline: Duration) -> TransportResult<()> {
        Self::set_auto_management(self, hashes, enable, deadline).await
    }

    async fn reannounce(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        Self::reannounce(self, hashes, deadline).await
    }

    async fn set_file_priorities(&self, hash: &str, file_ids: &[u32], priority: i8, deadline: Duration) -> TransportResult<()> {
        Self::set_file_priorities(self, hash, file_ids, priority, deadline).await
    }

    async fn export_torrent(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<u8>> {
        Self::export_torrent(self, hash, deadline).await
    }

    async fn delete(&self, hashes: &[String], delete_files: bool, deadline: Duration) -> TransportResult<()> {
        Self::delete(self, hashes, delete_files, deadline).await
    }

    async fn add(&self, urls: &[String], save_path: Option<&str>, category: Option<&str>, deadline: Duration) -> TransportResult<()> {
        Self::add(self, urls, save_path, category, deadline).await
    }

    async fn get_main_logs(&self, last_known_id: i64, deadline: Duration) -> TransportResult<Vec<RawLogEntry>> {
        Self::get_main_logs(self, last_known_id, deadline).await
    }

    async fn get_peer_logs(&self, last_known_id: i64, deadline: Duration) -> TransportResult<Vec<RawPeerLogEntry>> {
        Self::get_peer_logs(self, last_known_id, deadline).await
    }
}
