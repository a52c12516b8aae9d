//! `GetAppInfo` / `GetAppPreferences`: single-slot TTL caches backed by the
//! transport, each deep-cloned on read so callers never alias cache storage.

use qbproxy_core::model::Capabilities;
use qbproxy_transport::wire::RawAppPreferences;
use qbproxy_transport::{QbittorrentTransport, TransportResult};
use std::sync::Arc;
use std::time::Duration;

/// `{Version, WebAPIVersion, BuildInfo}` as returned by `GetAppInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    /// `app/version` response.
    pub version: String,
    /// `app/webapiVersion` response, the source of [`Capabilities`] negotiation.
    pub webapi_version: String,
    /// qBittorrent's bundled Qt version.
    pub build_qt: String,
    /// qBittorrent's bundled libtorrent version.
    pub build_libtorrent: String,
}

/// Single-slot cache over [`AppInfo`], refreshed on demand and re-deriving
/// [`Capabilities`] on every successful refresh.
#[derive(Debug)]
pub struct AppInfoCache {
    ttl: Duration,
    request_timeout: Duration,
    slot: std::sync::Mutex<Option<(AppInfo, std::time::Instant)>>,
}

impl AppInfoCache {
    /// Construct an empty cache with the given TTL and per-request timeout.
    #[must_use]
    pub fn new(ttl: Duration, request_timeout: Duration) -> Self {
        Self {
            ttl,
            request_timeout,
            slot: std::sync::Mutex::new(None),
        }
    }

    /// Return the cached value, refreshing first if stale or absent. On a
    /// successful refresh, also returns the freshly derived [`Capabilities`]
    /// so the caller can apply them.
    pub async fn get<T: QbittorrentTransport>(&self, transport: &Arc<T>) -> TransportResult<(AppInfo, Option<Capabilities>)> {
        if let Some((info, fetched_at)) = self.slot.lock().expect("app info cache lock poisoned").clone() {
            if fetched_at.elapsed() < self.ttl {
                return Ok((info, None));
            }
        }

        let version = transport.get_app_version(self.request_timeout).await?;
        let webapi_version = transport.get_webapi_version(self.request_timeout).await?;
        let build_info = transport.get_build_info(self.request_timeout).await?;
        let info = AppInfo {
            version,
            webapi_version: webapi_version.clone(),
            build_qt: build_info.qt,
            build_libtorrent: build_info.libtorrent,
        };
        *self.slot.lock().expect("app info cache lock poisoned") = Some((info.clone(), std::time::Instant::now()));
        Ok((info, Some(Capabilities::from_webapi_version(&webapi_version))))
    }
}

/// Single-slot cache over [`RawAppPreferences`].
#[derive(Debug)]
pub struct PreferencesCache {
    ttl: Duration,
    request_timeout: Duration,
    slot: std::sync::Mutex<Option<(RawAppPreferences, std::time::Instant)>>,
}

impl PreferencesCache {
    /// Construct an empty cache with the given TTL and per-request timeout.
    #[must_use]
    pub fn new(ttl: Duration, request_timeout: Duration) -> Self {
        Self {
            ttl,
            request_timeout,
            slot: std::sync::Mutex::new(None),
        }
    }

    /// Return the cached value, refreshing first if stale or absent.
    pub async fn get<T: QbittorrentTransport>(&self, transport: &Arc<T>) -> TransportResult<RawAppPreferences> {
        if let Some((prefs, fetched_at)) = self.slot.lock().expect("preferences cache lock poisoned").clone() {
            if fetched_at.elapsed() < self.ttl {
                return Ok(prefs);
            }
        }
        let prefs = transport.get_app_preferences(self.request_timeout).await?;
        *self.slot.lock().expect("preferences cache lock poisoned") = Some((prefs.clone(), std::time::Instant::now()));
        Ok(prefs)
    }

    /// `Invalidate`: force the next `get` to refresh.
    pub fn invalidate(&self) {
        *self.slot.lock().expect("preferences cache lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use qbproxy_transport::client::{RawLogEntry, RawPeerLogEntry, TorrentListQuery};
    use qbproxy_transport::error::TransportResult as Result_;
    use qbproxy_transport::wire::{RawBuildInfo, RawMainData, RawTorrent, RawTorrentFile, RawTracker};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeTransport {
        version_calls: AtomicUsize,
        prefs_calls: AtomicUsize,
    }

    #[async_trait]
    impl QbittorrentTransport for FakeTransport {
        async fn login(&self, _username: &str, _password: &str, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn get_app_version(&self, _deadline: Duration) -> Result_<String> {
            self.version_calls.fetch_add(1, Ordering::SeqCst);
            Ok("4.6.0".to_string())
        }
        async fn get_webapi_version(&self, _deadline: Duration) -> Result_<String> {
            Ok("2.11.4".to_string())
        }
        async fn get_build_info(&self, _deadline: Duration) -> Result_<RawBuildInfo> {
            Ok(RawBuildInfo::default())
        }
        async fn get_app_preferences(&self, _deadline: Duration) -> Result_<RawAppPreferences> {
            self.prefs_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawAppPreferences::default())
        }
        async fn get_main_data(&self, _rid: i64, _deadline: Duration) -> Result_<RawMainData> {
            unimplemented!()
        }
        async fn get_torrents(&self, _query: &TorrentListQuery, _deadline: Duration) -> Result_<Vec<RawTorrent>> {
            unimplemented!()
        }
        async fn get_files_information(&self, _hash: &str, _deadline: Duration) -> Result_<Vec<RawTorrentFile>> {
            unimplemented!()
        }
        async fn get_torrent_trackers(&self, _hash: &str, _deadline: Duration) -> Result_<Vec<RawTracker>> {
            unimplemented!()
        }
        async fn resume(&self, _hashes: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn pause(&self, _hashes: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn recheck(&self, _hashes: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn force_start(&self, _hashes: &[String], _value: bool, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn add_tags(&self, _hashes: &[String], _tags: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_tags(&self, _hashes: &[String], _tags: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn remove_tags(&self, _hashes: &[String], _tags: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_category(&self, _hashes: &[String], _category: &str, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_location(&self, _hashes: &[String], _location: &str, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_share_limits(&self, _hashes: &[String], _ratio_limit: f64, _seeding_time_limit: i64, _inactive_seeding_time_limit: i64, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_speed_limits(&self, _hashes: &[String], _download_limit: i64, _upload_limit: i64, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_auto_management(&self, _hashes: &[String], _enable: bool, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn reannounce(&self, _hashes: &[String], _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn set_file_priorities(&self, _hash: &str, _file_ids: &[u32], _priority: i8, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn export_torrent(&self, _hash: &str, _deadline: Duration) -> Result_<Vec<u8>> {
            unimplemented!()
        }
        async fn delete(&self, _hashes: &[String], _delete_files: bool, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn add(&self, _urls: &[String], _save_path: Option<&str>, _category: Option<&str>, _deadline: Duration) -> Result_<()> {
            unimplemented!()
        }
        async fn get_main_logs(&self, _last_known_id: i64, _deadline: Duration) -> Result_<Vec<RawLogEntry>> {
            unimplemented!()
        }
        async fn get_peer_logs(&self, _last_known_id: i64, _deadline: Duration) -> Result_<Vec<RawPeerLogEntry>> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn app_info_refreshes_once_within_ttl_and_derives_capabilities() {
        let transport = Arc::new(FakeTransport::default());
        let cache = AppInfoCache::new(Duration::from_secs(300), Duration::from_secs(10));

        let (info, caps) = cache.get(&transport).await.expect("first fetch");
        assert_eq!(info.version, "4.6.0");
        assert!(caps.expect("capabilities on first fetch").supports_set_tags);

        let (_, caps_again) = cache.get(&transport).await.expect("cached fetch");
        assert!(caps_again.is_none(), "no re-derivation on a cache hit");
        assert_eq!(transport.version_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn preferences_invalidate_forces_refetch() {
        let transport = Arc::new(FakeTransport::default());
        let cache = PreferencesCache::new(Duration::from_secs(30), Duration::from_secs(10));

        cache.get(&transport).await.expect("first fetch");
        cache.get(&transport).await.expect("cached fetch");
        assert_eq!(transport.prefs_calls.load(Ordering::SeqCst), 1);

        cache.invalidate();
        cache.get(&transport).await.expect("post-invalidate fetch");
        assert_eq!(transport.prefs_calls.load(Ordering::SeqCst), 2);
    }
}
