//! The per-instance `Client`: wraps a [`QbittorrentTransport`] with
//! capability negotiation, a Sync Manager, the hash index, tracker
//! subsystem, optimistic-update overlay, and the caches that back the
//! twelve operations described in spec.md §4.C.

use crate::app_info::{AppInfo, AppInfoCache, PreferencesCache};
use crate::completion::CompletionTracker;
use crate::error::{ClientError, ClientResult};
use crate::files::{self, FilesManager};
use crate::hash_index::DuplicateIndex;
use crate::optimistic::{self, ActionKind, OptimisticUpdate};
use crate::session::SessionTracker;
use crate::tracker::{TrackerSubsystem, TrackerSubsystemConfig};
use async_trait::async_trait;
use qbproxy_cache::TtlCache;
use qbproxy_config::ProcessConfig;
use qbproxy_core::model::{
    Capabilities, FilterOptions, InstanceId, MainDataSnapshot, Torrent, TorrentFile, Tracker,
};
use qbproxy_core::ErrorKind;
use qbproxy_events::{CompletionHandler, SyncEventError, SyncEventSink};
use qbproxy_sync::filter::{apply_manual_filters, hashes_excluded_for_domain};
use qbproxy_sync::search::filter_torrents_by_search;
use qbproxy_sync::sort::sort_torrents;
use qbproxy_sync::{HealthSink, ManagerState, SyncCommand, SyncManager};
use qbproxy_transport::client::{RawLogEntry, RawPeerLogEntry};
use qbproxy_transport::QbittorrentTransport;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delay before the targeted follow-up poll an [`ActionKind`] requests, so
/// the optimistic overlay converges with the remote quickly (spec.md §4.D).
const ACTION_RESYNC_DELAY: Duration = Duration::from_millis(150);

/// Cadence a populated log cache is treated as fresh for, per spec.md §4.C
/// operation 12 ("5-second poll cycle otherwise").
const LOG_CACHE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct HealthState {
    healthy: AtomicBool,
    last_check: Mutex<Option<Instant>>,
    last_error: Mutex<Option<(ErrorKind, String)>>,
}

impl HealthState {
    fn new() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            ..Self::default()
        }
    }
}

#[async_trait]
impl HealthSink for HealthState {
    async fn mark_unhealthy(&self, _instance_id: InstanceId, kind: ErrorKind, message: String) {
        self.healthy.store(false, Ordering::SeqCst);
        *self.last_error.lock().expect("health last_error lock poisoned") = Some((kind, message));
    }

    async fn mark_healthy(&self, _instance_id: InstanceId) {
        self.healthy.store(true, Ordering::SeqCst);
        *self.last_error.lock().expect("health last_error lock poisoned") = None;
    }
}

struct LogCache<E> {
    slot: Mutex<Option<(Vec<E>, Instant)>>,
}

impl<E: Clone> LogCache<E> {
    fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    fn cached(&self) -> Option<Vec<E>> {
        let guard = self.slot.lock().expect("log cache lock poisoned");
        guard
            .as_ref()
            .filter(|(_, fetched_at)| fetched_at.elapsed() < LOG_CACHE_TTL)
            .map(|(entries, _)| entries.clone())
    }

    fn store(&self, entries: Vec<E>) {
        *self.slot.lock().expect("log cache lock poisoned") = Some((entries, Instant::now()));
    }
}

/// Forwards `MainData`/error events from the Sync Manager to the Client's
/// subsystems (hash index rebuild, completion detection, tracker warmup)
/// before relaying to whatever downstream [`SyncEventSink`] the Pool has
/// installed, if any.
struct DispatchSink<T: QbittorrentTransport> {
    instance_id: InstanceId,
    hash_index: Arc<RwLock<DuplicateIndex>>,
    completion: Arc<CompletionTracker>,
    completion_handler: Option<Arc<dyn CompletionHandler>>,
    tracker_subsystem: Arc<TrackerSubsystem<T>>,
    capabilities: Arc<RwLock<Capabilities>>,
    downstream: Arc<RwLock<Option<Arc<dyn SyncEventSink>>>>,
}

impl<T: QbittorrentTransport> fmt::Debug for DispatchSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSink").field("instance_id", &self.instance_id).finish_non_exhaustive()
    }
}

#[async_trait]
impl<T: QbittorrentTransport + 'static> SyncEventSink for DispatchSink<T> {
    async fn handle_main_data(&self, instance_id: InstanceId, snapshot: &MainDataSnapshot) {
        *self.hash_index.write().expect("hash index lock poisoned") = DuplicateIndex::rebuild(&snapshot.torrents);

        let completed = self.completion.detect_transitions(&snapshot.torrents);
        if let Some(handler) = &self.completion_handler {
            for torrent in &completed {
                handler.handle_completion(instance_id, torrent).await;
            }
        }

        let capable = self.capabilities.read().expect("capabilities lock poisoned").include_trackers_in_list;
        self.tracker_subsystem.schedule_warmup(snapshot, capable);

        if let Some(sink) = self.downstream.read().expect("downstream sink lock poisoned").clone() {
            sink.handle_main_data(instance_id, snapshot).await;
        }
    }

    async fn handle_sync_error(&self, instance_id: InstanceId, error: &SyncEventError) {
        if let Some(sink) = self.downstream.read().expect("downstream sink lock poisoned").clone() {
            sink.handle_sync_error(instance_id, error).await;
        }
    }
}

/// Wraps one configured remote instance: transport, capabilities, the Sync
/// Manager, hash index, tracker subsystem, optimistic overlay, and caches.
pub struct Client<T: QbittorrentTransport> {
    instance_id: InstanceId,
    transport: Arc<T>,
    capabilities: Arc<RwLock<Capabilities>>,
    sync_manager: Arc<SyncManager<T>>,
    sync_commands: mpsc::Sender<SyncCommand>,
    hash_index: Arc<RwLock<DuplicateIndex>>,
    tracker_subsystem: Arc<TrackerSubsystem<T>>,
    optimistic: TtlCache<String, OptimisticUpdate>,
    app_info: AppInfoCache,
    preferences: PreferencesCache,
    files_manager: Arc<dyn FilesManager>,
    session: SessionTracker,
    health: Arc<HealthState>,
    sink: Arc<RwLock<Option<Arc<dyn SyncEventSink>>>>,
    main_logs: LogCache<RawLogEntry>,
    peer_logs: LogCache<RawPeerLogEntry>,
    config: ProcessConfig,
}

impl<T: QbittorrentTransport> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("instance_id", &self.instance_id).finish_non_exhaustive()
    }
}

impl<T: QbittorrentTransport + 'static> Client<T> {
    /// Construct a Client with every subsystem wired up; does not spawn the
    /// Sync Manager's poll loop, see [`Self::spawn`].
    #[must_use]
    pub fn new(
        instance_id: InstanceId,
        transport: Arc<T>,
        files_manager: Arc<dyn FilesManager>,
        completion_handler: Option<Arc<dyn CompletionHandler>>,
        config: ProcessConfig,
    ) -> Arc<Self> {
        let capabilities = Arc::new(RwLock::new(Capabilities::from_webapi_version("0.0.0")));
        let hash_index = Arc::new(RwLock::new(DuplicateIndex::new()));
        let completion = Arc::new(CompletionTracker::new());
        let sink: Arc<RwLock<Option<Arc<dyn SyncEventSink>>>> = Arc::new(RwLock::new(None));
        let tracker_subsystem = Arc::new(TrackerSubsystem::new(
            instance_id,
            Arc::clone(&transport),
            TrackerSubsystemConfig {
                cache_ttl: config.tracker_cache_ttl,
                fetch_chunk_size: config.tracker_fetch_chunk_size,
                fetcher_concurrency: config.tracker_fetcher_concurrency,
                warmup_batch_size: config.tracker_warmup_batch_size,
                warmup_batch_delay: config.tracker_warmup_batch_delay,
                warmup_batch_timeout: config.tracker_warmup_batch_timeout,
            },
        ));

        let dispatch_sink: Arc<dyn SyncEventSink> = Arc::new(DispatchSink {
            instance_id,
            hash_index: Arc::clone(&hash_index),
            completion: Arc::clone(&completion),
            completion_handler,
            tracker_subsystem: Arc::clone(&tracker_subsystem),
            capabilities: Arc::clone(&capabilities),
            downstream: Arc::clone(&sink),
        });

        let health = Arc::new(HealthState::new());
        let (sync_manager, sync_commands) = SyncManager::new(
            instance_id,
            Arc::clone(&transport),
            dispatch_sink,
            Arc::clone(&health) as Arc<dyn HealthSink>,
            Duration::from_secs(1),
            config.connection_timeout,
        );

        Arc::new(Self {
            instance_id,
            transport,
            capabilities,
            sync_manager,
            sync_commands,
            hash_index,
            tracker_subsystem,
            optimistic: TtlCache::new(config.optimistic_update_ttl),
            app_info: AppInfoCache::new(config.app_info_ttl, Duration::from_secs(10)),
            preferences: PreferencesCache::new(config.preferences_ttl, Duration::from_secs(10)),
            files_manager,
            session: SessionTracker::new(config.connection_timeout, Duration::from_secs(30)),
            health,
            sink,
            main_logs: LogCache::new(),
            peer_logs: LogCache::new(),
            config,
        })
    }

    /// Spawn the Sync Manager's poll loop. Must be called at most once.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        Arc::clone(&self.sync_manager).spawn(cancel)
    }

    /// This instance's identifier.
    #[must_use]
    pub const fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    /// Current Sync Manager lifecycle state.
    #[must_use]
    pub fn sync_state(&self) -> ManagerState {
        self.sync_manager.state()
    }

    /// Whether the last [`Self::health_check`] observed the remote as reachable.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.health.healthy.load(Ordering::SeqCst)
    }

    /// A deep clone of the currently negotiated capabilities.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.read().expect("capabilities lock poisoned").clone()
    }

    /// Operation 1: `GetAppInfo`.
    pub async fn get_app_info(&self) -> ClientResult<AppInfo> {
        let (info, capabilities) = self
            .app_info
            .get(&self.transport)
            .await
            .map_err(|source| ClientError::Transport { operation: "get_app_info", source })?;
        if let Some(capabilities) = capabilities {
            *self.capabilities.write().expect("capabilities lock poisoned") = capabilities;
        }
        Ok(info)
    }

    /// Operation 2: `GetAppPreferences`.
    pub async fn get_app_preferences(&self) -> ClientResult<qbproxy_transport::wire::RawAppPreferences> {
        self.preferences
            .get(&self.transport)
            .await
            .map_err(|source| ClientError::Transport { operation: "get_app_preferences", source })
    }

    /// `Invalidate` for the preferences cache.
    pub fn invalidate_app_preferences(&self) {
        self.preferences.invalidate();
    }

    /// Operation 3: `HealthCheck`. Skips the probe if the last successful
    /// check is within [`qbproxy_config::ProcessConfig::min_health_check_interval`].
    pub async fn health_check(&self) -> ClientResult<bool> {
        {
            let last = *self.health.last_check.lock().expect("health last_check lock poisoned");
            if let Some(last_at) = last {
                if last_at.elapsed() < self.config.min_health_check_interval {
                    return Ok(self.health.healthy.load(Ordering::SeqCst));
                }
            }
        }

        let outcome = self.transport.get_webapi_version(self.config.connection_timeout).await;
        *self.health.last_check.lock().expect("health last_check lock poisoned") = Some(Instant::now());
        match outcome {
            Ok(_) => {
                self.health.healthy.store(true, Ordering::SeqCst);
                Ok(true)
            }
            Err(source) => {
                self.health.healthy.store(false, Ordering::SeqCst);
                Err(ClientError::Transport { operation: "health_check", source })
            }
        }
    }

    /// Operation 4: `ListTorrents`. Applies the optimistic overlay, resolves
    /// tracker data when the filter or caller requires it, applies manual
    /// filters/search/sort, then tracker exclusions.
    pub async fn list_torrents(&self, filters: &FilterOptions, include_trackers: bool) -> ClientResult<Vec<Torrent>> {
        let snapshot = self.sync_manager.snapshot();
        let mut torrents: Vec<Torrent> = snapshot.torrents.values().cloned().collect();
        optimistic::apply_overlay(&mut torrents, &self.optimistic);

        let needs_tracker_data = qbproxy_core::model::filters_require_tracker_data(filters) || include_trackers;
        let tracker_lookup: BTreeMap<String, Vec<Tracker>> = if needs_tracker_data {
            let hashes: Vec<String> = torrents.iter().map(|t| t.primary_hash().to_string()).collect();
            let capable = self.capabilities.read().expect("capabilities lock poisoned").include_trackers_in_list;
            self.tracker_subsystem.fetch_for_hashes(&hashes, capable, self.config.connection_timeout).await
        } else {
            BTreeMap::new()
        };

        let mut filtered: Vec<Torrent> = apply_manual_filters(&torrents, filters, &snapshot, &tracker_lookup, needs_tracker_data)
            .into_iter()
            .cloned()
            .collect();

        if let Some(query) = filters.search.as_deref() {
            filtered = filter_torrents_by_search(&filtered, query).into_iter().cloned().collect();
        }

        if !filtered.is_empty() {
            let exclusions = self.tracker_subsystem.exclusions_copy();
            for domain in &filters.trackers {
                let excluded = hashes_excluded_for_domain(&exclusions, domain);
                if !excluded.is_empty() {
                    filtered.retain(|t| !excluded.contains(t.primary_hash()));
                }
            }
        }

        if let Some(column) = filters.sort_by.as_deref() {
            let mut refs: Vec<&Torrent> = filtered.iter().collect();
            sort_torrents(&mut refs, column, filters.reverse, None);
            filtered = refs.into_iter().cloned().collect();
        }

        Ok(filtered)
    }

    /// Operation 5: `GetTorrentsByHashes`. Preserves the order of `hashes`.
    pub fn get_torrents_by_hashes(&self, hashes: &[String]) -> Vec<Torrent> {
        let snapshot = self.sync_manager.snapshot();
        hashes
            .iter()
            .filter_map(|hash| {
                snapshot
                    .torrents
                    .get(hash)
                    .or_else(|| DuplicateIndex::resolve_by_any_hash(&snapshot.torrents, hash))
                    .cloned()
            })
            .collect()
    }

    /// Operation 6: `GetFilesBatch`.
    pub async fn get_files_batch(&self, hashes: &[String]) -> Result<std::collections::HashMap<String, Vec<TorrentFile>>, (String, ErrorKind)> {
        files::get_files_batch(
            &self.transport,
            &self.files_manager,
            self.instance_id,
            hashes,
            self.config.files_batch_concurrency,
            self.config.connection_timeout,
        )
        .await
    }

    /// Operation 7: `HasTorrentByAnyHash`.
    pub fn has_torrent_by_any_hash(&self, hash: &str) -> Option<Torrent> {
        let snapshot = self.sync_manager.snapshot();
        DuplicateIndex::resolve_by_any_hash(&snapshot.torrents, hash).cloned()
    }

    /// Operation 8: `Action`. On success, installs an optimistic update per
    /// hash from the predicted-state table and requests a fast follow-up
    /// poll.
    pub async fn action(&self, hashes: &[String], action: ActionKind) -> ClientResult<()> {
        let timeout = self.config.connection_timeout;
        let result = match action {
            ActionKind::Resume => self.transport.resume(hashes, timeout).await,
            ActionKind::ForceResume => self.transport.force_start(hashes, true, timeout).await,
            ActionKind::Pause => self.transport.pause(hashes, timeout).await,
            ActionKind::Recheck => self.transport.recheck(hashes, timeout).await,
        };
        result.map_err(|source| ClientError::Transport { operation: "action", source })?;

        let snapshot = self.sync_manager.snapshot();
        for hash in hashes {
            let (progress, original_state) = snapshot
                .torrents
                .get(hash)
                .map_or((0.0, qbproxy_core::model::TorrentState::Downloading), |t| (t.progress, t.state));
            optimistic::install(&self.optimistic, hash, action, progress, original_state, self.config.optimistic_update_ttl);
        }
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (add): `AddTorrent`.
    pub async fn add_torrent(&self, urls: &[String], save_path: Option<&str>, category: Option<&str>) -> ClientResult<()> {
        self.transport
            .add(urls, save_path, category, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "add_torrent", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (delete): `DeleteTorrent`. Invalidates hash-index-adjacent
    /// caches for the removed hashes.
    pub async fn delete_torrent(&self, hashes: &[String], delete_files: bool) -> ClientResult<()> {
        self.transport
            .delete(hashes, delete_files, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "delete_torrent", source })?;
        for hash in hashes {
            self.tracker_subsystem.invalidate(&[hash.clone()]);
            self.files_manager.invalidate_cache(self.instance_id, hash).await;
        }
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (location): `SetLocation`.
    pub async fn set_location(&self, hashes: &[String], location: &str) -> ClientResult<()> {
        self.transport
            .set_location(hashes, location, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "set_location", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (category): `SetCategory`.
    pub async fn set_category(&self, hashes: &[String], category: &str) -> ClientResult<()> {
        self.transport
            .set_category(hashes, category, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "set_category", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (share limits): `SetShareLimits`.
    pub async fn set_share_limits(&self, hashes: &[String], ratio_limit: f64, seeding_time_limit: i64, inactive_seeding_time_limit: i64) -> ClientResult<()> {
        self.transport
            .set_share_limits(hashes, ratio_limit, seeding_time_limit, inactive_seeding_time_limit, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "set_share_limits", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (speed limits): `SetSpeedLimits`.
    pub async fn set_speed_limits(&self, hashes: &[String], download_limit: i64, upload_limit: i64) -> ClientResult<()> {
        self.transport
            .set_speed_limits(hashes, download_limit, upload_limit, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "set_speed_limits", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (tags, combined): `SetTags`. Requires
    /// `Capabilities::supports_set_tags`; older remotes must use
    /// [`Self::add_tags`]/[`Self::remove_tags`] instead.
    pub async fn set_tags(&self, hashes: &[String], tags: &[String]) -> ClientResult<()> {
        if !self.capabilities.read().expect("capabilities lock poisoned").supports_set_tags {
            return Err(ClientError::Validation {
                operation: "set_tags",
                reason: "remote does not support the combined setTags endpoint",
            });
        }
        self.transport
            .set_tags(hashes, tags, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "set_tags", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (tags, add): `AddTags`.
    pub async fn add_tags(&self, hashes: &[String], tags: &[String]) -> ClientResult<()> {
        self.transport
            .add_tags(hashes, tags, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "add_tags", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (tags, remove): `RemoveTags`.
    pub async fn remove_tags(&self, hashes: &[String], tags: &[String]) -> ClientResult<()> {
        self.transport
            .remove_tags(hashes, tags, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "remove_tags", source })?;
        SyncManager::<T>::request_resync(&self.sync_commands, ACTION_RESYNC_DELAY).await;
        Ok(())
    }

    /// Operation 9 (reannounce): `ReannounceNow`.
    pub async fn reannounce_now(&self, hashes: &[String]) -> ClientResult<()> {
        self.transport
            .reannounce(hashes, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "reannounce_now", source })
    }

    /// Operation 9 (export): `ExportTorrent`.
    pub async fn export_torrent(&self, hash: &str) -> ClientResult<Vec<u8>> {
        self.transport
            .export_torrent(hash, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "export_torrent", source })
    }

    /// Operation 9 (file priorities): `SetFilePriorities`. Invalidates the
    /// cached file list for `hash` since priorities are embedded in it.
    pub async fn set_file_priorities(&self, hash: &str, file_ids: &[u32], priority: i8) -> ClientResult<()> {
        self.transport
            .set_file_priorities(hash, file_ids, priority, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "set_file_priorities", source })?;
        self.files_manager.invalidate_cache(self.instance_id, hash).await;
        Ok(())
    }

    /// Operation 10: `GetSessionStart`.
    pub async fn get_session_start(&self, force: bool) -> ClientResult<(i64, bool)> {
        self.session.get(&self.transport, force).await
    }

    /// Operation 11a: `SetSyncEventSink`.
    pub fn set_sync_event_sink(&self, sink: Arc<dyn SyncEventSink>) {
        *self.sink.write().expect("sink lock poisoned") = Some(sink);
    }

    /// Operation 11b: `GetSyncEventSink`.
    #[must_use]
    pub fn get_sync_event_sink(&self) -> Option<Arc<dyn SyncEventSink>> {
        self.sink.read().expect("sink lock poisoned").clone()
    }

    /// Operation 12a: `GetMainLogs`.
    pub async fn get_main_logs(&self, last_known_id: i64) -> ClientResult<Vec<RawLogEntry>> {
        if let Some(cached) = self.main_logs.cached() {
            return Ok(cached);
        }
        let entries = self
            .transport
            .get_main_logs(last_known_id, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "get_main_logs", source })?;
        self.main_logs.store(entries.clone());
        Ok(entries)
    }

    /// Operation 12b: peer logs.
    pub async fn get_peer_logs(&self, last_known_id: i64) -> ClientResult<Vec<RawPeerLogEntry>> {
        if let Some(cached) = self.peer_logs.cached() {
            return Ok(cached);
        }
        let entries = self
            .transport
            .get_peer_logs(last_known_id, self.config.connection_timeout)
            .await
            .map_err(|source| ClientError::Transport { operation: "get_peer_logs", source })?;
        self.peer_logs.store(entries.clone());
        Ok(entries)
    }

    /// `AddTrackerExclusions`.
    pub fn add_tracker_exclusions(&self, domain: &str, hashes: &[String]) {
        self.tracker_subsystem.add_exclusions(domain, hashes);
    }

    /// `RemoveTrackerExclusions`.
    pub fn remove_tracker_exclusions(&self, domain: &str, hashes: &[String]) {
        self.tracker_subsystem.remove_exclusions(domain, hashes);
    }

    /// `GetTrackerExclusionsCopy`.
    #[must_use]
    pub fn tracker_exclusions_copy(&self) -> BTreeMap<String, std::collections::HashSet<String>> {
        self.tracker_subsystem.exclusions_copy()
    }

    /// `LookupDuplicateMatches`.
    #[must_use]
    pub fn lookup_duplicate_matches(&self, inputs: &[String]) -> Vec<crate::hash_index::DuplicateMatch> {
        self.hash_index.read().expect("hash index lock poisoned").lookup_duplicate_matches(inputs)
    }
}
