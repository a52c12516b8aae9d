//! Tracker Subsystem: per-hash tracker cache, capability-gated fetch paths,
//! warmup scheduling, per-domain exclusions, and status classification
//! (status classification itself lives in `qbproxy_core::model::tracker`
//! and is re-exported here for callers that only need `qbproxy-client`).

use qbproxy_cache::TtlCache;
use qbproxy_core::model::{InstanceId, MainDataSnapshot, Tracker, TrackerStatus};
use qbproxy_transport::{QbittorrentTransport, TorrentListQuery};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

pub use qbproxy_core::model::{classify_tracker_health, message_matches_down, message_matches_unregistered};

/// Synthesize a minimal [`Tracker`] from a bulk-listing announce URL. The
/// bulk endpoint's embedded `trackers` field carries only the URL, never
/// per-tracker status/message/counts (those require `GET
/// /api/v2/torrents/trackers`), so status defaults to `NotContacted` and
/// every count to zero.
fn tracker_from_url(url: String) -> Tracker {
    Tracker {
        url,
        status: TrackerStatus::NotContacted,
        tier: 0,
        message: String::new(),
        num_peers: 0,
        num_seeds: 0,
        num_leeches: 0,
        num_downloaded: 0,
    }
}

/// Tunables the owning [`crate::client::Client`] passes in at construction,
/// mirroring `qbproxy_config::ProcessConfig`'s tracker-related fields.
#[derive(Debug, Clone)]
pub struct TrackerSubsystemConfig {
    /// TTL applied to each cached tracker-list entry.
    pub cache_ttl: Duration,
    /// Hashes per chunk for the capability-gated bulk fetch path.
    pub fetch_chunk_size: usize,
    /// Bounded concurrency for the fallback per-hash fetch path.
    pub fetcher_concurrency: usize,
    /// Hashes per batch for `ScheduleTrackerWarmup`.
    pub warmup_batch_size: usize,
    /// Delay between warmup batches.
    pub warmup_batch_delay: Duration,
    /// Timeout applied to a single warmup batch.
    pub warmup_batch_timeout: Duration,
}

/// Tracker cache, fetch paths, warmup scheduler, and exclusions for one
/// Client. Generic over the transport so tests can substitute a fake.
pub struct TrackerSubsystem<T: QbittorrentTransport> {
    instance_id: InstanceId,
    transport: Arc<T>,
    config: TrackerSubsystemConfig,
    cache: TtlCache<String, Option<Vec<Tracker>>>,
    pending_warmup: Mutex<HashSet<String>>,
    exclusions: RwLock<BTreeMap<String, HashSet<String>>>,
}

impl<T: QbittorrentTransport> std::fmt::Debug for TrackerSubsystem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerSubsystem")
            .field("instance_id", &self.instance_id)
            .field("cache_len", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl<T: QbittorrentTransport + 'static> TrackerSubsystem<T> {
    /// Construct a fresh subsystem; the cache starts empty.
    pub fn new(instance_id: InstanceId, transport: Arc<T>, config: TrackerSubsystemConfig) -> Self {
        Self {
            instance_id,
            transport,
            cache: TtlCache::new(config.cache_ttl),
            config,
            pending_warmup: Mutex::new(HashSet::new()),
            exclusions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Fetch trackers for `hashes`, consulting the cache first. `capable`
    /// selects the bulk chunked path (`GET /api/v2/torrents/info` with
    /// `includeTrackers=true`, in chunks of up to `fetch_chunk_size`) versus
    /// the bounded-concurrency per-hash fallback (`GET
    /// /api/v2/torrents/trackers`); both ultimately populate the same cache
    /// and negatively cache hashes the remote reports nothing for.
    #[instrument(skip(self, hashes), fields(instance_id = %self.instance_id, count = hashes.len()))]
    pub async fn fetch_for_hashes(&self, hashes: &[String], capable: bool, deadline: Duration) -> BTreeMap<String, Vec<Tracker>> {
        let mut result = BTreeMap::new();
        let mut missing = Vec::new();
        for hash in hashes {
            match self.cache.get(hash) {
                Some(Some(trackers)) => {
                    result.insert(hash.clone(), trackers);
                }
                Some(None) => {}
                None => missing.push(hash.clone()),
            }
        }
        if missing.is_empty() {
            return result;
        }

        if capable {
            self.fetch_bulk(&missing, deadline, &mut result).await;
        } else {
            self.fetch_per_hash(&missing, deadline, &mut result).await;
        }
        result
    }

    /// Bulk chunked path for capable remotes: `GET /api/v2/torrents/info`
    /// with `includeTrackers=true`, in chunks of up to `fetch_chunk_size`,
    /// run concurrently. A hash absent from its chunk's response, or whose
    /// embedded tracker list is empty, is negatively cached.
    async fn fetch_bulk(&self, missing: &[String], deadline: Duration, result: &mut BTreeMap<String, Vec<Tracker>>) {
        let chunk_size = self.config.fetch_chunk_size.max(1);
        let chunks: Vec<Vec<String>> = missing.chunks(chunk_size).map(<[String]>::to_vec).collect();
        let semaphore = Arc::new(Semaphore::new(chunks.len().max(1)));

        let mut tasks = Vec::new();
        for chunk in chunks {
            let transport = Arc::clone(&self.transport);
            let semaphore = Arc::clone(&semaphore);
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("tracker fetch semaphore closed");
                let query = TorrentListQuery {
                    hashes: chunk.clone(),
                    include_trackers: true,
                };
                let outcome = transport.get_torrents(&query, deadline).await;
                (chunk, outcome)
            }));
        }

        for task in tasks {
            let (chunk, outcome) = task.await.expect("tracker fetch task panicked");
            match outcome {
                Ok(torrents) => {
                    let mut seen = HashSet::with_capacity(torrents.len());
                    for raw in torrents {
                        let Some(hash) = raw.hash else { continue };
                        seen.insert(hash.clone());
                        let trackers: Vec<Tracker> = raw.trackers.unwrap_or_default().into_iter().map(tracker_from_url).collect();
                        if trackers.is_empty() {
                            self.cache.set(hash, None);
                        } else {
                            self.cache.set(hash.clone(), Some(trackers.clone()));
                            result.insert(hash, trackers);
                        }
                    }
                    for hash in chunk {
                        if !seen.contains(&hash) {
                            self.cache.set(hash, None);
                        }
                    }
                }
                Err(source) => {
                    warn!(error = %source, chunk_len = chunk.len(), "bulk tracker fetch failed; negatively caching chunk");
                    for hash in chunk {
                        self.cache.set(hash, None);
                    }
                }
            }
        }
    }

    /// Bounded-concurrency per-hash fallback for remotes that cannot fold
    /// trackers into the bulk listing: one `GET /api/v2/torrents/trackers`
    /// request per hash. An empty tracker list, or a failed request, is
    /// negatively cached rather than returned.
    async fn fetch_per_hash(&self, missing: &[String], deadline: Duration, result: &mut BTreeMap<String, Vec<Tracker>>) {
        let semaphore = Arc::new(Semaphore::new(self.config.fetcher_concurrency.max(1)));

        let mut tasks = Vec::new();
        for hash in missing {
            let hash = hash.clone();
            let transport = Arc::clone(&self.transport);
            let semaphore = Arc::clone(&semaphore);
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("tracker fetch semaphore closed");
                let outcome = transport.get_torrent_trackers(&hash, deadline).await;
                (hash, outcome)
            }));
        }

        for task in tasks {
            let (hash, outcome) = task.await.expect("tracker fetch task panicked");
            match outcome {
                Ok(raw) => {
                    let trackers: Vec<Tracker> = raw.into_iter().map(Tracker::from).collect();
                    if trackers.is_empty() {
                        self.cache.set(hash, None);
                    } else {
                        self.cache.set(hash.clone(), Some(trackers.clone()));
                        result.insert(hash, trackers);
                    }
                }
                Err(source) => {
                    warn!(hash = %hash, error = %source, "tracker fetch failed; negatively caching");
                    self.cache.set(hash, None);
                }
            }
        }
    }

    /// Drop cached entries for specific hashes, or everything when `hashes`
    /// is empty.
    pub fn invalidate(&self, hashes: &[String]) {
        self.cache.invalidate(hashes);
    }

    /// `ScheduleTrackerWarmup`: de-duplicate against hashes already cached
    /// or already pending, order the remainder by `added_on` descending
    /// using `snapshot`, and spawn a background task that fetches in
    /// batches with an inter-batch delay and per-batch timeout. Returns
    /// immediately; the pending set prevents overlapping warmups for the
    /// same hashes.
    pub fn schedule_warmup(self: &Arc<Self>, snapshot: &MainDataSnapshot, capable: bool) {
        let mut ordered: Vec<String> = snapshot.torrents.values().map(|t| t.primary_hash().to_string()).collect();
        ordered.sort_by_key(|hash| std::cmp::Reverse(snapshot.torrents.get(hash).map_or(0, |t| t.added_on)));

        let to_warm = {
            let mut pending = self.pending_warmup.lock().expect("tracker warmup pending lock poisoned");
            let filtered: Vec<String> = ordered
                .into_iter()
                .filter(|hash| self.cache.get(hash).is_none() && !pending.contains(hash))
                .collect();
            for hash in &filtered {
                pending.insert(hash.clone());
            }
            filtered
        };

        if to_warm.is_empty() {
            return;
        }

        let subsystem = Arc::clone(self);
        let batch_size = subsystem.config.warmup_batch_size.max(1);
        let batch_delay = subsystem.config.warmup_batch_delay;
        let batch_timeout = subsystem.config.warmup_batch_timeout;
        tokio::spawn(async move {
            for (index, batch) in to_warm.chunks(batch_size).enumerate() {
                if index > 0 {
                    tokio::time::sleep(batch_delay).await;
                }
                let _ = tokio::time::timeout(batch_timeout, subsystem.fetch_for_hashes(batch, capable, batch_timeout)).await;
            }
            let mut pending = subsystem.pending_warmup.lock().expect("tracker warmup pending lock poisoned");
            for hash in &to_warm {
                pending.remove(hash);
            }
            debug!(count = to_warm.len(), "tracker warmup batch complete");
        });
    }

    /// `AddTrackerExclusions`: hide `hashes` from results filtered to `domain`.
    pub fn add_exclusions(&self, domain: &str, hashes: &[String]) {
        let mut exclusions = self.exclusions.write().expect("tracker exclusions lock poisoned");
        exclusions.entry(domain.to_string()).or_default().extend(hashes.iter().cloned());
    }

    /// `RemoveTrackerExclusions`: remove specific hashes, or clear the whole
    /// domain when `hashes` is empty.
    pub fn remove_exclusions(&self, domain: &str, hashes: &[String]) {
        let mut exclusions = self.exclusions.write().expect("tracker exclusions lock poisoned");
        if hashes.is_empty() {
            exclusions.remove(domain);
            return;
        }
        if let Some(set) = exclusions.get_mut(domain) {
            for hash in hashes {
                set.remove(hash);
            }
        }
    }

    /// `GetTrackerExclusionsCopy`: a deep copy safe for the caller to iterate.
    #[must_use]
    pub fn exclusions_copy(&self) -> BTreeMap<String, HashSet<String>> {
        self.exclusions.read().expect("tracker exclusions lock poisoned").clone()
    }

    /// Hashes currently excluded for `domain`, empty if none.
    #[must_use]
    pub fn excluded_for_domain(&self, domain: &str) -> HashSet<String> {
        self.exclusions
            .read()
            .expect("tracker exclusions lock poisoned")
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }
}
