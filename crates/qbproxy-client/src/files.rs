//! `GetFilesBatch`: hash normalization, cache consultation, and
//! bounded-concurrency fetch of the remaining hashes from the transport.
//!
//! `FilesManager` is an external collaborator (spec.md §6); this crate only
//! defines the trait and the batch-resolution algorithm that consumes it.
//! Implementations live outside this workspace, or in `qbproxy-test-support`
//! for tests.

use async_trait::async_trait;
use qbproxy_core::model::{InstanceId, TorrentFile};
use qbproxy_core::ErrorKind;
use qbproxy_transport::QbittorrentTransport;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Per-instance file-list cache collaborator.
#[async_trait]
pub trait FilesManager: Send + Sync + fmt::Debug {
    /// Return the cached files for every hash that has a live entry, plus
    /// the subset of `hashes` that must still be fetched.
    async fn get_cached_files_batch(&self, instance_id: InstanceId, hashes: &[String]) -> (HashMap<String, Vec<TorrentFile>>, Vec<String>);
    /// Populate the cache with freshly fetched entries.
    async fn cache_files_batch(&self, instance_id: InstanceId, files: HashMap<String, Vec<TorrentFile>>);
    /// Drop the cached entry for a single hash, e.g. after the torrent is deleted.
    async fn invalidate_cache(&self, instance_id: InstanceId, hash: &str);
}

/// Normalize a hash for cache/lookup keys: trim and lowercase. The caller's
/// originally supplied case is preserved separately for display.
#[must_use]
pub fn normalize_hash(hash: &str) -> String {
    hash.trim().to_ascii_lowercase()
}

/// Resolve a files batch: consult the cache, fetch whatever is missing with
/// bounded concurrency, populate the cache with the fetched entries, and
/// return a map that owns its own, unaliased copies of every file list
/// (invariant 5 — no slice returned here shares backing memory with the
/// cache or with a transport response held elsewhere).
pub async fn get_files_batch<T: QbittorrentTransport>(
    transport: &Arc<T>,
    files_manager: &Arc<dyn FilesManager>,
    instance_id: InstanceId,
    hashes: &[String],
    concurrency: usize,
    deadline: Duration,
) -> Result<HashMap<String, Vec<TorrentFile>>, (String, ErrorKind)> {
    let normalized: Vec<String> = hashes.iter().map(|h| normalize_hash(h)).collect();
    let (cached, missing) = files_manager.get_cached_files_batch(instance_id, &normalized).await;
    let mut result: HashMap<String, Vec<TorrentFile>> = cached
        .into_iter()
        .map(|(hash, files)| (hash, files.clone()))
        .collect();

    if missing.is_empty() {
        return Ok(result);
    }

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = Vec::with_capacity(missing.len());
    for hash in missing {
        let transport = Arc::clone(transport);
        let semaphore = Arc::clone(&semaphore);
        tasks.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("files batch semaphore closed");
            let outcome = transport.get_files_information(&hash, deadline).await;
            (hash, outcome)
        }));
    }

    let mut fetched = HashMap::with_capacity(tasks.len());
    for task in tasks {
        let (hash, outcome) = task.await.expect("files batch fetch task panicked");
        match outcome {
            Ok(raw_files) => {
                let files: Vec<TorrentFile> = raw_files.into_iter().map(TorrentFile::from).collect();
                fetched.insert(hash, files);
            }
            Err(source) => return Err((hash, source.kind())),
        }
    }

    files_manager.cache_files_batch(instance_id, fetched.clone()).await;
    for (hash, files) in fetched {
        result.insert(hash, files);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingFilesManager {
        cached: Mutex<HashMap<String, Vec<TorrentFile>>>,
    }

    #[async_trait]
    impl FilesManager for RecordingFilesManager {
        async fn get_cached_files_batch(&self, _instance_id: InstanceId, hashes: &[String]) -> (HashMap<String, Vec<TorrentFile>>, Vec<String>) {
            let cache = self.cached.lock().expect("lock");
            let mut hit = HashMap::new();
            let mut missing = Vec::new();
            for hash in hashes {
                if let Some(files) = cache.get(hash) {
                    hit.insert(hash.clone(), files.clone());
                } else {
                    missing.push(hash.clone());
                }
            }
            (hit, missing)
        }

        async fn cache_files_batch(&self, _instance_id: InstanceId, files: HashMap<String, Vec<TorrentFile>>) {
            self.cached.lock().expect("lock").extend(files);
        }

        async fn invalidate_cache(&self, _instance_id: InstanceId, hash: &str) {
            self.cached.lock().expect("lock").remove(hash);
        }
    }

    #[test]
    fn normalize_hash_trims_and_lowercases() {
        assert_eq!(normalize_hash("  ABC123  "), "abc123");
    }

    #[tokio::test]
    async fn files_manager_returns_no_aliasing_clones() {
        // Invariant 5: returned slices never alias cached storage, so a
        // caller mutating the returned Vec cannot poison the cache.
        let manager: Arc<dyn FilesManager> = Arc::new(RecordingFilesManager::default());
        let file = TorrentFile {
            index: 0,
            name: "a.mkv".to_string(),
            size: 100,
            progress: 1.0,
            priority: qbproxy_core::model::FilePriority::Normal,
            availability: 1.0,
        };
        manager.cache_files_batch(InstanceId::new(1), HashMap::from([("abc".to_string(), vec![file.clone()])])).await;

        let (mut cached, missing) = manager.get_cached_files_batch(InstanceId::new(1), &["abc".to_string()]).await;
        assert!(missing.is_empty());
        cached.get_mut("abc").unwrap().push(file);
        let (second, _) = manager.get_cached_files_batch(InstanceId::new(1), &["abc".to_string()]).await;
        assert_eq!(second.get("abc").unwrap().len(), 1, "mutating a prior read must not affect a later read");
    }
}
