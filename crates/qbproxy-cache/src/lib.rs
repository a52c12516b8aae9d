#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
#![allow(unexpected_cfgs)]

//! Generic keyed cache with per-entry TTL expiration.
//!
//! Backed by a `HashMap` behind a `std::sync::RwLock`, matching the
//! coarse-lock style the corpus uses for small in-memory maps
//! (`revaer-events`'s `Mutex<VecDeque<_>>`) rather than reaching for an
//! external concurrent-map crate the corpus never depends on. Expired
//! entries are swept lazily on access; callers never need their own lock
//! around a `TtlCache`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::trace;

/// A value paired with the instant at which it becomes stale.
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Keyed cache with per-entry TTL, a default TTL applied at construction,
/// and explicit invalidation. Thread-safe: all operations take `&self`.
pub struct TtlCache<K, V> {
    default_ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Construct an empty cache with the given default TTL.
    #[must_use]
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Default TTL applied by [`Self::set`].
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fetch a live value for `key`, sweeping it out first if expired.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        {
            let read = self.entries.read().expect("cache lock poisoned");
            if let Some(entry) = read.get(key) {
                if entry.expires_at > now {
                    return Some(entry.value.clone());
                }
            } else {
                return None;
            }
        }
        // Entry existed but was stale; drop it under a write lock.
        let mut write = self.entries.write().expect("cache lock poisoned");
        if let Some(entry) = write.get(key) {
            if entry.expires_at <= now {
                write.remove(key);
                trace!("swept expired cache entry");
            }
        }
        None
    }

    /// Insert `value` for `key` with this cache's default TTL.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Insert `value` for `key` with an explicit TTL, overriding the default.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key, Entry { value, expires_at });
    }

    /// Remove a single key, if present.
    pub fn delete(&self, key: &K) {
        self.entries.write().expect("cache lock poisoned").remove(key);
    }

    /// Live (non-expired) keys currently cached.
    #[must_use]
    pub fn get_keys(&self) -> Vec<K> {
        let now = Instant::now();
        self.entries
            .read()
            .expect("cache lock poisoned")
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Invalidate specific keys, or every key when `keys` is empty.
    pub fn invalidate(&self, keys: &[K]) {
        if keys.is_empty() {
            self.entries.write().expect("cache lock poisoned").clear();
            return;
        }
        let mut write = self.entries.write().expect("cache lock poisoned");
        for key in keys {
            write.remove(key);
        }
    }

    /// Number of entries currently stored, including any not-yet-swept stale ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    /// Whether the cache holds no entries at all (stale or live).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release all entries. `TtlCache` owns no background task or file
    /// handle, so this is equivalent to invalidating everything, but is
    /// kept as a distinct method to mirror the collaborator contract in
    /// spec.md §4.B (`Close`), which other caches in this workspace that do
    /// own a background task (tracker warmup) must also implement.
    pub fn close(&self) {
        self.invalidate(&[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn get_returns_value_within_ttl() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"a"), Some(1));
    }

    #[test]
    fn get_returns_none_after_ttl_expires() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(10));
        cache.set("a", 1);
        sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn set_with_ttl_overrides_default() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_secs(60));
        cache.set_with_ttl("a", 1, Duration::from_millis(5));
        sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"a"), None);
    }

    #[test]
    fn invalidate_specific_key_leaves_others() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        cache.set("b", 2);
        cache.invalidate(&["a"]);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[test]
    fn invalidate_empty_clears_everything() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_secs(60));
        cache.set("a", 1);
        cache.set("b", 2);
        cache.invalidate(&[]);
        assert!(cache.is_empty());
    }

    #[test]
    fn get_keys_excludes_expired_entries() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(10));
        cache.set("a", 1);
        cache.set_with_ttl("b", 2, Duration::from_secs(60));
        sleep(Duration::from_millis(30));
        assert_eq!(cache.get_keys(), vec!["b"]);
    }

    #[test]
    fn separate_get_calls_within_ttl_return_equal_values() {
        // Invariant 2: calls separated by less than the TTL with no
        // invalidation between them compare equal to the first.
        let cache: TtlCache<&str, Vec<i32>> = TtlCache::new(Duration::from_secs(60));
        cache.set("a", vec![1, 2, 3]);
        let first = cache.get(&"a");
        let second = cache.get(&"a");
        assert_eq!(first, second);
    }
}
