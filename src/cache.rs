//! Time-bounded result cache
//!
//! Memoizes the last computed payload per key so refresh cycles stay within
//! upstream rate limits. Constructed once at startup and shared via `Arc`;
//! every mutation is immediately visible to all holders.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A stored payload with its creation time and lifetime.
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-memory TTL cache keyed by opaque strings.
///
/// Expiry is enforced on every `get`; the periodic [`cleanup`](Self::cleanup)
/// sweep only bounds growth from keys that are never re-read.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a value, overwriting any prior entry for the key.
    pub fn set(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let key = key.into();
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Return the value for `key` if it exists and its ttl has not elapsed.
    ///
    /// A stale entry is deleted on the spot, independent of the sweep.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                debug!(key, "cache entry expired on read");
                None
            }
            None => None,
        }
    }

    /// Sweep all entries, deleting those whose ttl has elapsed.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "cache sweep");
        }
        removed
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `cleanup` on a fixed interval until the returned handle is dropped
/// or aborted.
pub fn spawn_sweeper<T: Clone + Send + 'static>(
    cache: Arc<TtlCache<T>>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; skip it so the first sweep
        // happens one full interval after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            cache.cleanup();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_set_then_get_round_trip() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("price:SPY", 42, Duration::from_secs(30));
        assert_eq!(cache.get("price:SPY"), Some(42));
    }

    #[test]
    fn test_get_missing_key() {
        let cache: TtlCache<u32> = TtlCache::new();
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn test_set_overwrites_prior_entry() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("k", 1, Duration::from_secs(30));
        cache.set("k", 2, Duration::from_secs(30));
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_after_ttl_returns_none_and_deletes() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("k", 7, Duration::from_millis(10));
        sleep(Duration::from_millis(25));
        assert_eq!(cache.get("k"), None);
        // The stale entry was removed by the read itself.
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_sweeps_only_expired() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("stale", 1, Duration::from_millis(10));
        cache.set("fresh", 2, Duration::from_secs(60));
        sleep(Duration::from_millis(25));

        assert_eq!(cache.cleanup(), 1);
        assert_eq!(cache.get("fresh"), Some(2));
        assert_eq!(cache.get("stale"), None);
    }

    #[test]
    fn test_cleanup_twice_is_idempotent() {
        let cache: TtlCache<u32> = TtlCache::new();
        cache.set("a", 1, Duration::from_millis(10));
        cache.set("b", 2, Duration::from_millis(10));
        sleep(Duration::from_millis(25));

        assert_eq!(cache.cleanup(), 2);
        assert_eq!(cache.cleanup(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shared_handles_see_mutations() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        let other = Arc::clone(&cache);
        cache.set("k", 9, Duration::from_secs(30));
        assert_eq!(other.get("k"), Some(9));
    }

    #[tokio::test]
    async fn test_sweeper_evicts_never_reread_keys() {
        let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
        cache.set("orphan", 1, Duration::from_millis(5));

        let handle = spawn_sweeper(Arc::clone(&cache), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();

        assert!(cache.is_empty());
    }
}
