//! TTL Cache Store Module
//!
//! Bounded map of identified entries with idle-timeout expiry and
//! least-recently-touched eviction when full.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, DEFAULT_CAPACITY, DEFAULT_TIMEOUT_SECS};
use crate::error::{Result, WikiError};

// == TTL Cache ==
/// Bounded, time-expiring store of identified values.
///
/// Expiry is enforced asynchronously by [`sweep`](TtlCache::sweep): a lookup
/// that lands between an entry logically going stale and the next sweep still
/// hits. Lookups do not refresh the last-touch timestamp; only `touch` and
/// `update` keep an entry warm.
#[derive(Debug)]
pub struct TtlCache<T> {
    /// Entries keyed by id; each entry carries its own last-touch time
    entries: HashMap<String, CacheEntry<T>>,
    /// Maximum number of entries allowed
    capacity: usize,
    /// Idle duration after which an entry is removed by the next sweep
    timeout: Duration,
}

impl<T: Clone> TtlCache<T> {
    // == Constructor ==
    /// Creates a new TtlCache with the given capacity and idle timeout.
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            timeout,
        }
    }

    // == Put ==
    /// Inserts an entry if its id is not already present.
    ///
    /// When the cache is at capacity, the entry with the oldest last-touch
    /// timestamp is evicted first. Returns false (and leaves the cache
    /// untouched) if the id is already present; callers replace via
    /// [`update`](TtlCache::update).
    pub fn put(&mut self, mut entry: CacheEntry<T>) -> bool {
        if self.entries.contains_key(&entry.id) {
            return false;
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .values()
                .min_by_key(|e| e.last_touch())
                .map(|e| e.id.clone());
            if let Some(id) = oldest {
                self.entries.remove(&id);
                tracing::debug!(evicted = %id, "cache at capacity, evicted oldest entry");
            }
        }

        entry.refresh();
        self.entries.insert(entry.id.clone(), entry);
        true
    }

    // == Get ==
    /// Retrieves the entry with the given id.
    ///
    /// Does not refresh the last-touch timestamp.
    pub fn get(&self, id: &str) -> Result<CacheEntry<T>> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| WikiError::NotFound(id.to_string()))
    }

    // == Touch ==
    /// Resets the last-touch timestamp of the entry with this id to now,
    /// marking it as still wanted. Returns false if the id is absent.
    pub fn touch(&mut self, id: &str) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.refresh();
                true
            }
            None => false,
        }
    }

    // == Update ==
    /// Replaces the entry with a matching id by removing the old entry and
    /// inserting the new one fresh. Returns false if the id is absent.
    pub fn update(&mut self, entry: CacheEntry<T>) -> bool {
        if !self.entries.contains_key(&entry.id) {
            return false;
        }

        self.entries.remove(&entry.id);
        self.put(entry)
    }

    // == Sweep ==
    /// Removes every entry whose idle time exceeds the timeout.
    ///
    /// Returns the number of entries removed. Callers hold the same lock as
    /// the mutating operations, so a sweep never interleaves with them.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        let timeout = self.timeout;
        self.entries.retain(|_, entry| !entry.is_stale(timeout));
        before - self.entries.len()
    }

    // == Snapshot ==
    /// Returns a defensive copy of the current live entries.
    ///
    /// Inspection and testing only; mutations of the copy never reach the
    /// cache.
    pub fn snapshot(&self) -> Vec<CacheEntry<T>> {
        self.entries.values().cloned().collect()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Maximum number of entries this cache will hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Idle timeout after which entries become sweep candidates.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for TtlCache<T> {
    /// A cache with the default capacity of 32 entries and a 3600 second
    /// idle timeout.
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn cache(capacity: usize) -> TtlCache<String> {
        TtlCache::new(capacity, Duration::from_secs(3600))
    }

    #[test]
    fn test_cache_new() {
        let store = cache(32);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cache_default_configuration() {
        let store: TtlCache<String> = TtlCache::default();
        assert_eq!(store.capacity(), 32);
        assert_eq!(store.timeout(), Duration::from_secs(3600));
    }

    #[test]
    fn test_put_and_get() {
        let mut store = cache(32);

        assert!(store.put(CacheEntry::new("a", "one".to_string())));
        let entry = store.get("a").unwrap();

        assert_eq!(entry.id, "a");
        assert_eq!(entry.value, "one");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_absent_is_not_found() {
        let store = cache(32);
        assert!(matches!(store.get("missing"), Err(WikiError::NotFound(_))));
    }

    #[test]
    fn test_put_existing_id_is_noop() {
        let mut store = cache(32);

        assert!(store.put(CacheEntry::new("a", "one".to_string())));
        assert!(!store.put(CacheEntry::new("a", "two".to_string())));

        // Original value survives the rejected put.
        assert_eq!(store.get("a").unwrap().value, "one");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_capacity_eviction_oldest_touch() {
        let mut store = cache(3);

        store.put(CacheEntry::new("a", "1".to_string()));
        sleep(Duration::from_millis(5));
        store.put(CacheEntry::new("b", "2".to_string()));
        sleep(Duration::from_millis(5));
        store.put(CacheEntry::new("c", "3".to_string()));
        sleep(Duration::from_millis(5));

        // "a" has the oldest last-touch and goes first.
        store.put(CacheEntry::new("d", "4".to_string()));

        assert_eq!(store.len(), 3);
        assert!(store.get("a").is_err());
        assert!(store.get("b").is_ok());
        assert!(store.get("c").is_ok());
        assert!(store.get("d").is_ok());
    }

    #[test]
    fn test_touch_protects_from_eviction() {
        let mut store = cache(3);

        store.put(CacheEntry::new("a", "1".to_string()));
        sleep(Duration::from_millis(5));
        store.put(CacheEntry::new("b", "2".to_string()));
        sleep(Duration::from_millis(5));
        store.put(CacheEntry::new("c", "3".to_string()));
        sleep(Duration::from_millis(5));

        // Touching "a" makes "b" the oldest.
        assert!(store.touch("a"));
        sleep(Duration::from_millis(5));
        store.put(CacheEntry::new("d", "4".to_string()));

        assert!(store.get("a").is_ok());
        assert!(store.get("b").is_err());
    }

    #[test]
    fn test_get_does_not_keep_entry_warm() {
        let mut store = cache(2);

        store.put(CacheEntry::new("a", "1".to_string()));
        sleep(Duration::from_millis(5));
        store.put(CacheEntry::new("b", "2".to_string()));
        sleep(Duration::from_millis(5));

        // A lookup alone must not refresh "a"; it stays the eviction victim.
        store.get("a").unwrap();
        store.put(CacheEntry::new("c", "3".to_string()));

        assert!(store.get("a").is_err());
        assert!(store.get("b").is_ok());
    }

    #[test]
    fn test_touch_absent_returns_false() {
        let mut store = cache(32);
        assert!(!store.touch("missing"));
    }

    #[test]
    fn test_touch_is_idempotent() {
        let mut store = cache(32);
        store.put(CacheEntry::new("a", "1".to_string()));

        assert!(store.touch("a"));
        assert!(store.touch("a"));
        assert!(store.touch("a"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_replaces_value() {
        let mut store = cache(32);

        store.put(CacheEntry::new("a", "one".to_string()));
        assert!(store.update(CacheEntry::new("a", "two".to_string())));

        assert_eq!(store.get("a").unwrap().value, "two");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_absent_returns_false() {
        let mut store = cache(32);
        assert!(!store.update(CacheEntry::new("a", "one".to_string())));
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_removes_stale_entries() {
        let mut store: TtlCache<String> = TtlCache::new(32, Duration::from_millis(40));

        store.put(CacheEntry::new("old", "1".to_string()));
        sleep(Duration::from_millis(60));
        store.put(CacheEntry::new("fresh", "2".to_string()));

        let removed = store.sweep();
        assert_eq!(removed, 1);
        assert!(store.get("old").is_err());
        assert!(store.get("fresh").is_ok());
    }

    #[test]
    fn test_stale_entry_still_hits_before_sweep() {
        let mut store: TtlCache<String> = TtlCache::new(32, Duration::from_millis(20));

        store.put(CacheEntry::new("a", "1".to_string()));
        sleep(Duration::from_millis(40));

        // Expiry is sweep-driven; a read before the sweep still returns the entry.
        assert!(store.get("a").is_ok());
        store.sweep();
        assert!(store.get("a").is_err());
    }

    #[test]
    fn test_touch_resets_expiry_clock() {
        let mut store: TtlCache<String> = TtlCache::new(32, Duration::from_millis(60));

        store.put(CacheEntry::new("a", "1".to_string()));
        sleep(Duration::from_millis(40));
        store.touch("a");
        sleep(Duration::from_millis(40));

        // 80ms since insert but only 40ms since touch: survives the sweep.
        assert_eq!(store.sweep(), 0);
        assert!(store.get("a").is_ok());
    }

    #[test]
    fn test_snapshot_is_defensive() {
        let mut store = cache(32);
        store.put(CacheEntry::new("a", "one".to_string()));

        let mut snap = store.snapshot();
        snap[0].value = "mutated".to_string();
        snap.clear();

        assert_eq!(store.get("a").unwrap().value, "one");
    }
}
