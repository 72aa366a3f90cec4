//! Cache Store Module
//!
//! Single-threaded cache engine combining the key index, the recency list and
//! the expiry index. [`Cache`](crate::cache::Cache) wraps it in a lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::cache::{
    CacheStats, Entry, EntryId, ExpiryIndex, RecencyList, StatsSnapshot,
};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Cache state with LRU eviction and TTL support.
///
/// Invariant between calls: the key index, the expiry index and the recency
/// list hold exactly the same set of keys, and that set never exceeds
/// `max_entries`.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key to entry handle
    index: HashMap<String, EntryId>,
    /// Entries ordered by recency
    recency: RecencyList<V>,
    /// Key to deadline
    expiry: ExpiryIndex,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied when a put does not carry one
    default_ttl: Duration,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// A capacity of zero is allowed: every put is evicted immediately.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            index: HashMap::with_capacity(max_entries.min(PREALLOCATE_LIMIT)),
            recency: RecencyList::with_capacity(max_entries.min(PREALLOCATE_LIMIT)),
            expiry: ExpiryIndex::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Put ==
    /// Inserts or updates a key, making it the most recently used entry.
    ///
    /// The deadline is reset to `now + ttl` (or the default TTL). If the
    /// insert pushes the cache over capacity the least recently used entry is
    /// evicted.
    ///
    /// # Errors
    /// `CacheError::InvalidKey` if the key is empty; the cache is left
    /// untouched.
    pub fn put(&mut self, key: String, value: V, ttl: Option<Duration>) -> Result<()> {
        self.put_at(key, value, ttl, Instant::now())
    }

    pub(crate) fn put_at(
        &mut self,
        key: String,
        value: V,
        ttl: Option<Duration>,
        now: Instant,
    ) -> Result<()> {
        if let Err(err) = validate_key(&key) {
            warn!(error = %err, "rejected put");
            return Err(err);
        }

        let existing = self
            .index
            .get(&key)
            .copied()
            .filter(|id| self.recency.contains(*id));

        match existing.and_then(|id| self.recency.get_mut(id).map(|entry| (id, entry))) {
            Some((id, entry)) => {
                entry.value = value;
                self.recency.move_to_front(id);
            }
            None => {
                let id = self.recency.push_front(Entry::new(key.clone(), value));
                self.index.insert(key.clone(), id);
            }
        }

        self.expiry.set(&key, now, ttl.unwrap_or(self.default_ttl));

        if self.index.len() > self.max_entries {
            self.evict_lru();
        }

        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns `true` if an entry was removed, `false` if the key was absent.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.remove_key(key) {
            Ok(Some(_)) => true,
            Ok(None) => {
                debug!(key, "delete of missing key");
                false
            }
            Err(err) => {
                warn!(key, error = %err, "delete found inconsistent entry");
                false
            }
        }
    }

    // == Clear ==
    /// Drops every entry and resets all statistics to zero.
    pub fn clear(&mut self) {
        self.index.clear();
        self.recency.clear();
        self.expiry.clear();
        self.stats.reset();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.index.len())
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed. A key that cannot be removed
    /// cleanly is logged and skipped.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&mut self, now: Instant) -> usize {
        if self.expiry.is_empty() {
            return 0;
        }
        let mut removed = 0;

        for key in self.expiry.expired_keys(now) {
            match self.remove_key(&key) {
                Ok(Some(_)) => {
                    self.stats.record_expired_removal();
                    removed += 1;
                    debug!(key = %key, "expired entry purged");
                }
                Ok(None) => debug!(key = %key, "dropped deadline of unindexed key"),
                Err(err) => warn!(key = %key, error = %err, "failed to purge expired entry"),
            }
        }

        removed
    }

    // == Contains ==
    /// Returns true if the key is present and unexpired.
    ///
    /// Does not count as a request and does not change recency.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key) && !self.expiry.is_expired(key, Instant::now())
    }

    /// Remaining time to live of a cached key.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.expiry.ttl_remaining(key, Instant::now())
    }

    // == Length ==
    /// Returns the current number of entries, including expired entries not
    /// yet purged.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.recency.keys().map(str::to_string).collect()
    }

    /// Shared removal path used by delete, expiry on read and the reaper.
    ///
    /// The key is always dropped from the index and the expiry index, even if
    /// its handle turns out to be dangling.
    fn remove_key(&mut self, key: &str) -> Result<Option<V>> {
        self.expiry.remove(key);
        let Some(id) = self.index.remove(key) else {
            return Ok(None);
        };

        match self.recency.remove(id) {
            Some(entry) => Ok(Some(entry.into_parts().1)),
            None => Err(CacheError::Internal(format!(
                "key '{}' indexed to vacant slot {}",
                key,
                id.index()
            ))),
        }
    }

    fn evict_lru(&mut self) {
        match self.recency.evict_tail() {
            Some(entry) => {
                self.index.remove(entry.key());
                self.expiry.remove(entry.key());
                self.stats.record_eviction();
                debug!(key = entry.key(), "evicted least recently used entry");
            }
            None => debug!("eviction requested on empty recency list"),
        }
    }

    /// Panics if the index, expiry index and recency list disagree.
    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        self.recency.debug_validate_invariants();
        assert_eq!(self.index.len(), self.recency.len());
        assert_eq!(self.expiry.len(), self.recency.len());
        assert!(self.index.len() <= self.max_entries);

        for (key, id) in &self.index {
            let entry = self.recency.get(*id).expect("indexed slot must be live");
            assert_eq!(entry.key(), key);
            assert!(self.expiry.contains(key));
        }
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key, marking it most recently used.
    ///
    /// Expired entries are removed and counted as misses. Every call counts
    /// as exactly one request.
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        let Some(id) = self.index.get(key).copied() else {
            self.stats.record_miss();
            return None;
        };

        if self.expiry.is_expired(key, now) {
            if let Err(err) = self.remove_key(key) {
                warn!(key, error = %err, "failed to remove expired entry");
            }
            self.stats.record_expired_removal();
            self.stats.record_miss();
            debug!(key, "key has expired");
            return None;
        }

        self.recency.move_to_front(id);
        if let Some(entry) = self.recency.get(id) {
            self.stats.record_hit();
            return Some(entry.value.clone());
        }

        // Dangling handle: drop the key through the shared removal path
        if let Err(err) = self.remove_key(key) {
            warn!(key, error = %err, "dropped inconsistent entry on read");
        }
        self.stats.record_miss();
        None
    }
}

// Upper bound on up-front allocation for very large capacities
const PREALLOCATE_LIMIT: usize = 4096;

// == Key Validation ==
/// Checks that a key is a non-empty identifier. Length is not limited.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    Ok(())
}
