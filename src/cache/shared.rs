//! Thread-safe cache handle
//!
//! Wraps a [`CacheStore`] in a single lock shared with the background reaper.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheStore, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{spawn_reaper, ReaperHandle, DEFAULT_REAPER_INTERVAL};

// == Cache ==
/// Concurrent LRU cache with per-entry TTL.
///
/// Every operation takes the same mutex for its whole critical section, so
/// operations are linearizable. Share the cache between callers with
/// `Arc<Cache<V>>`.
///
/// The reaper is stopped when the cache is dropped or on
/// [`Cache::shutdown`]. Inside a Tokio runtime it runs as a task on that
/// runtime, otherwise on its own background thread.
#[derive(Debug)]
pub struct Cache<V> {
    store: Arc<Mutex<CacheStore<V>>>,
    reaper: ReaperHandle,
}

impl<V> Cache<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its reaper with the default 1 second period.
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self::with_reaper_interval(max_size, default_ttl, DEFAULT_REAPER_INTERVAL)
    }

    /// Creates a cache whose reaper sweeps every `reaper_interval`.
    pub fn with_reaper_interval(
        max_size: usize,
        default_ttl: Duration,
        reaper_interval: Duration,
    ) -> Self {
        let store = Arc::new(Mutex::new(CacheStore::new(max_size, default_ttl)));
        let reaper = spawn_reaper(store.clone(), reaper_interval);
        Self { store, reaper }
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::with_reaper_interval(
            config.max_entries,
            config.default_ttl(),
            config.reaper_interval(),
        )
    }

    // == Put ==
    /// Inserts or updates `key`; `None` uses the default TTL.
    ///
    /// # Errors
    /// `CacheError::InvalidKey` for an empty key.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) -> Result<()> {
        self.store.lock().put(key.into(), value, ttl)
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    pub fn get(&self, key: &str) -> Option<V> {
        self.store.lock().get(key)
    }

    // == Delete ==
    /// Removes `key`, returning whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    // == Clear ==
    /// Drops all entries and zeroes every counter.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    // == Stats ==
    /// Returns a snapshot of the counters and current size, taken under the
    /// lock.
    pub fn stats(&self) -> StatsSnapshot {
        self.store.lock().stats()
    }

    // == Purge Expired ==
    /// Runs one expiry sweep now, returning the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        self.store.lock().purge_expired()
    }

    // == Contains ==
    /// Returns true if `key` is live, without counting a request or
    /// touching recency.
    pub fn contains(&self, key: &str) -> bool {
        self.store.lock().contains(key)
    }

    // == TTL Remaining ==
    /// Remaining time to live of `key`, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.store.lock().ttl_remaining(key)
    }

    // == Length ==
    /// Number of entries, including expired entries not yet purged.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Capacity fixed at construction.
    pub fn max_size(&self) -> usize {
        self.store.lock().max_entries()
    }

    /// TTL applied when a put does not carry one.
    pub fn default_ttl(&self) -> Duration {
        self.store.lock().default_ttl()
    }

    /// Returns true while the background reaper is alive.
    pub fn reaper_running(&self) -> bool {
        self.reaper.is_running()
    }

    /// Stops the reaper and waits for it to exit.
    pub async fn shutdown(self) {
        self.reaper.join().await;
    }
}
