//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! expiry removals.

use serde::Serialize;

// == Cache Stats ==
/// Running counters owned by a single cache instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of failed lookups (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted due to capacity
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired_removals: u64,
    /// Number of lookups, always hits + misses
    pub total_requests: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / total_requests, or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.total_requests += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.total_requests += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiry ==
    pub fn record_expired_removal(&mut self) {
        self.expired_removals += 1;
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Freezes the counters together with the current entry count.
    pub fn snapshot(&self, current_size: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits,
            misses: self.misses,
            hit_rate: self.hit_rate(),
            current_size,
            evictions: self.evictions,
            total_requests: self.total_requests,
            expired_removals: self.expired_removals,
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time view of cache statistics, taken under the cache lock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub current_size: usize,
    pub evictions: u64,
    pub total_requests: u64,
    pub expired_removals: u64,
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expired_removals, 0);
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 1.0);
        assert_eq!(stats.total_requests, 3);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_miss();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 0.5);
        assert_eq!(stats.total_requests, 4);
    }

    #[test]
    fn test_evictions_and_expiry_are_not_requests() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        stats.record_expired_removal();
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.expired_removals, 1);
        assert_eq!(stats.total_requests, 0);
    }

    #[test]
    fn test_reset() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_eviction();
        stats.record_expired_removal();

        stats.reset();

        assert_eq!(stats, CacheStats::new());
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();

        let json = serde_json::to_value(stats.snapshot(3)).unwrap();

        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 1);
        assert_eq!(json["hitRate"], 0.5);
        assert_eq!(json["currentSize"], 3);
        assert_eq!(json["totalRequests"], 2);
        assert_eq!(json["expiredRemovals"], 0);
        assert_eq!(json["evictions"], 0);
    }
}
