//! Expiry Index Module
//!
//! Maps each cached key to its absolute expiration instant.

use std::collections::HashMap;
use std::time::{Duration, Instant};

// == Expiry Index ==
/// Key to deadline mapping consulted on reads and swept by the reaper.
///
/// Boundary condition: a key is expired once `now >= deadline`, so an entry
/// with a zero TTL is expired immediately.
#[derive(Debug, Default)]
pub struct ExpiryIndex {
    deadlines: HashMap<String, Instant>,
}

impl ExpiryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or refreshes) the deadline of `key` to `now + ttl`.
    ///
    /// A TTL too large to represent is clamped to roughly a century.
    pub fn set(&mut self, key: &str, now: Instant, ttl: Duration) {
        let deadline = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        match self.deadlines.get_mut(key) {
            Some(existing) => *existing = deadline,
            None => {
                self.deadlines.insert(key.to_string(), deadline);
            }
        }
    }

    /// Deadline of `key`, if tracked.
    pub fn deadline(&self, key: &str) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    /// Returns `true` if `key` is tracked and its deadline has passed.
    pub fn is_expired(&self, key: &str, now: Instant) -> bool {
        self.deadlines
            .get(key)
            .is_some_and(|deadline| now >= *deadline)
    }

    /// Returns remaining time to live, `Duration::ZERO` once expired.
    pub fn ttl_remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        self.deadline(key)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn remove(&mut self, key: &str) -> Option<Instant> {
        self.deadlines.remove(key)
    }

    /// Snapshot of every key whose deadline is at or before `now`.
    pub fn expired_keys(&self, now: Instant) -> Vec<String> {
        self.deadlines
            .iter()
            .filter(|(_, deadline)| now >= **deadline)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.deadlines.contains_key(key)
    }

    /// Number of tracked deadlines.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }
}

const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);
