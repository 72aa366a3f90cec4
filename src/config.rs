//! Configuration Module
//!
//! Constructor parameters for a [`Cache`](crate::cache::Cache), with an
//! optional loader from environment variables for host binaries.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background reaper interval in seconds
    pub reaper_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `REAPER_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            // A zero interval would spin the reaper
            reaper_interval: parse_var("REAPER_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.reaper_interval),
        }
    }

    /// Default TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Reaper interval as a [`Duration`].
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            reaper_interval: 1,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
