//! Recency Cache - An in-process key-value cache
//!
//! Provides bounded LRU eviction, per-entry TTL expiration and a background
//! reaper, safe for concurrent use from many threads.
//!
//! ```ignore
//! let cache: Cache<String> = Cache::new(1000, Duration::from_secs(300));
//! cache.put("user:1", "alice".to_string(), None)?;
//! assert_eq!(cache.get("user:1").as_deref(), Some("alice"));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, StatsSnapshot};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
