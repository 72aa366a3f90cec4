//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod expiry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use entry::{Entry, EntryId};
pub use expiry::ExpiryIndex;
pub use lru::{Keys, RecencyList};
pub use shared::Cache;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{validate_key, CacheStore};
