//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - TTL Reaper: Removes expired cache entries at a fixed interval

mod reaper;

pub use reaper::{spawn_reaper, ReaperHandle, DEFAULT_REAPER_INTERVAL};
