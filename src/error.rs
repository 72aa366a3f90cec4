//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Absence of a key is never an error: `get` returns `None` and `delete`
/// returns `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key is empty or exceeds the maximum key length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key index and recency list disagree about an entry
    #[error("Internal error: {0}")]
    Internal(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
