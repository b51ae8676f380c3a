//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache for serialized ranked feed pages.
///
/// Ranks change on every sweep and after engagement events, so entries are
/// short-lived and invalidated wholesale rather than per listing.
///
/// Implementations must fail open: a broken cache degrades to store reads
/// and never fails a request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached feed page by its filter key.
    ///
    /// Returns `Ok(None)` on a miss or a backend error.
    async fn get_feed(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a serialized feed page.
    ///
    /// `ttl_seconds = None` applies the implementation's default TTL.
    async fn set_feed(&self, key: &str, payload: &str, ttl_seconds: Option<u64>)
    -> CacheResult<()>;

    /// Drops every cached feed page.
    ///
    /// Called after a ranking sweep and after engagement events.
    async fn invalidate_feeds(&self) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}
