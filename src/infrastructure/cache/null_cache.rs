//! No-op cache implementation for testing or disabled caching.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use tracing::debug;

/// A cache that stores nothing.
///
/// Used when Redis is not configured, when the connection fails at startup,
/// and in tests.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (feed caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_feed(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_feed(
        &self,
        _key: &str,
        _payload: &str,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate_feeds(&self) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_never_hits() {
        let cache = NullCache::new();
        cache.set_feed("all:0:25", "[]", None).await.unwrap();

        assert!(cache.get_feed("all:0:25").await.unwrap().is_none());
        assert!(cache.invalidate_feeds().await.is_ok());
        assert!(cache.health_check().await);
    }
}
