//! Redis-backed feed cache.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "feed:";
const VERSION_KEY: &str = "feed:version";

/// Redis cache for ranked feed pages.
///
/// Keys embed a generation counter stored under `feed:version`. Invalidation
/// bumps the counter, so stale pages become unreachable at once and expire
/// on their own TTL. All operations are fail-open.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_seconds` comes from `FEED_CACHE_TTL_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
        })
    }

    async fn generation(&self) -> CacheResult<i64> {
        let mut conn = self.client.clone();
        let version: Option<i64> = conn
            .get(VERSION_KEY)
            .await
            .map_err(|e| CacheError::OperationError(e.to_string()))?;
        Ok(version.unwrap_or(0))
    }
}

fn build_key(generation: i64, key: &str) -> String {
    format!("{}v{}:{}", KEY_PREFIX, generation, key)
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_feed(&self, key: &str) -> CacheResult<Option<String>> {
        let generation = match self.generation().await {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Redis feed version read failed: {}", e);
                return Ok(None);
            }
        };

        let mut conn = self.client.clone();
        match conn
            .get::<_, Option<String>>(build_key(generation, key))
            .await
        {
            Ok(Some(payload)) => {
                debug!(key, "Feed cache HIT");
                Ok(Some(payload))
            }
            Ok(None) => {
                debug!(key, "Feed cache MISS");
                Ok(None)
            }
            Err(e) => {
                warn!("Redis GET error for feed {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_feed(
        &self,
        key: &str,
        payload: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let generation = match self.generation().await {
            Ok(generation) => generation,
            Err(e) => {
                warn!("Redis feed version read failed: {}", e);
                return Ok(());
            }
        };

        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let mut conn = self.client.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(build_key(generation, key), payload, ttl)
            .await
        {
            warn!("Redis SET error for feed {}: {}", key, e);
        } else {
            debug!(key, ttl, "Feed cache SET");
        }

        Ok(())
    }

    async fn invalidate_feeds(&self) -> CacheResult<()> {
        let mut conn = self.client.clone();
        match conn.incr::<_, _, i64>(VERSION_KEY, 1).await {
            Ok(generation) => debug!(generation, "Feed cache invalidated"),
            Err(e) => warn!("Redis INCR error for feed version: {}", e),
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_embeds_generation() {
        assert_eq!(build_key(0, "all:0:25"), "feed:v0:all:0:25");
        assert_eq!(build_key(7, "SaaS:25:25"), "feed:v7:SaaS:25:25");
    }
}
