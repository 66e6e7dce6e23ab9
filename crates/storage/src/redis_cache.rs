//! Redis-backed cache for deployments with several engine instances.

use async_trait::async_trait;
use bytes::Bytes;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use ndvi_common::{NdviError, NdviResult};

use crate::backend::{CacheBackend, CacheStats};
use crate::ttl::is_valid_ttl;

/// Default namespace for keys written by this backend.
pub const DEFAULT_PREFIX: &str = "ndvi-cache";

/// Hit/miss counters local to this process.
#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
}

/// Redis cache client.
///
/// Keys are namespaced under a prefix so `clear` only touches entries this
/// backend wrote. Expiry is delegated to Redis; evictions follow the
/// server's `maxmemory-policy` and are not visible here.
pub struct RedisCache {
    conn: MultiplexedConnection,
    prefix: String,
    counters: Counters,
}

impl RedisCache {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> NdviResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| NdviError::CacheError(format!("Redis connection failed: {}", e)))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| NdviError::CacheError(format!("Redis connection failed: {}", e)))?;

        Ok(Self {
            conn,
            prefix: prefix.into(),
            counters: Counters::default(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    async fn namespace_keys(&self) -> NdviResult<Vec<String>> {
        let pattern = format!("{}:*", self.prefix);
        let mut conn = self.conn.clone();
        redis::cmd("KEYS")
            .arg(&pattern)
            .query_async(&mut conn)
            .await
            .map_err(|e| NdviError::CacheError(format!("Pattern search failed: {}", e)))
    }
}

/// Whole seconds for `SETEX`, rounded up so an entry never expires early.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> NdviResult<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn
            .get(self.namespaced(key))
            .await
            .map_err(|e| NdviError::CacheError(format!("Cache get failed: {}", e)))?;

        let counter = if result.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);

        Ok(result.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> NdviResult<()> {
        if !is_valid_ttl(ttl) {
            return Err(NdviError::InvalidTtl {
                key: key.to_string(),
            });
        }
        let secs = expiry_secs(ttl);

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(self.namespaced(key), value.as_ref(), secs)
            .await
            .map_err(|e| NdviError::CacheError(format!("Cache set failed: {}", e)))?;

        self.counters.sets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn delete(&self, key: &str) -> NdviResult<bool> {
        let mut conn = self.conn.clone();
        let removed: usize = conn
            .del(self.namespaced(key))
            .await
            .map_err(|e| NdviError::CacheError(format!("Cache delete failed: {}", e)))?;
        Ok(removed > 0)
    }

    async fn clear(&self) -> NdviResult<usize> {
        let keys = self.namespace_keys().await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let removed: usize = conn
            .del(&keys)
            .await
            .map_err(|e| NdviError::CacheError(format!("Delete failed: {}", e)))?;

        debug!(prefix = %self.prefix, removed, "Cleared Redis cache namespace");
        Ok(removed)
    }

    async fn stats(&self) -> NdviResult<CacheStats> {
        let entries = self.namespace_keys().await?.len() as u64;
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);

        Ok(CacheStats {
            hits,
            misses,
            sets: self.counters.sets.load(Ordering::Relaxed),
            evictions: 0,
            expired: 0,
            entries,
            hit_rate_pct: CacheStats::compute_hit_rate(hits, misses),
        })
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Connects only when REDIS_URL is set; these tests are skipped otherwise.
    async fn connect_or_skip(prefix: &str) -> Option<RedisCache> {
        let url = match std::env::var("REDIS_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("SKIPPED: REDIS_URL not set");
                return None;
            }
        };
        Some(RedisCache::connect(&url, prefix).await.unwrap())
    }

    #[tokio::test]
    async fn test_redis_round_trip() {
        let Some(cache) = connect_or_skip("ndvi-test-roundtrip").await else {
            return;
        };
        cache.clear().await.unwrap();

        cache
            .set("k", Bytes::from_static(b"v"), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(Bytes::from_static(b"v")));
        assert!(cache.delete("k").await.unwrap());
        assert!(!cache.delete("k").await.unwrap());
        assert!(cache.get("k").await.unwrap().is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_redis_clear_scoped_to_prefix() {
        let Some(cache) = connect_or_skip("ndvi-test-clear").await else {
            return;
        };
        cache.clear().await.unwrap();

        for key in ["a", "b", "c"] {
            cache
                .set(key, Bytes::from_static(b"v"), Duration::from_secs(30))
                .await
                .unwrap();
        }
        assert_eq!(cache.clear().await.unwrap(), 3);
        assert_eq!(cache.stats().await.unwrap().entries, 0);
    }

    #[test]
    fn test_zero_ttl_message() {
        let err = NdviError::InvalidTtl { key: "k".into() };
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_expiry_rounds_up() {
        assert_eq!(expiry_secs(Duration::from_millis(1)), 1);
        assert_eq!(expiry_secs(Duration::from_secs(1)), 1);
        assert_eq!(expiry_secs(Duration::from_millis(1_900)), 2);
        assert_eq!(expiry_secs(Duration::from_secs(3_600)), 3_600);
    }
}
