//! Pluggable cache backend interface.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ndvi_common::NdviResult;

/// Counters reported by a cache backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    /// Entries removed to make room (not counting expiry).
    pub evictions: u64,
    /// Entries removed because their TTL had passed.
    pub expired: u64,
    /// Live entries currently stored.
    pub entries: u64,
    /// Hit rate as a percentage (0-100), not a fraction.
    pub hit_rate_pct: f64,
}

impl CacheStats {
    /// Calculate hit rate as a percentage (0-100).
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Key/value store with per-entry TTL.
///
/// Callers depend only on this trait so the in-process store can be
/// swapped for a shared one without code changes.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch a live value. Expired entries are reported as absent.
    async fn get(&self, key: &str) -> NdviResult<Option<Bytes>>;

    /// Store a value for `ttl`. A zero TTL or one above `MAX_TTL` is rejected.
    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> NdviResult<()>;

    /// Remove a key. Returns whether it was present.
    async fn delete(&self, key: &str) -> NdviResult<bool>;

    /// Remove every entry. Returns how many were removed.
    async fn clear(&self) -> NdviResult<usize>;

    /// Current counters.
    async fn stats(&self) -> NdviResult<CacheStats>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
