//! In-memory TTL cache with hit-count eviction.
//!
//! ## Expiry
//!
//! Expiry is lazy: a `get` that finds an expired entry removes it under the
//! same lock before reporting a miss, so two callers can never both observe
//! stale data.
//!
//! ## Eviction
//!
//! When `set` would add a key while the store is at capacity, expired
//! entries are swept first. If the store is still full, a batch of ~5% of
//! capacity (at least one entry) is evicted, least-hit first and oldest
//! first among equal hit counts.
//!
//! All state sits behind a single mutex; no background task is needed.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use ndvi_common::{NdviError, NdviResult};

use crate::backend::{CacheBackend, CacheStats};
use crate::ttl::is_valid_ttl;

/// Default capacity in entries.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// A stored value with its lifetime and hit counter.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Bytes,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub hits: u64,
}

impl CacheEntry {
    /// `None` when `now + ttl` is not representable.
    fn new(value: Bytes, now: Instant, ttl: Duration) -> Option<Self> {
        Some(Self {
            value,
            created_at: now,
            expires_at: now.checked_add(ttl)?,
            hits: 0,
        })
    }

    /// Logically absent once `now >= expires_at`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
    sets: u64,
    evictions: u64,
    expired: u64,
}

impl Inner {
    fn sweep_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - self.entries.len();
        self.expired += removed as u64;
        removed
    }

    fn evict_least_used(&mut self, count: usize) -> usize {
        let mut ranked: Vec<(u64, Instant, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.hits, entry.created_at, key.clone()))
            .collect();
        ranked.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut evicted = 0;
        for (_, _, key) in ranked.into_iter().take(count) {
            if self.entries.remove(&key).is_some() {
                evicted += 1;
            }
        }
        self.evictions += evicted as u64;
        evicted
    }
}

/// In-process cache store.
///
/// Construct one at start-up and share it by reference (or `Arc`) with every
/// caller; there is no global instance.
pub struct MemoryCache {
    inner: Mutex<Inner>,
    max_entries: usize,
}

impl MemoryCache {
    /// Create a store holding at most `max_entries` (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Counters and map stay consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a live value, counting a hit or a miss.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        let mut guard = self.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get_mut(key) {
            Some(entry) if entry.is_expired_at(now) => true,
            Some(entry) => {
                entry.hits += 1;
                let value = entry.value.clone();
                inner.hits += 1;
                return Some(value);
            }
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.expired += 1;
            debug!(key, "Expired cache entry removed on read");
        }
        inner.misses += 1;
        None
    }

    /// Store `value` for `ttl`, evicting first if the store is full.
    ///
    /// `ttl` must be non-zero and no longer than [`MAX_TTL`](crate::ttl::MAX_TTL).
    pub fn set(&self, key: &str, value: impl Into<Bytes>, ttl: Duration) -> NdviResult<()> {
        let invalid = || NdviError::InvalidTtl {
            key: key.to_string(),
        };
        if !is_valid_ttl(ttl) {
            return Err(invalid());
        }

        let now = Instant::now();
        let entry = CacheEntry::new(value.into(), now, ttl).ok_or_else(invalid)?;
        let mut inner = self.lock();

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.max_entries {
            self.make_room_locked(&mut inner, now);
        }

        inner.entries.insert(key.to_string(), entry);
        inner.sets += 1;
        Ok(())
    }

    /// Sweep expired entries, then evict a batch if still at capacity.
    fn make_room_locked(&self, inner: &mut Inner, now: Instant) {
        let swept = inner.sweep_expired(now);
        if swept > 0 {
            debug!(swept, "Swept expired cache entries");
        }

        if inner.entries.len() >= self.max_entries {
            let batch = (self.max_entries / 20).max(1);
            let evicted = inner.evict_least_used(batch);
            info!(
                entries_evicted = evicted,
                entries_remaining = inner.entries.len(),
                max_entries = self.max_entries,
                "Cache batch eviction completed"
            );
        }
    }

    /// Remove a key. Returns whether a live entry was present; an expired
    /// entry is dropped but reported as absent.
    pub fn delete(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut inner = self.lock();
        match inner.entries.remove(key) {
            Some(entry) if entry.is_expired_at(now) => {
                inner.expired += 1;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Remove every entry, returning how many live entries were stored.
    ///
    /// Counters are kept; they describe the store's lifetime.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        inner.sweep_expired(Instant::now());
        let count = inner.entries.len();
        inner.entries.clear();
        count
    }

    /// Remove all expired entries now. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.lock().sweep_expired(Instant::now())
    }

    /// Whether a live entry exists. Does not count as a hit or miss.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Physically stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            sets: inner.sets,
            evictions: inner.evictions,
            expired: inner.expired,
            entries: inner.entries.len() as u64,
            hit_rate_pct: CacheStats::compute_hit_rate(inner.hits, inner.misses),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> NdviResult<Option<Bytes>> {
        Ok(MemoryCache::get(self, key))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> NdviResult<()> {
        MemoryCache::set(self, key, value, ttl)
    }

    async fn delete(&self, key: &str) -> NdviResult<bool> {
        Ok(MemoryCache::delete(self, key))
    }

    async fn clear(&self) -> NdviResult<usize> {
        Ok(MemoryCache::clear(self))
    }

    async fn stats(&self) -> NdviResult<CacheStats> {
        Ok(MemoryCache::stats(self))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
