//! Caching for NDVI observations and query results.
//!
//! Provides:
//! - Deterministic cache keys for window queries and single scenes
//! - Age-tiered TTL selection
//! - A [`CacheBackend`] trait with in-memory and Redis implementations
//! - [`ObservationCache`], a typed JSON layer over any backend

pub mod backend;
pub mod keys;
pub mod memory;
pub mod observation_cache;
pub mod redis_cache;
pub mod ttl;

pub use backend::{CacheBackend, CacheStats};
pub use keys::{make_cache_key, make_observation_key, KeyExtras, OBSERVATION_KEY_PREFIX};
pub use memory::{CacheEntry, MemoryCache, DEFAULT_MAX_ENTRIES};
pub use observation_cache::{CachedWindow, ObservationCache, WindowQuery};
pub use redis_cache::{RedisCache, DEFAULT_PREFIX};
pub use ttl::{
    calculate_ttl, calculate_ttl_at, is_valid_ttl, CacheTtlConfig, TtlTier,
    HISTORICAL_AGE_DAYS, MAX_TTL, MAX_TTL_SECS, RECENT_AGE_DAYS,
};
