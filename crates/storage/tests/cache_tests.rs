//! Integration tests for the cache store, keys and TTL policy.

use bytes::Bytes;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

use storage::{
    calculate_ttl_at, make_cache_key, CacheBackend, CacheTtlConfig, MemoryCache, ObservationCache,
    WindowQuery,
};
use test_utils::{observation_window, reference_date, series};

async fn exercise_backend<B: CacheBackend>(cache: &B) {
    cache.clear().await.unwrap();

    cache
        .set("k", Bytes::from_static(b"value"), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(cache.get("k").await.unwrap(), Some(Bytes::from_static(b"value")));

    assert!(cache.delete("k").await.unwrap());
    assert!(cache.get("k").await.unwrap().is_none());
    assert!(!cache.delete("k").await.unwrap());

    for key in ["a", "b", "c"] {
        cache
            .set(key, Bytes::from_static(b"v"), Duration::from_secs(60))
            .await
            .unwrap();
    }
    assert_eq!(cache.clear().await.unwrap(), 3);
    assert!(cache.get("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_backend_contract() {
    exercise_backend(&MemoryCache::new(50)).await;
}

#[tokio::test]
async fn test_redis_backend_contract() {
    let Ok(url) = std::env::var("REDIS_URL") else {
        eprintln!("SKIPPED: REDIS_URL not set");
        return;
    };
    let cache = storage::RedisCache::connect(&url, "ndvi-it-contract")
        .await
        .unwrap();
    exercise_backend(&cache).await;
}

#[tokio::test]
async fn test_entry_absent_after_ttl() {
    let cache = MemoryCache::new(10);
    CacheBackend::set(&cache, "short", Bytes::from_static(b"v"), Duration::from_millis(40))
        .await
        .unwrap();
    assert!(CacheBackend::get(&cache, "short").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(CacheBackend::get(&cache, "short").await.unwrap().is_none());

    let stats = CacheBackend::stats(&cache).await.unwrap();
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.entries, 0);
}

#[tokio::test]
async fn test_zero_ttl_rejected_through_trait() {
    let cache = MemoryCache::new(10);
    let result = CacheBackend::set(&cache, "k", Bytes::from_static(b"v"), Duration::ZERO).await;
    assert!(result.is_err());
}

#[test]
fn test_ttl_round_trip_tiers() {
    let config = CacheTtlConfig::default();
    let today = reference_date();
    let ttl = |days: i64| calculate_ttl_at(today - ChronoDuration::days(days), today, &config);

    assert_eq!(ttl(60), config.historical_secs);
    assert_eq!(ttl(15), config.recent_secs);
    assert_eq!(ttl(3), config.current_secs);
}

#[test]
fn test_window_key_matches_free_function() {
    let start = reference_date() - ChronoDuration::days(30);
    let query = WindowQuery::new("field-7", start, reference_date(), "sentinel-2");
    assert_eq!(
        query.key(),
        make_cache_key("field-7", start, reference_date(), "sentinel-2", None)
    );
}

#[tokio::test]
async fn test_shared_backend_sees_observations() {
    let backend = Arc::new(MemoryCache::new(100));
    let cache = ObservationCache::from_shared(Arc::clone(&backend), CacheTtlConfig::default()).unwrap();

    let window = observation_window("field-3", &series::RISING, 0.8);
    for obs in &window {
        cache.put_observation_at(obs, reference_date()).await.unwrap();
    }
    assert_eq!(backend.len(), window.len());

    let last = window.last().unwrap();
    let loaded = cache
        .get_observation(&last.field_id, last.observation_date, &last.source)
        .await
        .unwrap();
    assert_eq!(loaded.as_ref(), Some(last));

    let stats = cache.stats().await.unwrap();
    assert_eq!(stats.sets, window.len() as u64);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_concurrent_writers_and_readers() {
    let cache = Arc::new(MemoryCache::new(64));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("t{}-{}", t, i % 16);
                    cache.set(&key, vec![t as u8], Duration::from_secs(30)).unwrap();
                    let _ = cache.get(&key);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.len() <= cache.max_entries());
    let stats = cache.stats();
    assert_eq!(stats.sets, 8 * 200);
    assert_eq!(stats.hits + stats.misses, 8 * 200);
}
