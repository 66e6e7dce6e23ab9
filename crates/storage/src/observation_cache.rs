//! Typed cache layer for observations and window query results.
//!
//! Values are stored as JSON over any [`CacheBackend`]. Single observations
//! get an age-tiered TTL; window results are wrapped in [`CachedWindow`] so
//! a failed upstream query can be cached briefly without being mistaken
//! for data.

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use ndvi_common::{today_utc, NdviError, NdviResult, Observation};

use crate::backend::{CacheBackend, CacheStats};
use crate::keys::{make_cache_key, make_observation_key, KeyExtras};
use crate::ttl::{calculate_ttl_at, CacheTtlConfig};

/// Parameters that identify a window query.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowQuery {
    pub field_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: String,
    pub extra: Option<KeyExtras>,
}

impl WindowQuery {
    pub fn new(
        field_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        source: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            start_date,
            end_date,
            source: source.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: KeyExtras) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn key(&self) -> String {
        make_cache_key(
            &self.field_id,
            self.start_date,
            self.end_date,
            &self.source,
            self.extra.as_ref(),
        )
    }
}

/// Stored form of a window result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CachedWindow<T> {
    Value { data: T },
    Failed { message: String },
}

impl<T> CachedWindow<T> {
    /// A cached failure becomes a `CacheError` carrying the stored message.
    pub fn into_result(self) -> NdviResult<T> {
        match self {
            CachedWindow::Value { data } => Ok(data),
            CachedWindow::Failed { message } => Err(NdviError::CacheError(message)),
        }
    }
}

/// Observation cache over a pluggable backend.
pub struct ObservationCache<B: CacheBackend> {
    backend: Arc<B>,
    ttl: CacheTtlConfig,
}

impl<B: CacheBackend> Clone for ObservationCache<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            ttl: self.ttl,
        }
    }
}

impl<B: CacheBackend> ObservationCache<B> {
    /// Wrap a backend. The TTL config is validated up front.
    pub fn new(backend: B, ttl: CacheTtlConfig) -> NdviResult<Self> {
        Self::from_shared(Arc::new(backend), ttl)
    }

    pub fn from_shared(backend: Arc<B>, ttl: CacheTtlConfig) -> NdviResult<Self> {
        ttl.validate()?;
        Ok(Self { backend, ttl })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn ttl_config(&self) -> &CacheTtlConfig {
        &self.ttl
    }

    /// Store an observation under its readable key with an age-tiered TTL.
    /// Returns the TTL applied.
    pub async fn put_observation(&self, observation: &Observation) -> NdviResult<Duration> {
        self.put_observation_at(observation, today_utc()).await
    }

    /// Same as [`put_observation`](Self::put_observation) with a fixed `today`.
    pub async fn put_observation_at(
        &self,
        observation: &Observation,
        today: NaiveDate,
    ) -> NdviResult<Duration> {
        let key = make_observation_key(
            &observation.field_id,
            observation.observation_date,
            &observation.source,
        );
        let ttl = Duration::from_secs(calculate_ttl_at(
            observation.observation_date,
            today,
            &self.ttl,
        ));
        self.put_json(&key, observation, ttl).await?;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cached observation");
        Ok(ttl)
    }

    pub async fn get_observation(
        &self,
        field_id: &str,
        observation_date: NaiveDate,
        source: &str,
    ) -> NdviResult<Option<Observation>> {
        let key = make_observation_key(field_id, observation_date, source);
        self.get_json(&key).await
    }

    /// Store a successful window result for `ttl`.
    pub async fn put_window<T: Serialize>(
        &self,
        query: &WindowQuery,
        data: &T,
        ttl: Duration,
    ) -> NdviResult<()> {
        self.put_json(&query.key(), &CachedWindow::Value { data }, ttl)
            .await
    }

    /// Cache a failed window query for the configured error TTL.
    pub async fn put_window_error(&self, query: &WindowQuery, message: &str) -> NdviResult<()> {
        let entry: CachedWindow<()> = CachedWindow::Failed {
            message: message.to_string(),
        };
        self.put_json(&query.key(), &entry, self.ttl.error_ttl())
            .await
    }

    pub async fn get_window<T: DeserializeOwned>(
        &self,
        query: &WindowQuery,
    ) -> NdviResult<Option<CachedWindow<T>>> {
        self.get_json(&query.key()).await
    }

    pub async fn invalidate_window(&self, query: &WindowQuery) -> NdviResult<bool> {
        self.backend.delete(&query.key()).await
    }

    pub async fn stats(&self) -> NdviResult<CacheStats> {
        self.backend.stats().await
    }

    async fn put_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> NdviResult<()> {
        let encoded = serde_json::to_vec(value)?;
        self.backend.set(key, Bytes::from(encoded), ttl).await
    }

    /// Undecodable entries are dropped and reported as a miss.
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> NdviResult<Option<T>> {
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, backend = self.backend.name(), "Dropping undecodable cache entry");
                self.backend.delete(key).await?;
                Ok(None)
            }
        }
    }
}
