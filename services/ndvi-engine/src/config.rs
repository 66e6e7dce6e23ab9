//! Engine configuration.
//!
//! Resolved in three layers: built-in defaults, an optional YAML file, then
//! environment variable overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use analytics::DEFAULT_TREND_THRESHOLD;
use ndvi_common::{NdviError, NdviResult};
use quality::QualityPolicy;
use storage::{CacheTtlConfig, DEFAULT_MAX_ENTRIES, DEFAULT_PREFIX};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cache: CacheConfig,
    pub quality: QualityPolicy,
    pub analytics: AnalyticsConfig,
}

/// Cache store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Capacity of the in-process store.
    pub max_entries: usize,

    pub ttl: CacheTtlConfig,

    /// Use Redis instead of the in-process store when set.
    pub redis_url: Option<String>,

    /// Namespace for Redis keys.
    pub redis_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: CacheTtlConfig::default(),
            redis_url: None,
            redis_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub trend_threshold: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trend_threshold: DEFAULT_TREND_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Defaults, then `path` if given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file. Missing keys take defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    ///
    /// Unparseable values are errors rather than silently ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(
            lookup: &dyn Fn(&str) -> Option<String>,
            key: &str,
        ) -> Result<Option<T>>
        where
            T::Err: std::fmt::Display,
        {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|e| anyhow::anyhow!("Invalid value {:?} for {}: {}", raw, key, e)),
                None => Ok(None),
            }
        }

        let lookup: &dyn Fn(&str) -> Option<String> = &lookup;

        if let Some(v) = parse(lookup, "NDVI_CACHE_MAX_ENTRIES")? {
            self.cache.max_entries = v;
        }
        if let Some(v) = parse(lookup, "NDVI_TTL_HISTORICAL_SECS")? {
            self.cache.ttl.historical_secs = v;
        }
        if let Some(v) = parse(lookup, "NDVI_TTL_RECENT_SECS")? {
            self.cache.ttl.recent_secs = v;
        }
        if let Some(v) = parse(lookup, "NDVI_TTL_CURRENT_SECS")? {
            self.cache.ttl.current_secs = v;
        }
        if let Some(v) = parse(lookup, "NDVI_TTL_ERROR_SECS")? {
            self.cache.ttl.error_secs = v;
        }
        if let Some(v) = parse(lookup, "NDVI_MIN_CONFIDENCE")? {
            self.quality.min_confidence = v;
        }
        if let Some(v) = parse(lookup, "NDVI_MAX_CLOUD")? {
            self.quality.max_cloud = v;
        }
        if let Some(v) = parse(lookup, "NDVI_MIN_USABLE")? {
            self.quality.min_usable = v;
        }
        if let Some(v) = parse(lookup, "NDVI_MIN_PIXELS")? {
            self.quality.min_pixels = v;
        }
        if let Some(v) = parse(lookup, "NDVI_TREND_THRESHOLD")? {
            self.analytics.trend_threshold = v;
        }
        if let Some(url) = lookup("REDIS_URL").filter(|u| !u.trim().is_empty()) {
            self.cache.redis_url = Some(url);
        }

        Ok(self)
    }

    /// Reject values no component can run with.
    ///
    /// Confidence weights are validated when deserialized.
    pub fn validate(&self) -> NdviResult<()> {
        if self.cache.max_entries == 0 {
            return Err(NdviError::invalid_config(
                "cache.max_entries",
                "must be at least 1",
            ));
        }
        self.cache.ttl.validate()?;

        let fractions = [
            ("quality.max_cloud", self.quality.max_cloud),
            ("quality.min_usable", self.quality.min_usable),
            ("quality.min_confidence", self.quality.min_confidence),
        ];
        for (param, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(NdviError::invalid_config(
                    param,
                    format!("must be within [0, 1], got {}", value),
                ));
            }
        }

        let threshold = self.analytics.trend_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(NdviError::invalid_config(
                "analytics.trend_threshold",
                format!("must be a non-negative number, got {}", threshold),
            ));
        }
        Ok(())
    }
}
