//! Age-based TTL policy for cached observations.
//!
//! Old scenes never change, so they can be cached for a week; the most
//! recent scenes may still be reprocessed by the provider and expire hourly.

use chrono::NaiveDate;
use ndvi_common::{age_in_days, today_utc, NdviError, NdviResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Age in days beyond which an observation is historical.
pub const HISTORICAL_AGE_DAYS: i64 = 30;

/// Age in days beyond which an observation is recent rather than current.
pub const RECENT_AGE_DAYS: i64 = 7;

/// Longest TTL any backend accepts (365 days).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 3600;

/// Longest TTL any backend accepts.
pub const MAX_TTL: Duration = Duration::from_secs(MAX_TTL_SECS);

/// Whether a backend can store an entry for `ttl`.
pub fn is_valid_ttl(ttl: Duration) -> bool {
    !ttl.is_zero() && ttl <= MAX_TTL
}

/// TTL tier selected by observation age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlTier {
    Historical,
    Recent,
    Current,
}

impl TtlTier {
    /// `> 30` days historical, `> 7` recent, otherwise current.
    pub fn for_age(age_days: i64) -> Self {
        if age_days > HISTORICAL_AGE_DAYS {
            TtlTier::Historical
        } else if age_days > RECENT_AGE_DAYS {
            TtlTier::Recent
        } else {
            TtlTier::Current
        }
    }
}

/// TTLs in seconds for each tier plus cached errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    pub historical_secs: u64,
    pub recent_secs: u64,
    pub current_secs: u64,
    pub error_secs: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            historical_secs: 7 * 24 * 3600,
            recent_secs: 24 * 3600,
            current_secs: 3600,
            error_secs: 300,
        }
    }
}

impl CacheTtlConfig {
    /// Reject zero TTLs and TTLs above [`MAX_TTL_SECS`]. Tier ordering
    /// violations are logged, not rejected.
    pub fn validate(&self) -> NdviResult<()> {
        let named = [
            ("historical", self.historical_secs),
            ("recent", self.recent_secs),
            ("current", self.current_secs),
            ("error", self.error_secs),
        ];
        for (key, secs) in named {
            if secs == 0 || secs > MAX_TTL_SECS {
                return Err(NdviError::InvalidTtl {
                    key: key.to_string(),
                });
            }
        }

        if self.historical_secs < self.recent_secs || self.recent_secs < self.current_secs {
            warn!(
                historical = self.historical_secs,
                recent = self.recent_secs,
                current = self.current_secs,
                "TTL tiers are not ordered historical >= recent >= current"
            );
        }
        Ok(())
    }

    pub fn secs_for(&self, tier: TtlTier) -> u64 {
        match tier {
            TtlTier::Historical => self.historical_secs,
            TtlTier::Recent => self.recent_secs,
            TtlTier::Current => self.current_secs,
        }
    }

    pub fn error_ttl(&self) -> Duration {
        Duration::from_secs(self.error_secs)
    }
}

/// TTL in seconds for an observation dated `observation_date`, as of today.
pub fn calculate_ttl(observation_date: NaiveDate, config: &CacheTtlConfig) -> u64 {
    calculate_ttl_at(observation_date, today_utc(), config)
}

/// TTL in seconds as of a fixed `today`.
///
/// Future-dated observations fall in the current tier.
pub fn calculate_ttl_at(observation_date: NaiveDate, today: NaiveDate, config: &CacheTtlConfig) -> u64 {
    config.secs_for(TtlTier::for_age(age_in_days(observation_date, today)))
}
