//! Common test fixtures for NDVI engine tests.
//!
//! This module provides pre-defined observations and series that represent
//! common scenarios in field monitoring.

use chrono::{Duration, NaiveDate};
use ndvi_common::{CloudEncoding, NdviStats, Observation, RawObservation};

/// Worked-example series with known trend classifications.
pub mod series {
    /// Clearly rising canopy.
    pub const RISING: [f64; 6] = [0.3, 0.35, 0.5, 0.55, 0.6, 0.65];

    /// Clearly declining canopy.
    pub const FALLING: [f64; 6] = [0.7, 0.65, 0.5, 0.45, 0.4, 0.35];

    /// Noise around 0.5.
    pub const STABLE: [f64; 6] = [0.5, 0.52, 0.48, 0.51, 0.49, 0.50];

    /// Too short to classify.
    pub const SHORT: [f64; 3] = [0.5, 0.6, 0.7];

    /// Perfectly linear.
    pub const LINEAR: [f64; 5] = [0.0, 0.1, 0.2, 0.3, 0.4];
}

/// Common source identifiers.
pub mod sources {
    pub const SENTINEL_2: &str = "sentinel-2";
    pub const LANDSAT_8: &str = "landsat-8";
    pub const PLANET: &str = "planetscope";
}

/// Fixed reference date used across tests.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid fixture date")
}

/// Full statistics centred on `mean`.
pub fn complete_stats(mean: f64) -> NdviStats {
    NdviStats::basic(mean, mean - 0.2, mean + 0.2)
        .with_std(0.05)
        .with_percentiles(mean - 0.1, mean + 0.1)
}

/// A scored observation for `field_id`, `days_ago` before [`reference_date`].
pub fn observation(field_id: &str, days_ago: i64, mean: f64, confidence: f64) -> Observation {
    Observation {
        field_id: field_id.to_string(),
        observation_date: reference_date() - Duration::days(days_ago),
        ndvi: complete_stats(mean),
        cloud_coverage: 0.05,
        pixel_count: Some(1_000),
        source: sources::SENTINEL_2.to_string(),
        confidence,
    }
}

/// A daily window of observations ending at [`reference_date`], one per value.
pub fn observation_window(field_id: &str, means: &[f64], confidence: f64) -> Vec<Observation> {
    let last = means.len() as i64 - 1;
    means
        .iter()
        .enumerate()
        .map(|(i, &mean)| observation(field_id, last - i as i64, mean, confidence))
        .collect()
}

/// A raw observation with a provider-reported cloud fraction.
pub fn raw_observation(field_id: &str, days_ago: i64, mean: f64, cloud: f64) -> RawObservation {
    RawObservation {
        field_id: field_id.to_string(),
        observation_date: reference_date() - Duration::days(days_ago),
        ndvi: complete_stats(mean),
        cloud: CloudEncoding::Reported { fraction: cloud },
        pixel_count: Some(1_000),
        source: sources::SENTINEL_2.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_window_dates_ascending() {
        let window = observation_window("f", &series::RISING, 0.9);
        assert_eq!(window.len(), 6);
        assert_eq!(window.last().unwrap().observation_date, reference_date());
        assert!(window
            .windows(2)
            .all(|w| w[0].observation_date < w[1].observation_date));
    }

    #[test]
    fn test_complete_stats() {
        let stats = complete_stats(0.5);
        assert!(stats.has_std());
        assert!(stats.has_percentiles());
    }
}
