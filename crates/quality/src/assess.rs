//! Observation assessment: cloud estimate, confidence and usability in one pass.

use chrono::NaiveDate;
use ndvi_common::{age_in_days, ConfidenceGrade, Observation, RawObservation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cloud::{self, CloudEstimate, DEFAULT_MAX_CLOUD, DEFAULT_MIN_USABLE};
use crate::confidence::{
    confidence_breakdown, should_use_observation, ConfidenceBreakdown, ConfidenceWeights,
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_PIXELS,
};

/// Thresholds and weights applied when assessing observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    pub weights: ConfidenceWeights,
    pub min_pixels: u64,
    pub max_cloud: f64,
    pub min_usable: f64,
    pub min_confidence: f64,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            weights: ConfidenceWeights::default(),
            min_pixels: DEFAULT_MIN_PIXELS,
            max_cloud: DEFAULT_MAX_CLOUD,
            min_usable: DEFAULT_MIN_USABLE,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }
}

/// Outcome of assessing one raw observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub observation: Observation,
    pub cloud: CloudEstimate,
    pub breakdown: ConfidenceBreakdown,
    pub grade: ConfidenceGrade,
    /// Scene passed the cloud and usable-pixel checks.
    pub scene_usable: bool,
    /// Scene is usable and confident enough for aggregates.
    pub include: bool,
}

/// Score a raw observation as of `today`.
///
/// When the ingestion source omits `pixel_count`, the number of pixels in a
/// per-pixel cloud encoding stands in for it.
pub fn assess_observation(
    raw: RawObservation,
    today: NaiveDate,
    policy: &QualityPolicy,
) -> Assessment {
    let cloud = cloud::estimate(&raw.cloud);
    let pixel_count = raw
        .pixel_count
        .or_else(|| raw.cloud.pixel_len().map(|n| n as u64));
    let age_days = age_in_days(raw.observation_date, today) as f64;

    let breakdown = confidence_breakdown(
        cloud.cloud_fraction,
        age_days,
        raw.ndvi.has_percentiles(),
        raw.ndvi.has_std(),
        pixel_count,
        policy.min_pixels,
        &policy.weights,
    );

    let scene_usable = cloud::is_scene_usable(
        cloud.cloud_fraction,
        policy.max_cloud,
        policy.min_usable,
        cloud.usable_fraction,
    );
    let include = scene_usable && should_use_observation(breakdown.score, policy.min_confidence);

    debug!(
        field_id = %raw.field_id,
        date = %raw.observation_date,
        source = %raw.source,
        cloud_fraction = cloud.cloud_fraction,
        confidence = breakdown.score,
        include,
        "Assessed observation"
    );

    let observation = Observation {
        field_id: raw.field_id,
        observation_date: raw.observation_date,
        ndvi: raw.ndvi,
        cloud_coverage: cloud.cloud_fraction,
        pixel_count,
        source: raw.source,
        confidence: breakdown.score,
    };

    Assessment {
        observation,
        cloud,
        breakdown,
        grade: ConfidenceGrade::from_score(breakdown.score),
        scene_usable,
        include,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndvi_common::{CloudEncoding, NdviStats};

    fn raw(cloud: CloudEncoding, pixel_count: Option<u64>) -> RawObservation {
        RawObservation {
            field_id: "f1".to_string(),
            observation_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            ndvi: NdviStats::basic(0.6, 0.3, 0.8)
                .with_std(0.05)
                .with_percentiles(0.45, 0.72),
            cloud,
            pixel_count,
            source: "sentinel-2".to_string(),
        }
    }

    #[test]
    fn test_clear_fresh_observation_included() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = assess_observation(
            raw(CloudEncoding::Reported { fraction: 0.0 }, Some(500)),
            today,
            &QualityPolicy::default(),
        );
        assert_eq!(a.observation.confidence, 1.0);
        assert_eq!(a.grade, ConfidenceGrade::Excellent);
        assert!(a.scene_usable);
        assert!(a.include);
    }

    #[test]
    fn test_pixel_count_falls_back_to_encoding_length() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let a = assess_observation(
            raw(
                CloudEncoding::BinaryMask {
                    values: vec![0; 50],
                    cloud_value: 1,
                },
                None,
            ),
            today,
            &QualityPolicy::default(),
        );
        assert_eq!(a.observation.pixel_count, Some(50));
        assert_eq!(a.breakdown.pixel_factor, 0.5);
    }

    #[test]
    fn test_unusable_scl_scene_excluded() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        // 60% no-data, no cloud
        let mut values = vec![0u8; 60];
        values.extend(vec![4u8; 40]);
        let a = assess_observation(
            raw(CloudEncoding::SceneClassification { values }, None),
            today,
            &QualityPolicy::default(),
        );
        assert_eq!(a.cloud.cloud_fraction, 0.0);
        assert!(!a.scene_usable);
        assert!(!a.include);
    }
}
