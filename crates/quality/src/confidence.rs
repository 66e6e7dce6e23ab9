//! Multi-factor confidence scoring for NDVI observations.
//!
//! The score starts at 1.0 and is reduced by additive penalties for cloud
//! cover, observation age and missing statistics, then scaled down when the
//! scene has fewer pixels than required. The result is clamped to `[0, 1]`.

use ndvi_common::{ConfidenceGrade, GradeLabel, NdviError, NdviResult};
use serde::{Deserialize, Serialize};

/// Age at which the age penalty saturates.
pub const AGE_SATURATION_DAYS: f64 = 14.0;

/// Default minimum pixel count before the proportional penalty applies.
pub const DEFAULT_MIN_PIXELS: u64 = 100;

/// Default threshold for including an observation in aggregates.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;

/// Share of the missing-data penalty charged for absent P10/P90.
const PERCENTILE_SHARE: f64 = 0.6;

/// Share of the missing-data penalty charged for absent standard deviation.
const STD_SHARE: f64 = 0.4;

/// Tolerance on the weight sum for float accumulation error.
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// Penalty weights. Each is non-negative and their sum is at most 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WeightsSpec", into = "WeightsSpec")]
pub struct ConfidenceWeights {
    cloud_penalty: f64,
    age_penalty: f64,
    missing_percentile_penalty: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WeightsSpec {
    cloud_penalty: f64,
    age_penalty: f64,
    missing_percentile_penalty: f64,
}

impl ConfidenceWeights {
    /// Build weights, failing if any is negative or non-finite, or if they
    /// sum to more than 1.0.
    pub fn new(
        cloud_penalty: f64,
        age_penalty: f64,
        missing_percentile_penalty: f64,
    ) -> NdviResult<Self> {
        let named = [
            ("cloud_penalty", cloud_penalty),
            ("age_penalty", age_penalty),
            ("missing_percentile_penalty", missing_percentile_penalty),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(NdviError::InvalidWeights(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let sum = cloud_penalty + age_penalty + missing_percentile_penalty;
        if sum > 1.0 + WEIGHT_SUM_EPSILON {
            return Err(NdviError::InvalidWeights(format!(
                "weights sum to {:.4}, must not exceed 1.0",
                sum
            )));
        }

        Ok(Self {
            cloud_penalty,
            age_penalty,
            missing_percentile_penalty,
        })
    }

    pub fn cloud_penalty(&self) -> f64 {
        self.cloud_penalty
    }

    pub fn age_penalty(&self) -> f64 {
        self.age_penalty
    }

    pub fn missing_percentile_penalty(&self) -> f64 {
        self.missing_percentile_penalty
    }

    pub fn sum(&self) -> f64 {
        self.cloud_penalty + self.age_penalty + self.missing_percentile_penalty
    }
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            cloud_penalty: 0.5,
            age_penalty: 0.3,
            missing_percentile_penalty: 0.2,
        }
    }
}

impl TryFrom<WeightsSpec> for ConfidenceWeights {
    type Error = NdviError;

    fn try_from(spec: WeightsSpec) -> Result<Self, Self::Error> {
        Self::new(
            spec.cloud_penalty,
            spec.age_penalty,
            spec.missing_percentile_penalty,
        )
    }
}

impl From<ConfidenceWeights> for WeightsSpec {
    fn from(weights: ConfidenceWeights) -> Self {
        Self {
            cloud_penalty: weights.cloud_penalty,
            age_penalty: weights.age_penalty,
            missing_percentile_penalty: weights.missing_percentile_penalty,
        }
    }
}

/// Each factor that went into a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Amount subtracted for cloud cover.
    pub cloud_penalty: f64,
    /// Amount subtracted for observation age.
    pub age_penalty: f64,
    /// Amount subtracted for missing percentiles and/or std.
    pub missing_data_penalty: f64,
    /// Multiplier applied for low pixel count (1.0 when not applied).
    pub pixel_factor: f64,
    /// Final clamped score.
    pub score: f64,
}

/// Score an observation and report each penalty applied.
pub fn confidence_breakdown(
    cloud_coverage: f64,
    age_days: f64,
    has_percentiles: bool,
    has_std: bool,
    pixel_count: Option<u64>,
    min_pixels: u64,
    weights: &ConfidenceWeights,
) -> ConfidenceBreakdown {
    let cloud = if cloud_coverage.is_finite() {
        cloud_coverage.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let cloud_penalty = weights.cloud_penalty * cloud;

    // f64::max ignores NaN, so a NaN age counts as fresh
    let age_ramp = (age_days.max(0.0) / AGE_SATURATION_DAYS).min(1.0);
    let age_penalty = weights.age_penalty * age_ramp;

    let mut missing_data_penalty = 0.0;
    if !has_percentiles {
        missing_data_penalty += weights.missing_percentile_penalty * PERCENTILE_SHARE;
    }
    if !has_std {
        missing_data_penalty += weights.missing_percentile_penalty * STD_SHARE;
    }

    let mut score = 1.0 - cloud_penalty - age_penalty - missing_data_penalty;

    let pixel_factor = match pixel_count {
        Some(count) if count < min_pixels => count as f64 / min_pixels as f64,
        _ => 1.0,
    };
    score *= pixel_factor;

    ConfidenceBreakdown {
        cloud_penalty,
        age_penalty,
        missing_data_penalty,
        pixel_factor,
        score: score.clamp(0.0, 1.0),
    }
}

/// Reliability score in `[0, 1]` for a single observation.
pub fn confidence_score(
    cloud_coverage: f64,
    age_days: f64,
    has_percentiles: bool,
    has_std: bool,
    pixel_count: Option<u64>,
    min_pixels: u64,
    weights: &ConfidenceWeights,
) -> f64 {
    confidence_breakdown(
        cloud_coverage,
        age_days,
        has_percentiles,
        has_std,
        pixel_count,
        min_pixels,
        weights,
    )
    .score
}

/// `(en, ar)` label pair for a confidence score.
pub fn confidence_grade(score: f64) -> (&'static str, &'static str) {
    ConfidenceGrade::from_score(score).labels()
}

/// Gate used by consumers deciding whether to include an observation.
pub fn should_use_observation(confidence: f64, min_confidence: f64) -> bool {
    confidence >= min_confidence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(cloud: f64, age: f64) -> f64 {
        confidence_score(
            cloud,
            age,
            true,
            true,
            None,
            DEFAULT_MIN_PIXELS,
            &ConfidenceWeights::default(),
        )
    }

    #[test]
    fn test_perfect_observation() {
        assert_eq!(score(0.0, 0.0), 1.0);
    }

    #[test]
    fn test_cloud_penalty() {
        assert!((score(0.5, 0.0) - 0.75).abs() < 1e-12);
        assert!((score(1.0, 0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_age_penalty_saturates() {
        let at_7 = score(0.0, 7.0);
        assert!((at_7 - 0.85).abs() < 1e-12);
        assert_eq!(score(0.0, 14.0), score(0.0, 30.0));
        assert_eq!(score(0.0, -5.0), 1.0);
    }

    #[test]
    fn test_missing_data_penalties_are_additive() {
        let w = ConfidenceWeights::default();
        let no_pct = confidence_score(0.0, 0.0, false, true, None, 100, &w);
        let no_std = confidence_score(0.0, 0.0, true, false, None, 100, &w);
        let neither = confidence_score(0.0, 0.0, false, false, None, 100, &w);
        assert!((no_pct - (1.0 - 0.2 * 0.6)).abs() < 1e-12);
        assert!((no_std - (1.0 - 0.2 * 0.4)).abs() < 1e-12);
        assert!((neither - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_pixel_penalty_is_proportional() {
        let w = ConfidenceWeights::default();
        let full = confidence_score(0.2, 0.0, true, true, Some(100), 100, &w);
        let half = confidence_score(0.2, 0.0, true, true, Some(50), 100, &w);
        assert!((half - full * 0.5).abs() < 1e-12);

        let zero = confidence_score(0.0, 0.0, true, true, Some(0), 100, &w);
        assert_eq!(zero, 0.0);
    }

    #[test]
    fn test_breakdown_reports_factors() {
        let b = confidence_breakdown(
            0.4,
            14.0,
            false,
            true,
            Some(25),
            100,
            &ConfidenceWeights::default(),
        );
        assert!((b.cloud_penalty - 0.2).abs() < 1e-12);
        assert!((b.age_penalty - 0.3).abs() < 1e-12);
        assert!((b.missing_data_penalty - 0.12).abs() < 1e-12);
        assert_eq!(b.pixel_factor, 0.25);
        assert!((b.score - (1.0 - 0.2 - 0.3 - 0.12) * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_weights_validation() {
        assert!(ConfidenceWeights::new(0.5, 0.3, 0.2).is_ok());
        assert!(ConfidenceWeights::new(0.0, 0.0, 0.0).is_ok());

        let err = ConfidenceWeights::new(0.6, 0.3, 0.2).unwrap_err();
        assert!(matches!(err, NdviError::InvalidWeights(_)));

        assert!(ConfidenceWeights::new(-0.1, 0.3, 0.2).is_err());
        assert!(ConfidenceWeights::new(f64::NAN, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_weights_deserialize_validates() {
        let ok: ConfidenceWeights = serde_json::from_str(
            r#"{"cloud_penalty": 0.4, "age_penalty": 0.4, "missing_percentile_penalty": 0.1}"#,
        )
        .unwrap();
        assert_eq!(ok.cloud_penalty(), 0.4);

        let bad = serde_json::from_str::<ConfidenceWeights>(
            r#"{"cloud_penalty": 0.9, "age_penalty": 0.4, "missing_percentile_penalty": 0.1}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_should_use_observation() {
        assert!(should_use_observation(0.3, DEFAULT_MIN_CONFIDENCE));
        assert!(!should_use_observation(0.29, DEFAULT_MIN_CONFIDENCE));
    }

    #[test]
    fn test_confidence_grade() {
        assert_eq!(confidence_grade(0.95).0, "excellent");
        assert_eq!(confidence_grade(0.1).0, "poor");
    }
}
