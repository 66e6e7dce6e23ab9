//! Comparison of a current reading against a historical baseline.

use ndvi_common::{NdviError, NdviResult};
use serde::{Deserialize, Serialize};

/// |z| at which a reading leaves the normal band.
pub const NORMAL_Z_LIMIT: f64 = 1.0;

/// |z| at which a reading is significantly off baseline.
pub const SIGNIFICANT_Z_LIMIT: f64 = 2.0;

/// Position of a reading relative to its historical distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationStatus {
    Normal,
    AboveNormal,
    BelowNormal,
    SignificantlyAbove,
    SignificantlyBelow,
}

impl DeviationStatus {
    /// Band a z-score: `|z| < 1` normal, `[1, 2)` above/below, `>= 2` significant.
    pub fn from_z_score(z_score: f64) -> Self {
        let magnitude = z_score.abs();
        if magnitude < NORMAL_Z_LIMIT {
            DeviationStatus::Normal
        } else if magnitude < SIGNIFICANT_Z_LIMIT {
            if z_score > 0.0 {
                DeviationStatus::AboveNormal
            } else {
                DeviationStatus::BelowNormal
            }
        } else if z_score > 0.0 {
            DeviationStatus::SignificantlyAbove
        } else {
            DeviationStatus::SignificantlyBelow
        }
    }

    /// Whether the reading warrants an anomaly flag.
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            DeviationStatus::SignificantlyAbove | DeviationStatus::SignificantlyBelow
        )
    }
}

/// Current reading compared to a `(mean, std)` baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalComparison {
    pub z_score: f64,
    pub status: DeviationStatus,
    pub deviation_pct: f64,
}

/// Compare `current` to a historical mean and standard deviation.
///
/// A zero `hist_std` gives a z-score of 0. A zero `hist_mean` is an error
/// because the percentage deviation is undefined.
pub fn compare_to_historical_mean(
    current: f64,
    hist_mean: f64,
    hist_std: f64,
) -> NdviResult<HistoricalComparison> {
    if hist_mean == 0.0 {
        return Err(NdviError::UndefinedDeviation);
    }

    let z_score = if hist_std == 0.0 {
        0.0
    } else {
        (current - hist_mean) / hist_std
    };

    Ok(HistoricalComparison {
        z_score,
        status: DeviationStatus::from_z_score(z_score),
        deviation_pct: (current - hist_mean) / hist_mean * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significantly_above() {
        let cmp = compare_to_historical_mean(0.8, 0.5, 0.1).unwrap();
        assert!(cmp.z_score >= 2.0);
        assert_eq!(cmp.status, DeviationStatus::SignificantlyAbove);
        assert!((cmp.deviation_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_bands() {
        assert_eq!(DeviationStatus::from_z_score(0.0), DeviationStatus::Normal);
        assert_eq!(DeviationStatus::from_z_score(0.99), DeviationStatus::Normal);
        assert_eq!(DeviationStatus::from_z_score(1.0), DeviationStatus::AboveNormal);
        assert_eq!(DeviationStatus::from_z_score(-1.5), DeviationStatus::BelowNormal);
        assert_eq!(
            DeviationStatus::from_z_score(2.0),
            DeviationStatus::SignificantlyAbove
        );
        assert_eq!(
            DeviationStatus::from_z_score(-2.0),
            DeviationStatus::SignificantlyBelow
        );
    }

    #[test]
    fn test_zero_std_gives_zero_z() {
        let cmp = compare_to_historical_mean(0.9, 0.5, 0.0).unwrap();
        assert_eq!(cmp.z_score, 0.0);
        assert_eq!(cmp.status, DeviationStatus::Normal);
        assert!(cmp.deviation_pct > 0.0);
    }

    #[test]
    fn test_zero_mean_is_error() {
        let err = compare_to_historical_mean(0.4, 0.0, 0.1).unwrap_err();
        assert!(matches!(err, NdviError::UndefinedDeviation));
    }

    #[test]
    fn test_significance_flag() {
        assert!(DeviationStatus::SignificantlyBelow.is_significant());
        assert!(!DeviationStatus::BelowNormal.is_significant());
    }
}
