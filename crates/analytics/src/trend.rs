//! Trend signals over an NDVI series.
//!
//! Two independent signals are provided:
//! - [`compute_trend`]: threshold classification comparing head and tail means
//! - [`compute_linear_trend`]: ordinary least-squares slope and R²
//!
//! Callers may use either or both.

use serde::{Deserialize, Serialize};

use crate::stats::mean;

/// Default head/tail difference needed to call a trend.
pub const DEFAULT_TREND_THRESHOLD: f64 = 0.03;

/// Minimum points for threshold classification.
pub const MIN_TREND_POINTS: usize = 4;

/// Minimum points for a linear fit.
pub const MIN_LINEAR_POINTS: usize = 3;

/// Total sum of squares below which the series is treated as constant.
const ZERO_VARIANCE_EPSILON: f64 = 1e-12;

/// Threshold-based trend classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Insufficient,
    Rising,
    Falling,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Insufficient => "insufficient",
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a series by comparing the mean of its first half to the mean
/// of its second half.
///
/// For odd lengths the middle point belongs to neither half, so both
/// windows have `len / 2` points.
pub fn compute_trend(values: &[f64], threshold: f64) -> TrendDirection {
    if values.len() < MIN_TREND_POINTS {
        return TrendDirection::Insufficient;
    }

    let half = values.len() / 2;
    let (Some(head), Some(tail)) = (
        mean(&values[..half]),
        mean(&values[values.len() - half..]),
    ) else {
        return TrendDirection::Insufficient;
    };

    let change = tail - head;
    if change > threshold {
        TrendDirection::Rising
    } else if change < -threshold {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    }
}

/// Least-squares fit of value against index position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearTrend {
    /// Change in value per step.
    pub slope: f64,
    /// Fitted value at index 0.
    pub intercept: f64,
    /// Coefficient of determination in `[0, 1]`.
    pub r_squared: f64,
}

/// Fit `value = intercept + slope * index`.
///
/// Returns `None` for fewer than three points. A constant series yields
/// slope 0 and R² 0: no variance exists for the line to explain.
pub fn compute_linear_trend(values: &[f64]) -> Option<LinearTrend> {
    let n = values.len();
    if n < MIN_LINEAR_POINTS {
        return None;
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_tot = 0.0;
    let mut ss_res = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_tot += (y - y_mean).powi(2);
        ss_res += (y - fitted).powi(2);
    }

    if ss_tot < ZERO_VARIANCE_EPSILON {
        return Some(LinearTrend {
            slope: 0.0,
            intercept: y_mean,
            r_squared: 0.0,
        });
    }

    Some(LinearTrend {
        slope,
        intercept,
        r_squared: (1.0 - ss_res / ss_tot).clamp(0.0, 1.0),
    })
}
