//! Window summaries over scored observations.

use ndvi_common::{DateRange, Observation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stats::{mean, population_std, weighted_average_ndvi};
use crate::trend::{compute_linear_trend, compute_trend, TrendDirection};

/// Aggregate statistics for a window of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviSummary {
    pub count: usize,
    pub mean_ndvi: f64,
    pub min_ndvi: f64,
    pub max_ndvi: f64,
    pub std_ndvi: f64,
    pub mean_confidence: f64,
    /// Confidence-weighted mean; `None` when every observation is noise.
    pub weighted_mean_ndvi: Option<f64>,
    pub trend: TrendDirection,
    pub trend_slope: Option<f64>,
    pub date_range: DateRange,
}

impl NdviSummary {
    /// Summarize a window using each observation's mean NDVI.
    ///
    /// Observations are ordered by date before trend fitting. Returns
    /// `None` for an empty window.
    pub fn from_observations(observations: &[Observation], trend_threshold: f64) -> Option<Self> {
        let mut ordered: Vec<&Observation> = observations.iter().collect();
        ordered.sort_by_key(|o| o.observation_date);

        let values: Vec<f64> = ordered.iter().map(|o| o.ndvi.mean).collect();
        let confidences: Vec<f64> = ordered.iter().map(|o| o.confidence).collect();
        let pairs: Vec<(f64, f64)> = ordered.iter().map(|o| o.weighted_value()).collect();

        let mean_ndvi = mean(&values)?;
        let std_ndvi = population_std(&values)?;
        let mean_confidence = mean(&confidences)?;
        let date_range = DateRange::covering(ordered.iter().map(|o| o.observation_date))?;

        let min_ndvi = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ndvi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let trend = compute_trend(&values, trend_threshold);
        let trend_slope = compute_linear_trend(&values).map(|fit| fit.slope);

        debug!(
            count = values.len(),
            mean_ndvi,
            trend = %trend,
            "Built NDVI summary"
        );

        Some(Self {
            count: values.len(),
            mean_ndvi,
            min_ndvi,
            max_ndvi,
            std_ndvi,
            mean_confidence,
            weighted_mean_ndvi: weighted_average_ndvi(&pairs),
            trend,
            trend_slope,
            date_range,
        })
    }
}
