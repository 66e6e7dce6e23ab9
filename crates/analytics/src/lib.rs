//! Trend and anomaly analytics for confidence-scored NDVI series.
//!
//! Every function here is a pure reduction over its input slice. Degenerate
//! inputs return documented defaults (`Insufficient`, `None`) rather than
//! errors; the only error is a historical comparison against a zero mean.
//!
//! # Example
//!
//! ```
//! use analytics::{compute_trend, weighted_average_ndvi, TrendDirection};
//!
//! let trend = compute_trend(&[0.3, 0.35, 0.5, 0.55, 0.6, 0.65], 0.03);
//! assert_eq!(trend, TrendDirection::Rising);
//!
//! let avg = weighted_average_ndvi(&[(0.5, 1.0), (0.7, 1.0)]).unwrap();
//! assert!((avg - 0.6).abs() < 1e-9);
//! ```

pub mod comparison;
pub mod stats;
pub mod summary;
pub mod trend;

pub use comparison::{compare_to_historical_mean, DeviationStatus, HistoricalComparison};
pub use stats::{mean, population_std, weighted_average_ndvi, CONFIDENCE_NOISE_FLOOR};
pub use summary::NdviSummary;
pub use trend::{
    compute_linear_trend, compute_trend, LinearTrend, TrendDirection, DEFAULT_TREND_THRESHOLD,
};
