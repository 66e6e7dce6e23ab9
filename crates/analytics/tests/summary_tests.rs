//! Window summary and trend tests over fixture observations.

use analytics::{
    compare_to_historical_mean, compute_linear_trend, compute_trend, DeviationStatus,
    NdviSummary, TrendDirection, DEFAULT_TREND_THRESHOLD,
};
use test_utils::{
    assert_approx_eq, linear_series, observation, observation_window, oscillating_series,
    reference_date, seasonal_series, series,
};

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn test_fixture_series_classification() {
    let t = DEFAULT_TREND_THRESHOLD;
    assert_eq!(compute_trend(&series::RISING, t), TrendDirection::Rising);
    assert_eq!(compute_trend(&series::FALLING, t), TrendDirection::Falling);
    assert_eq!(compute_trend(&series::STABLE, t), TrendDirection::Stable);
    assert_eq!(compute_trend(&series::SHORT, t), TrendDirection::Insufficient);
}

#[test]
fn test_linear_fixture() {
    let fit = compute_linear_trend(&series::LINEAR).unwrap();
    assert!(fit.slope > 0.0);
    assert_approx_eq!(fit.r_squared, 1.0, 0.001);
}

#[test]
fn test_generated_series() {
    let rising = linear_series(0.2, 0.05, 10);
    assert_eq!(compute_trend(&rising, 0.03), TrendDirection::Rising);

    let flat = oscillating_series(0.5, 0.01, 10);
    assert_eq!(compute_trend(&flat, 0.03), TrendDirection::Stable);

    // Symmetric green-up and senescence cancels out
    let season = seasonal_series(0.2, 0.8, 21);
    assert_eq!(compute_trend(&season, 0.03), TrendDirection::Stable);
    let fit = compute_linear_trend(&season).unwrap();
    assert!(fit.slope.abs() < 1e-9);
}

#[test]
fn test_z_score_example() {
    let cmp = compare_to_historical_mean(0.8, 0.5, 0.1).unwrap();
    assert!(cmp.z_score >= 2.0);
    assert_eq!(cmp.status, DeviationStatus::SignificantlyAbove);
}

// ============================================================================
// NdviSummary
// ============================================================================

#[test]
fn test_summary_rising_window() {
    let window = observation_window("field-1", &series::RISING, 0.9);
    let summary = NdviSummary::from_observations(&window, DEFAULT_TREND_THRESHOLD).unwrap();

    assert_eq!(summary.count, 6);
    assert_eq!(summary.trend, TrendDirection::Rising);
    assert!(summary.trend_slope.unwrap() > 0.0);
    assert_approx_eq!(summary.min_ndvi, 0.3, 1e-12);
    assert_approx_eq!(summary.max_ndvi, 0.65, 1e-12);
    assert_approx_eq!(summary.mean_confidence, 0.9, 1e-12);
    assert_approx_eq!(summary.weighted_mean_ndvi.unwrap(), summary.mean_ndvi, 1e-12);
    assert_eq!(summary.date_range.end, reference_date());
    assert_eq!(summary.date_range.span_days(), 6);
}

#[test]
fn test_summary_orders_by_date() {
    let mut window = observation_window("field-1", &series::FALLING, 0.8);
    window.reverse();
    let summary = NdviSummary::from_observations(&window, DEFAULT_TREND_THRESHOLD).unwrap();
    assert_eq!(summary.trend, TrendDirection::Falling);
}

#[test]
fn test_summary_empty_window() {
    assert!(NdviSummary::from_observations(&[], DEFAULT_TREND_THRESHOLD).is_none());
}

#[test]
fn test_summary_single_observation() {
    let window = vec![observation("field-1", 0, 0.55, 0.7)];
    let summary = NdviSummary::from_observations(&window, DEFAULT_TREND_THRESHOLD).unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.std_ndvi, 0.0);
    assert_eq!(summary.trend, TrendDirection::Insufficient);
    assert!(summary.trend_slope.is_none());
}

#[test]
fn test_summary_all_noise_has_no_weighted_mean() {
    let window = observation_window("field-1", &series::STABLE, 0.05);
    let summary = NdviSummary::from_observations(&window, DEFAULT_TREND_THRESHOLD).unwrap();
    assert!(summary.weighted_mean_ndvi.is_none());
    assert_approx_eq!(summary.mean_confidence, 0.05, 1e-12);
}
