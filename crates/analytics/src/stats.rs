//! Basic reductions shared by the analytics functions.

/// Confidence at or below which an observation is treated as noise.
pub const CONFIDENCE_NOISE_FLOOR: f64 = 0.1;

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation, or `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Confidence-weighted mean of `(value, confidence)` pairs.
///
/// Pairs with confidence at or below [`CONFIDENCE_NOISE_FLOOR`] are dropped.
/// Returns `None` when nothing remains or the remaining weights sum to zero.
pub fn weighted_average_ndvi(observations: &[(f64, f64)]) -> Option<f64> {
    let (weighted_sum, weight_total) = observations
        .iter()
        .filter(|(_, confidence)| *confidence > CONFIDENCE_NOISE_FLOOR)
        .fold((0.0, 0.0), |(sum, total), (value, confidence)| {
            (sum + value * confidence, total + confidence)
        });

    if weight_total == 0.0 {
        return None;
    }
    Some(weighted_sum / weight_total)
}
