//! Test data generators for synthetic NDVI series and pixel bands.
//!
//! These generators create predictable, verifiable patterns so tests can
//! assert exact fractions and trend directions.

/// Creates a linear NDVI series.
///
/// Value `i` is `start + i * step`.
///
/// # Example
///
/// ```
/// use test_utils::linear_series;
///
/// let series = linear_series(0.2, 0.1, 3);
/// assert_eq!(series.len(), 3);
/// assert!((series[2] - 0.4).abs() < 1e-12);
/// ```
pub fn linear_series(start: f64, step: f64, len: usize) -> Vec<f64> {
    (0..len).map(|i| start + i as f64 * step).collect()
}

/// Creates a series oscillating around `center` with the given amplitude.
///
/// Alternates `center + amplitude`, `center - amplitude`, so any even-length
/// series has mean exactly `center` (up to float rounding).
pub fn oscillating_series(center: f64, amplitude: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            if i % 2 == 0 {
                center + amplitude
            } else {
                center - amplitude
            }
        })
        .collect()
}

/// Creates a seasonal green-up curve: a half sine from `base` to `peak` and back.
pub fn seasonal_series(base: f64, peak: f64, len: usize) -> Vec<f64> {
    if len < 2 {
        return vec![base; len];
    }
    (0..len)
        .map(|i| {
            let phase = i as f64 / (len - 1) as f64 * std::f64::consts::PI;
            base + (peak - base) * phase.sin()
        })
        .collect()
}

/// Creates a binary mask with exactly `cloudy` pixels set to `cloud_value`.
///
/// Cloud pixels are placed first; the remainder are zero.
pub fn binary_mask(total: usize, cloudy: usize, cloud_value: u8) -> Vec<u8> {
    let cloudy = cloudy.min(total);
    let mut mask = vec![cloud_value; cloudy];
    mask.extend(std::iter::repeat(0u8).take(total - cloudy));
    mask
}

/// Creates an SCL band from `(class_code, count)` runs.
///
/// # Example
///
/// ```
/// use test_utils::scl_band;
///
/// // 3 vegetation pixels, 1 high-probability cloud pixel
/// let band = scl_band(&[(4, 3), (9, 1)]);
/// assert_eq!(band, vec![4, 4, 4, 9]);
/// ```
pub fn scl_band(runs: &[(u8, usize)]) -> Vec<u8> {
    runs.iter()
        .flat_map(|&(code, count)| std::iter::repeat(code).take(count))
        .collect()
}

/// Creates a QA band of `total` pixels with the lowest `flagged` values
/// having bit `bit` set.
pub fn qa_band(total: usize, flagged: usize, bit: u8) -> Vec<u32> {
    let flag = 1u32 << bit;
    (0..total)
        .map(|i| if i < flagged { flag } else { 0 })
        .collect()
}
