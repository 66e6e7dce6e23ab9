//! Shared test utilities for the ndvi-engine workspace.
//!
//! This crate provides common testing infrastructure including:
//! - NDVI series generators
//! - Pixel classification generators for cloud estimators
//! - Observation fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Asserts a value lies in the closed unit interval.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_unit_interval;
///
/// assert_unit_interval!(0.42);
/// ```
#[macro_export]
macro_rules! assert_unit_interval {
    ($value:expr) => {{
        let value: f64 = $value as f64;
        if !(0.0..=1.0).contains(&value) {
            panic!("assertion failed: `{:?}` is outside [0, 1]", value);
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_unit_interval_passes() {
        assert_unit_interval!(0.0);
        assert_unit_interval!(1.0);
        assert_unit_interval!(0.5);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn test_assert_unit_interval_fails() {
        assert_unit_interval!(1.01);
    }
}
