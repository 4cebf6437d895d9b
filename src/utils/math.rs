//! # Game Mathematics
//!
//! Small numeric helpers used for balancing calculations.

use crate::constants::EPSILON;

/// Divides `numerator` by `denominator`, returning `default` when the
/// denominator is zero.
///
/// # Examples
///
/// ```
/// use bastion::ratio_or;
///
/// assert_eq!(ratio_or(3.0, 4.0, 1.0), 0.75);
/// assert_eq!(ratio_or(0.0, 0.0, 1.0), 1.0);
/// ```
pub fn ratio_or(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator.abs() <= EPSILON {
        default
    } else {
        numerator / denominator
    }
}

/// Floors a non-negative amount for display. Negative or non-finite input maps to 0.
pub fn floor_display(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

/// Clamps `value` into `[min, max]`, mapping NaN to `min`.
pub fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Sanitises a tick delta: negative and non-finite deltas become 0.
pub fn sanitize_delta(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Arithmetic mean of the samples, `None` when empty.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Whether two floats are equal within [`EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}
