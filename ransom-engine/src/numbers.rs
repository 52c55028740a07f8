//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and cast it to i64, returning 0 for non-finite values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    cast::<f64, i64>(value.round()).unwrap_or(0)
}

/// Clamp a probability-like value into the closed unit interval.
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Map a raw u32 draw onto the open unit interval.
///
/// The half-step offset keeps samples strictly inside (0, 1), so a zero
/// chance can never succeed and a full chance can never fail.
#[must_use]
pub fn unit_sample(sample: u32) -> f64 {
    let denom = f64::from(u32::MAX) + 1.0;
    (f64::from(sample) + 0.5) / denom
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}
