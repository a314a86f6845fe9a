//! Division guards
//!
//! Every stage of the pipeline divides by a quantity that is positive by
//! construction (output, summed weights, price distances). These helpers are
//! the only place where a denominator is compared against zero.

/// Smallest denominator treated as non-zero.
///
/// Used when a price distance collapses: a bid sitting exactly on the floor,
/// an ask exactly on the ceiling, or a degenerate price range.
pub const EPSILON: f64 = 1e-9;

/// `numerator / denominator`, or `NaN` when the denominator is not positive.
///
/// `NaN` is the "undefined" marker carried by intensities and benchmarks.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    ratio_or(numerator, denominator, f64::NAN)
}

/// `numerator / denominator`, or `fallback` when the denominator is not
/// positive or the result is not finite.
pub fn ratio_or(numerator: f64, denominator: f64, fallback: f64) -> f64 {
    if denominator.is_nan() || denominator <= 0.0 || denominator.is_infinite() {
        return fallback;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Denominator clamped away from zero.
pub fn non_zero(denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        EPSILON
    } else {
        denominator
    }
}
