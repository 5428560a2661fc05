//! Floating point helpers shared by the curve computations. The comparison helpers are thin
//! wrappers around methods from the approx crate.

use approx::AbsDiffEq;

use crate::error::BreakthroughError;

/// Targeted accuracy instantiated over `f64`
pub const ACC: f64 = 10e-11;

/// Denominators with a magnitude below this are treated as singular.
pub const SINGULARITY_EPSILON: f64 = 1e-12;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// `n` evenly spaced values over `[start, stop]`, both endpoints included.
///
/// A single point yields `[start]`; zero points yield an empty vector.
#[must_use]
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| {
                    // Pin the last point so rounding never overshoots `stop`.
                    if i == n - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Scales a fraction to a percentage.
#[must_use]
pub fn to_percent(fraction: f64) -> f64 {
    fraction * 100.0
}

/// Divides `numerator` by `denominator`, returning the error built by `singular` if the
/// denominator vanishes.
pub(crate) fn checked_ratio(
    numerator: f64,
    denominator: f64,
    singular: impl FnOnce() -> BreakthroughError,
) -> Result<f64, BreakthroughError> {
    if denominator.abs() < SINGULARITY_EPSILON {
        return Err(singular());
    }
    Ok(numerator / denominator)
}

/// Rejects NaN and infinite inputs by name.
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<(), BreakthroughError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BreakthroughError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}
