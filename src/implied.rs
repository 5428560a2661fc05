//! Implied vaccine effectiveness: the effectiveness that would produce an observed breakthrough
//! fraction `b` at coverage `v`. Solving `R(v, e) = b` for `e` gives
//!
//! ```text
//! E(v, b) = (b - v) / (b v - v)
//! ```

use log::{debug, trace};

use crate::coverage::CoverageGrid;
use crate::error::BreakthroughError;
use crate::numeric::{checked_ratio, ensure_finite};

/// Share of Provincetown cases that were breakthrough infections.
pub const OBSERVED_BREAKTHROUGH: f64 = 0.74;

/// Coverage levels at which the implied effectiveness is marked.
pub const MARKER_COVERAGE: [f64; 5] = [0.75, 0.80, 0.85, 0.90, 0.95];

/// Effectiveness implied by observing `breakthrough` at `coverage`.
///
/// # Errors
///
/// Returns `BreakthroughError::ImpliedSingularity` when `breakthrough * coverage - coverage`
/// vanishes (zero coverage, or a breakthrough fraction of one).
pub fn implied_effectiveness(coverage: f64, breakthrough: f64) -> Result<f64, BreakthroughError> {
    ensure_finite("coverage", coverage)?;
    ensure_finite("breakthrough fraction", breakthrough)?;
    checked_ratio(
        breakthrough - coverage,
        breakthrough * coverage - coverage,
        || BreakthroughError::ImpliedSingularity {
            coverage,
            breakthrough,
        },
    )
}

/// Implied effectiveness over a coverage grid for one observed breakthrough fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpliedEffectivenessCurve {
    pub breakthrough: f64,
    /// `(coverage, implied effectiveness)` pairs in grid order.
    pub points: Vec<(f64, f64)>,
}

/// # Errors
///
/// Fails on the first grid point where the formula is singular.
pub fn implied_effectiveness_curve(
    grid: &CoverageGrid,
    breakthrough: f64,
) -> Result<ImpliedEffectivenessCurve, BreakthroughError> {
    let points = implied_effectiveness_points(grid, breakthrough)?;
    debug!(
        "implied effectiveness curve for breakthrough fraction {breakthrough}: {} points",
        points.len()
    );
    Ok(ImpliedEffectivenessCurve {
        breakthrough,
        points,
    })
}

/// Implied effectiveness at arbitrary coverage levels, returned as `(coverage, effectiveness)`.
///
/// # Errors
///
/// Fails on the first coverage level where the formula is singular.
pub fn implied_effectiveness_points(
    coverages: &[f64],
    breakthrough: f64,
) -> Result<Vec<(f64, f64)>, BreakthroughError> {
    coverages
        .iter()
        .map(|&v| {
            let e = implied_effectiveness(v, breakthrough)?;
            trace!("coverage {v}: implied effectiveness {e}");
            Ok((v, e))
        })
        .collect()
}
