//! The breakthrough fraction: the share of infections that occur in vaccinated people.
//!
//! Under homogeneous mixing, with a fraction `v` of the population vaccinated and a vaccine
//! that reduces the relative risk of infection by `e`, the fraction of infections among the
//! vaccinated is
//!
//! ```text
//! R(v, e) = v (1 - e) / (1 - v e)
//! ```

use log::{debug, trace};

use crate::coverage::CoverageGrid;
use crate::error::BreakthroughError;
use crate::numeric::{ensure_finite, SINGULARITY_EPSILON};

/// Vaccine effectiveness scenarios drawn as one curve each.
pub const EFFECTIVENESS_SCENARIOS: [f64; 6] = [0.0, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Fraction of infections among the vaccinated at `coverage` for a vaccine with the given
/// `effectiveness`.
///
/// # Errors
///
/// Returns `BreakthroughError::Singularity` if `coverage * effectiveness` reaches one, and
/// `BreakthroughError::InvalidParameter` for non-finite inputs, coverage outside `[0, 1]` or
/// effectiveness above one. Negative effectiveness (a vaccine that raises the risk) is allowed.
pub fn breakthrough_fraction(coverage: f64, effectiveness: f64) -> Result<f64, BreakthroughError> {
    ensure_finite("coverage", coverage)?;
    ensure_finite("effectiveness", effectiveness)?;
    check_unit_interval("coverage", coverage)?;
    if is_singular(coverage, effectiveness) {
        return Err(BreakthroughError::Singularity {
            coverage,
            effectiveness,
        });
    }
    if effectiveness > 1.0 {
        return Err(BreakthroughError::InvalidParameter(format!(
            "effectiveness must be at most 1, got {effectiveness}"
        )));
    }
    Ok(coverage * (1.0 - effectiveness) / (1.0 - coverage * effectiveness))
}

// Once `v e >= 1` the denominator is zero or negative.
fn is_singular(coverage: f64, effectiveness: f64) -> bool {
    1.0 - coverage * effectiveness <= SINGULARITY_EPSILON
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), BreakthroughError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BreakthroughError::InvalidParameter(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

/// The breakthrough fraction over a coverage grid for one effectiveness value.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakthroughCurve {
    pub effectiveness: f64,
    /// `(coverage, breakthrough fraction)` pairs in grid order.
    pub points: Vec<(f64, f64)>,
}

impl BreakthroughCurve {
    pub fn fractions(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, r)| r)
    }
}

/// Evaluates the breakthrough fraction at every point of `grid`.
///
/// # Errors
///
/// Fails before evaluating anything if `effectiveness >= 1 / v` for some grid coverage `v`; the
/// error names the first such `(coverage, effectiveness)` pair. Otherwise fails on the first
/// invalid point.
pub fn breakthrough_curve(
    grid: &CoverageGrid,
    effectiveness: f64,
) -> Result<BreakthroughCurve, BreakthroughError> {
    ensure_finite("effectiveness", effectiveness)?;
    if let Some(&coverage) = grid.iter().find(|&&v| is_singular(v, effectiveness)) {
        return Err(BreakthroughError::Singularity {
            coverage,
            effectiveness,
        });
    }
    let points = grid
        .iter()
        .map(|&v| breakthrough_fraction(v, effectiveness).map(|r| (v, r)))
        .collect::<Result<Vec<_>, _>>()?;
    trace!(
        "breakthrough curve for effectiveness {effectiveness}: {} points",
        points.len()
    );
    Ok(BreakthroughCurve {
        effectiveness,
        points,
    })
}

/// One curve per effectiveness value, in the order given.
///
/// # Errors
///
/// Fails fast on the first singular configuration.
pub fn breakthrough_curves(
    grid: &CoverageGrid,
    effectiveness_set: &[f64],
) -> Result<Vec<BreakthroughCurve>, BreakthroughError> {
    debug!(
        "computing {} breakthrough curves over {} coverage points",
        effectiveness_set.len(),
        grid.len()
    );
    effectiveness_set
        .iter()
        .map(|&e| breakthrough_curve(grid, e))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use crate::coverage::DEFAULT_GRID_POINTS;

    fn unit_grid() -> CoverageGrid {
        CoverageGrid::linspace(0.0, 1.0, DEFAULT_GRID_POINTS).unwrap()
    }

    #[test]
    fn zero_coverage_has_no_breakthroughs() {
        for e in [0.0, 0.3, 0.9, 0.99] {
            assert_eq!(breakthrough_fraction(0.0, e).unwrap(), 0.0);
        }
    }

    #[test]
    fn ineffective_vaccine_tracks_coverage() {
        for v in [0.0, 0.1, 0.69, 1.0] {
            assert_almost_eq!(breakthrough_fraction(v, 0.0).unwrap(), v, 1e-12);
        }
    }

    #[test]
    fn massachusetts_scenario() {
        // 69% coverage with an 80% effective vaccine.
        let r = breakthrough_fraction(0.69, 0.8).unwrap();
        assert_almost_eq!(r, 0.138 / 0.448, 1e-12);
        assert_almost_eq!(r, 0.3080, 1e-4);
        assert!(r < 0.74);
    }

    #[test]
    fn monotone_in_coverage() {
        let grid = unit_grid();
        for curve in breakthrough_curves(&grid, &EFFECTIVENESS_SCENARIOS).unwrap() {
            let fractions: Vec<f64> = curve.fractions().collect();
            assert!(fractions.windows(2).all(|w| w[1] >= w[0]));
            assert_eq!(fractions[0], 0.0);
            assert_almost_eq!(*fractions.last().unwrap(), 1.0, 1e-12);
        }
    }

    #[test]
    fn curve_family_matches_scenarios() {
        let curves = breakthrough_curves(&unit_grid(), &EFFECTIVENESS_SCENARIOS).unwrap();
        assert_eq!(curves.len(), EFFECTIVENESS_SCENARIOS.len());
        for (curve, e) in curves.iter().zip(EFFECTIVENESS_SCENARIOS) {
            assert_eq!(curve.effectiveness, e);
            assert_eq!(curve.points.len(), DEFAULT_GRID_POINTS);
        }
    }

    #[test]
    fn perfect_vaccine_at_full_coverage_is_singular() {
        match breakthrough_curve(&unit_grid(), 1.0) {
            Err(BreakthroughError::Singularity {
                coverage,
                effectiveness,
            }) => {
                assert_eq!(coverage, 1.0);
                assert_eq!(effectiveness, 1.0);
            }
            other => panic!("expected a singularity, got {other:?}"),
        }
    }

    #[test]
    fn effectiveness_beyond_inverse_coverage_fails_fast() {
        // 1.2 * v reaches one at v = 5/6; the first grid point past it is 41/49.
        match breakthrough_curve(&unit_grid(), 1.2) {
            Err(BreakthroughError::Singularity {
                coverage,
                effectiveness,
            }) => {
                assert_almost_eq!(coverage, 41.0 / 49.0, 1e-12);
                assert_almost_eq!(coverage, 0.8367, 1e-4);
                assert_eq!(effectiveness, 1.2);
            }
            other => panic!("expected a singularity, got {other:?}"),
        }
    }

    #[test]
    fn product_above_one_is_singular() {
        assert!(matches!(
            breakthrough_fraction(0.8, 1.5),
            Err(BreakthroughError::Singularity { .. })
        ));
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        for (v, e) in [(1.5, 0.2), (-0.1, 0.5), (0.5, 1.5)] {
            assert!(
                matches!(
                    breakthrough_fraction(v, e),
                    Err(BreakthroughError::InvalidParameter(_))
                ),
                "({v}, {e}) should be rejected"
            );
        }
    }

    #[test]
    fn harmful_vaccine_stays_a_fraction() {
        let r = breakthrough_fraction(0.5, -1.0).unwrap();
        assert_almost_eq!(r, 2.0 / 3.0, 1e-12);
    }

    #[test]
    fn non_finite_inputs_are_rejected() {
        assert!(matches!(
            breakthrough_fraction(f64::NAN, 0.5),
            Err(BreakthroughError::InvalidParameter(_))
        ));
    }
}
