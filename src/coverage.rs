//! The coverage grid: the fractions of the population vaccinated at which curves are evaluated.

use std::ops::Deref;

use crate::error::BreakthroughError;
use crate::numeric::linspace;

/// Number of grid points used by both charts.
pub const DEFAULT_GRID_POINTS: usize = 50;

/// An ordered, immutable sequence of coverage fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageGrid {
    values: Vec<f64>,
}

impl CoverageGrid {
    /// Builds a grid from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` if the grid is empty, contains a value
    /// outside `[0, 1]` (including NaN) or is not sorted in non-decreasing order.
    pub fn new(values: Vec<f64>) -> Result<Self, BreakthroughError> {
        if values.is_empty() {
            return Err("coverage grid must not be empty".into());
        }
        if let Some(value) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(BreakthroughError::InvalidParameter(format!(
                "coverage {value} is outside [0, 1]"
            )));
        }
        if values.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err("coverage grid must be sorted in non-decreasing order".into());
        }
        Ok(Self { values })
    }

    /// `points` evenly spaced coverage values from `start` to `stop` inclusive.
    ///
    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` if `start > stop`, either bound lies outside
    /// `[0, 1]` or `points` is zero.
    pub fn linspace(start: f64, stop: f64, points: usize) -> Result<Self, BreakthroughError> {
        if start > stop {
            return Err(BreakthroughError::InvalidParameter(format!(
                "coverage grid start {start} exceeds stop {stop}"
            )));
        }
        Self::new(linspace(start, stop, points))
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Deref for CoverageGrid {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.values
    }
}
