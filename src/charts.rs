//! The two published charts, built as [`Figure`]s from typed parameters.
//!
//! Both charts put coverage on the x axis in percent. The first shows the breakthrough
//! fraction for a family of effectiveness values against the Provincetown observation and the
//! Massachusetts vaccination rate. The second inverts the relationship and shows which
//! effectiveness the observed breakthrough fraction implies at each coverage level.

use log::debug;
use plotters::style::{BLACK, RED};

use crate::breakthrough::{breakthrough_curves, EFFECTIVENESS_SCENARIOS};
use crate::colormap::{scaled_colors, viridis};
use crate::coverage::{CoverageGrid, DEFAULT_GRID_POINTS};
use crate::error::BreakthroughError;
use crate::figure::{Figure, LineSpec, LineStyle, MarkerSpec, DEFAULT_FIGURE_SIZE};
use crate::implied::{
    implied_effectiveness_curve, implied_effectiveness_points, MARKER_COVERAGE,
    OBSERVED_BREAKTHROUGH,
};
use crate::numeric::to_percent;

pub const B_VS_V_FILE: &str = "B_vs_V_forE.png";
pub const E_VS_V_FILE: &str = "E_vs_V_forB.png";

/// Massachusetts vaccination rate at the time of the Provincetown outbreak.
pub const MA_VACCINATION_RATE: f64 = 0.69;

const COVERAGE_LABEL: &str = "Percentage of Population Vaccinated [V]";
const CURVE_WIDTH: u32 = 2;
const REFERENCE_WIDTH: u32 = 2;
const MARKER_RADIUS: u32 = 10;

fn check_fraction(name: &str, value: f64) -> Result<(), BreakthroughError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(BreakthroughError::InvalidParameter(format!(
            "{name} must be a fraction in [0, 1], got {value}"
        )))
    }
}

fn check_limits(name: &str, (low, high): (f64, f64)) -> Result<(), BreakthroughError> {
    if low.is_finite() && high.is_finite() && low < high {
        Ok(())
    } else {
        Err(BreakthroughError::InvalidParameter(format!(
            "{name} must be finite and increasing, got [{low}, {high}]"
        )))
    }
}

fn check_grid_points(points: usize) -> Result<(), BreakthroughError> {
    if points < 2 {
        return Err(BreakthroughError::InvalidParameter(format!(
            "a coverage grid needs at least 2 points, got {points}"
        )));
    }
    Ok(())
}

fn check_size((width, height): (u32, u32)) -> Result<(), BreakthroughError> {
    if width == 0 || height == 0 {
        return Err(BreakthroughError::InvalidParameter(format!(
            "figure size must be non-zero, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Parameters of the breakthrough fraction chart (`B_vs_V_forE.png`).
#[derive(Debug, Clone, PartialEq)]
pub struct BreakthroughChartParams {
    /// Points of the coverage grid spanning `[0, 1]`.
    pub grid_points: usize,
    /// One curve is drawn per value, colored by its position within the set.
    pub effectiveness: Vec<f64>,
    /// Breakthrough fraction drawn as a horizontal reference line.
    pub observed_breakthrough: f64,
    /// Coverage drawn as a vertical reference line.
    pub reference_coverage: f64,
    /// y limits in percent.
    pub y_limits: (f64, f64),
    pub size: (u32, u32),
}

impl Default for BreakthroughChartParams {
    fn default() -> Self {
        Self {
            grid_points: DEFAULT_GRID_POINTS,
            effectiveness: EFFECTIVENESS_SCENARIOS.to_vec(),
            observed_breakthrough: OBSERVED_BREAKTHROUGH,
            reference_coverage: MA_VACCINATION_RATE,
            y_limits: (-5.0, 105.0),
            size: DEFAULT_FIGURE_SIZE,
        }
    }
}

impl BreakthroughChartParams {
    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` describing the first invalid field.
    pub fn validate(&self) -> Result<(), BreakthroughError> {
        check_grid_points(self.grid_points)?;
        if self.effectiveness.is_empty() {
            return Err("at least one effectiveness value is required".into());
        }
        for &e in &self.effectiveness {
            check_fraction("effectiveness", e)?;
        }
        check_fraction("observed breakthrough fraction", self.observed_breakthrough)?;
        check_fraction("reference coverage", self.reference_coverage)?;
        check_limits("y limits", self.y_limits)?;
        check_size(self.size)
    }
}

/// Parameters of the implied effectiveness chart (`E_vs_V_forB.png`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImpliedChartParams {
    pub grid_start: f64,
    pub grid_stop: f64,
    pub grid_points: usize,
    /// Observed breakthrough fraction the effectiveness is inferred from.
    pub breakthrough: f64,
    /// Coverage levels marked on the curve.
    pub marker_coverage: Vec<f64>,
    /// x limits in percent.
    pub x_limits: (f64, f64),
    /// y limits in percent.
    pub y_limits: (f64, f64),
    pub size: (u32, u32),
}

impl Default for ImpliedChartParams {
    fn default() -> Self {
        Self {
            grid_start: 0.01,
            grid_stop: 0.999_999,
            grid_points: DEFAULT_GRID_POINTS,
            breakthrough: OBSERVED_BREAKTHROUGH,
            marker_coverage: MARKER_COVERAGE.to_vec(),
            x_limits: (70.0, 100.0),
            y_limits: (-5.0, 105.0),
            size: DEFAULT_FIGURE_SIZE,
        }
    }
}

impl ImpliedChartParams {
    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` describing the first invalid field.
    pub fn validate(&self) -> Result<(), BreakthroughError> {
        check_grid_points(self.grid_points)?;
        check_fraction("grid start", self.grid_start)?;
        check_fraction("grid stop", self.grid_stop)?;
        if self.grid_start >= self.grid_stop {
            return Err(BreakthroughError::InvalidParameter(format!(
                "grid start {} must be below grid stop {}",
                self.grid_start, self.grid_stop
            )));
        }
        check_fraction("breakthrough fraction", self.breakthrough)?;
        for &v in &self.marker_coverage {
            check_fraction("marker coverage", v)?;
        }
        check_limits("x limits", self.x_limits)?;
        check_limits("y limits", self.y_limits)?;
        check_size(self.size)
    }
}

fn percent_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|&(x, y)| (to_percent(x), to_percent(y)))
        .collect()
}

/// Breakthrough fraction against coverage for each effectiveness value.
///
/// # Errors
///
/// Returns `BreakthroughError::InvalidParameter` for invalid `params` and
/// `BreakthroughError::Singularity` if a curve hits `v * e = 1`.
pub fn breakthrough_chart(params: &BreakthroughChartParams) -> Result<Figure, BreakthroughError> {
    params.validate()?;
    let grid = CoverageGrid::linspace(0.0, 1.0, params.grid_points)?;
    let curves = breakthrough_curves(&grid, &params.effectiveness)?;
    let colors = scaled_colors(&params.effectiveness);

    let (width, height) = params.size;
    let mut figure = Figure::new(width, height)?;
    figure.set_title(
        "Observed Percentage of Breakthrough Infections [B] vs. Percentage of Population\n\
         Vaccinated [V] for Several Vaccine Effectiveness Values [E]; B = V(1 - E)/(1 - VE)",
    );
    let axes = figure.axes_mut();
    for (curve, color) in curves.iter().zip(colors) {
        axes.line(
            percent_points(&curve.points),
            LineSpec::new(color).width(CURVE_WIDTH).label(format!(
                "Vax Effectiveness [E] = {:.0}%",
                to_percent(curve.effectiveness)
            )),
        );
    }

    let (y_low, y_high) = params.y_limits;
    axes.hline(
        to_percent(params.observed_breakthrough),
        0.0,
        100.0,
        LineSpec::new(BLACK)
            .width(REFERENCE_WIDTH)
            .style(LineStyle::Dashed)
            .label("Provincetown Observation"),
    )
    .vline(
        to_percent(params.reference_coverage),
        y_low,
        y_high,
        LineSpec::new(RED)
            .width(REFERENCE_WIDTH)
            .style(LineStyle::DashDot)
            .label("MA Vaccination Rate"),
    );
    axes.set_xlim(0.0, 100.0)?.set_ylim(y_low, y_high)?;
    axes.set_xlabel(COVERAGE_LABEL)
        .set_ylabel("Percentage of Breakthrough Infections [B]");

    debug!(
        "breakthrough chart: {} curves, {} series",
        curves.len(),
        axes.series().len()
    );
    Ok(figure)
}

/// Effectiveness implied by the observed breakthrough fraction, with marked coverage levels.
///
/// Marker colors come from the viridis scale applied to each marker's own effectiveness.
///
/// # Errors
///
/// Returns `BreakthroughError::InvalidParameter` for invalid `params` and
/// `BreakthroughError::ImpliedSingularity` if the grid reaches zero coverage.
pub fn implied_effectiveness_chart(
    params: &ImpliedChartParams,
) -> Result<Figure, BreakthroughError> {
    params.validate()?;
    let grid = CoverageGrid::linspace(params.grid_start, params.grid_stop, params.grid_points)?;
    let curve = implied_effectiveness_curve(&grid, params.breakthrough)?;
    let markers = implied_effectiveness_points(&params.marker_coverage, params.breakthrough)?;

    let (width, height) = params.size;
    let mut figure = Figure::new(width, height)?;
    figure.set_title(format!(
        "Implied Vaccine Effectiveness [E] vs. Percentage of Population Vaccinated [V]\n\
         for Observed {:.0}% Breakthrough Infection Rate [B]; E = (B - V)/(B*V - V)",
        to_percent(params.breakthrough)
    ));
    let axes = figure.axes_mut();
    axes.line(
        percent_points(&curve.points),
        LineSpec::new(BLACK).width(CURVE_WIDTH),
    );
    for &(v, e) in &markers {
        axes.markers(
            vec![(to_percent(v), to_percent(e))],
            MarkerSpec::new(viridis(e), BLACK, MARKER_RADIUS).label(format!(
                "{:.0}% Vaccinated; Effectiveness = {:.0}%",
                to_percent(v),
                to_percent(e)
            )),
        );
    }
    let (x_low, x_high) = params.x_limits;
    let (y_low, y_high) = params.y_limits;
    axes.set_xlim(x_low, x_high)?.set_ylim(y_low, y_high)?;
    axes.set_xlabel(COVERAGE_LABEL)
        .set_ylabel("Implied Vaccine Effectiveness [E]")
        .set_grid(true);

    debug!("implied effectiveness chart: {} markers", markers.len());
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;
    use crate::figure::Series;
    use crate::implied::implied_effectiveness;

    #[test]
    fn breakthrough_chart_layout() {
        let figure = breakthrough_chart(&BreakthroughChartParams::default()).unwrap();
        assert_eq!(figure.size(), (1200, 600));
        assert_eq!(figure.title().lines().count(), 2);

        let axes = figure.axes();
        assert_eq!(axes.x_range(), 0.0..100.0);
        assert_eq!(axes.y_range(), -5.0..105.0);
        assert!(!axes.grid());
        assert_eq!(axes.x_label(), "Percentage of Population Vaccinated [V]");
        assert_eq!(axes.y_label(), "Percentage of Breakthrough Infections [B]");

        let labels: Vec<&str> = axes.series().iter().filter_map(Series::label).collect();
        assert_eq!(
            labels,
            [
                "Vax Effectiveness [E] = 0%",
                "Vax Effectiveness [E] = 50%",
                "Vax Effectiveness [E] = 60%",
                "Vax Effectiveness [E] = 70%",
                "Vax Effectiveness [E] = 80%",
                "Vax Effectiveness [E] = 90%",
                "Provincetown Observation",
                "MA Vaccination Rate",
            ]
        );
    }

    #[test]
    fn breakthrough_curves_are_in_percent_and_colored_by_rank() {
        let figure = breakthrough_chart(&BreakthroughChartParams::default()).unwrap();
        let series = figure.axes().series();
        let Series::Line { points, spec } = &series[0] else {
            panic!("expected a line");
        };
        assert_eq!(points.len(), DEFAULT_GRID_POINTS);
        assert_eq!(points[0], (0.0, 0.0));
        assert_almost_eq!(points[DEFAULT_GRID_POINTS - 1].1, 100.0, 1e-9);
        assert_eq!(spec.color, viridis(0.0));
        assert_eq!(spec.width, 2);

        let Series::Line { spec, .. } = &series[5] else {
            panic!("expected a line");
        };
        assert_eq!(spec.color, viridis(1.0));
    }

    #[test]
    fn reference_lines() {
        let figure = breakthrough_chart(&BreakthroughChartParams::default()).unwrap();
        let series = figure.axes().series();
        let Series::Line { points, spec } = &series[6] else {
            panic!("expected a line");
        };
        assert_almost_eq!(points[0].1, 74.0, 1e-9);
        assert_eq!((points[0].0, points[1].0), (0.0, 100.0));
        assert_eq!(spec.style, LineStyle::Dashed);
        assert_eq!(spec.color, BLACK);

        let Series::Line { points, spec } = &series[7] else {
            panic!("expected a line");
        };
        assert_almost_eq!(points[0].0, 69.0, 1e-9);
        assert_eq!((points[0].1, points[1].1), (-5.0, 105.0));
        assert_eq!(spec.style, LineStyle::DashDot);
        assert_eq!(spec.color, RED);
    }

    #[test]
    fn single_effectiveness_uses_minimum_color() {
        let params = BreakthroughChartParams {
            effectiveness: vec![0.7],
            ..BreakthroughChartParams::default()
        };
        let figure = breakthrough_chart(&params).unwrap();
        let Series::Line { spec, .. } = &figure.axes().series()[0] else {
            panic!("expected a line");
        };
        assert_eq!(spec.color, viridis(0.0));
    }

    #[test]
    fn certain_effectiveness_is_singular() {
        let params = BreakthroughChartParams {
            effectiveness: vec![0.5, 1.0],
            ..BreakthroughChartParams::default()
        };
        assert!(matches!(
            breakthrough_chart(&params),
            Err(BreakthroughError::Singularity { .. })
        ));
    }

    #[test]
    fn invalid_breakthrough_params() {
        let mut params = BreakthroughChartParams::default();
        params.grid_points = 1;
        assert!(params.validate().is_err());

        let mut params = BreakthroughChartParams::default();
        params.effectiveness.clear();
        assert!(params.validate().is_err());

        let mut params = BreakthroughChartParams::default();
        params.y_limits = (105.0, -5.0);
        assert!(breakthrough_chart(&params).is_err());

        assert!(BreakthroughChartParams::default().validate().is_ok());
    }

    #[test]
    fn implied_chart_layout() {
        let figure = implied_effectiveness_chart(&ImpliedChartParams::default()).unwrap();
        assert!(figure.title().contains("74%"));
        let axes = figure.axes();
        assert!(axes.grid());
        assert_eq!(axes.x_range(), 70.0..100.0);
        assert_eq!(axes.y_range(), -5.0..105.0);
        assert_eq!(axes.y_label(), "Implied Vaccine Effectiveness [E]");
        assert_eq!(axes.series().len(), 6);

        let Series::Line { points, spec } = &axes.series()[0] else {
            panic!("expected the curve first");
        };
        assert_eq!(points.len(), DEFAULT_GRID_POINTS);
        assert!(spec.label.is_none());
        assert_eq!(spec.color, BLACK);
    }

    #[test]
    fn implied_markers() {
        let figure = implied_effectiveness_chart(&ImpliedChartParams::default()).unwrap();
        let labels: Vec<&str> = figure.axes().series()[1..]
            .iter()
            .filter_map(Series::label)
            .collect();
        assert_eq!(
            labels,
            [
                "75% Vaccinated; Effectiveness = 5%",
                "80% Vaccinated; Effectiveness = 29%",
                "85% Vaccinated; Effectiveness = 50%",
                "90% Vaccinated; Effectiveness = 68%",
                "95% Vaccinated; Effectiveness = 85%",
            ]
        );

        let Series::Markers { points, spec } = &figure.axes().series()[5] else {
            panic!("expected a marker");
        };
        assert_almost_eq!(points[0].0, 95.0, 1e-9);
        assert_almost_eq!(points[0].1, 85.02, 1e-2);
        assert_eq!(
            spec.fill,
            viridis(implied_effectiveness(0.95, OBSERVED_BREAKTHROUGH).unwrap())
        );
        assert_eq!(spec.outline, BLACK);
        assert_eq!(spec.radius, 10);
    }

    #[test]
    fn implied_grid_must_avoid_zero_coverage() {
        let params = ImpliedChartParams {
            grid_start: 0.0,
            ..ImpliedChartParams::default()
        };
        assert!(matches!(
            implied_effectiveness_chart(&params),
            Err(BreakthroughError::ImpliedSingularity { .. })
        ));

        let params = ImpliedChartParams {
            grid_start: 0.9,
            grid_stop: 0.5,
            ..ImpliedChartParams::default()
        };
        assert!(params.validate().is_err());
    }
}
