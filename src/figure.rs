//! A declarative description of a chart.
//!
//! A [`Figure`] owns one [`Axes`], which records the series drawn on it together with its
//! limits and labels. Nothing is rasterized until the figure is handed to
//! [`render`](crate::render); every drawing call names the figure it draws on.

use std::ops::Range;

use plotters::style::RGBColor;

use crate::error::BreakthroughError;
use crate::numeric::ensure_finite;

/// Width and height in pixels of a 12 x 6 inch figure at 100 dpi.
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (1200, 600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
}

/// How a line series is stroked and labeled.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub color: RGBColor,
    pub width: u32,
    pub style: LineStyle,
    pub label: Option<String>,
}

impl LineSpec {
    #[must_use]
    pub fn new(color: RGBColor) -> Self {
        Self {
            color,
            width: 1,
            style: LineStyle::Solid,
            label: None,
        }
    }

    #[must_use]
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    #[must_use]
    pub fn style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A filled, outlined circular marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub fill: RGBColor,
    pub outline: RGBColor,
    pub radius: u32,
    pub label: Option<String>,
}

impl MarkerSpec {
    #[must_use]
    pub fn new(fill: RGBColor, outline: RGBColor, radius: u32) -> Self {
        Self {
            fill,
            outline,
            radius,
            label: None,
        }
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Line {
        points: Vec<(f64, f64)>,
        spec: LineSpec,
    },
    Markers {
        points: Vec<(f64, f64)>,
        spec: MarkerSpec,
    },
}

impl Series {
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        match self {
            Series::Line { points, .. } | Series::Markers { points, .. } => points,
        }
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Series::Line { spec, .. } => spec.label.as_deref(),
            Series::Markers { spec, .. } => spec.label.as_deref(),
        }
    }
}

/// One coordinate system and everything drawn in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    x_limits: Option<Range<f64>>,
    y_limits: Option<Range<f64>>,
    x_label: String,
    y_label: String,
    grid: bool,
    series: Vec<Series>,
}

fn validate_limits(axis: &str, low: f64, high: f64) -> Result<Range<f64>, BreakthroughError> {
    ensure_finite(axis, low)?;
    ensure_finite(axis, high)?;
    if low >= high {
        return Err(BreakthroughError::InvalidParameter(format!(
            "{axis} limits must be increasing, got [{low}, {high}]"
        )));
    }
    Ok(low..high)
}

/// Smallest range covering `values`, widened when all values coincide.
fn data_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (low, high) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if low > high {
        0.0..1.0
    } else if low == high {
        (low - 0.5)..(high + 0.5)
    } else {
        low..high
    }
}

impl Axes {
    /// Draws a polyline through `points` (data coordinates).
    pub fn line(&mut self, points: Vec<(f64, f64)>, spec: LineSpec) -> &mut Self {
        self.series.push(Series::Line { points, spec });
        self
    }

    /// Draws a horizontal line at `y` from `x_start` to `x_end`.
    pub fn hline(&mut self, y: f64, x_start: f64, x_end: f64, spec: LineSpec) -> &mut Self {
        self.line(vec![(x_start, y), (x_end, y)], spec)
    }

    /// Draws a vertical line at `x` from `y_start` to `y_end`.
    pub fn vline(&mut self, x: f64, y_start: f64, y_end: f64, spec: LineSpec) -> &mut Self {
        self.line(vec![(x, y_start), (x, y_end)], spec)
    }

    pub fn markers(&mut self, points: Vec<(f64, f64)>, spec: MarkerSpec) -> &mut Self {
        self.series.push(Series::Markers { points, spec });
        self
    }

    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` unless `low < high` and both are finite.
    pub fn set_xlim(&mut self, low: f64, high: f64) -> Result<&mut Self, BreakthroughError> {
        self.x_limits = Some(validate_limits("x", low, high)?);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` unless `low < high` and both are finite.
    pub fn set_ylim(&mut self, low: f64, high: f64) -> Result<&mut Self, BreakthroughError> {
        self.y_limits = Some(validate_limits("y", low, high)?);
        Ok(self)
    }

    pub fn set_xlabel(&mut self, label: impl Into<String>) -> &mut Self {
        self.x_label = label.into();
        self
    }

    pub fn set_ylabel(&mut self, label: impl Into<String>) -> &mut Self {
        self.y_label = label.into();
        self
    }

    pub fn set_grid(&mut self, grid: bool) -> &mut Self {
        self.grid = grid;
        self
    }

    /// The x limits, or the extent of the data when none were set.
    #[must_use]
    pub fn x_range(&self) -> Range<f64> {
        self.x_limits.clone().unwrap_or_else(|| {
            data_range(self.series.iter().flat_map(|s| s.points().iter().map(|p| p.0)))
        })
    }

    /// The y limits, or the extent of the data when none were set.
    #[must_use]
    pub fn y_range(&self) -> Range<f64> {
        self.y_limits.clone().unwrap_or_else(|| {
            data_range(self.series.iter().flat_map(|s| s.points().iter().map(|p| p.1)))
        })
    }

    #[must_use]
    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    #[must_use]
    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    #[must_use]
    pub fn grid(&self) -> bool {
        self.grid
    }

    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// True if any series carries a legend label.
    #[must_use]
    pub fn has_legend(&self) -> bool {
        self.series.iter().any(|s| s.label().is_some())
    }
}

/// A chart: a pixel size, a (possibly multi-line) title and one set of axes.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    width: u32,
    height: u32,
    title: String,
    axes: Axes,
}

impl Default for Figure {
    fn default() -> Self {
        let (width, height) = DEFAULT_FIGURE_SIZE;
        Self {
            width,
            height,
            title: String::new(),
            axes: Axes::default(),
        }
    }
}

impl Figure {
    /// # Errors
    ///
    /// Returns `BreakthroughError::InvalidParameter` if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, BreakthroughError> {
        if width == 0 || height == 0 {
            return Err(BreakthroughError::InvalidParameter(format!(
                "figure size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut Axes {
        &mut self.axes
    }
}
