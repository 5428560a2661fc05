//! Maps scalars to colors on the viridis scale.

use plotters::style::colors::colormaps::ViridisRGB;
use plotters::style::RGBColor;

/// Linearly rescales `value` from `[min, max]` to `[0, 1]`.
///
/// A degenerate range (`max == min`) maps everything to `0.0`.
#[must_use]
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        return 0.0;
    }
    (value - min) / span
}

/// Viridis color for `t`, clamped to `[0, 1]`. NaN maps to the minimum-end color.
#[must_use]
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    ViridisRGB::get_color(t)
}

/// Colors for each of `values`, normalized against the set's own minimum and maximum.
#[must_use]
pub fn scaled_colors(values: &[f64]) -> Vec<RGBColor> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|&value| viridis(normalize(value, min, max)))
        .collect()
}
