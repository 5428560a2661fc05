//! Rasterizes a [`Figure`] with plotters and writes it as a transparent PNG.
//!
//! The bitmap backend only produces opaque RGB pixels, so every figure is drawn twice: once on
//! white and once on black. A pixel that is identical in both renderings is opaque; one that
//! follows the background is transparent; anything in between (antialiased edges, text) gets
//! the alpha that explains the difference. The result is then cropped to its visible content.

use std::path::Path;

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};
use log::{debug, info, trace};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::BreakthroughError;
use crate::figure::{Figure, LineSpec, LineStyle, MarkerSpec, Series};
use crate::output::validate_chart_path;

const FONT_FAMILY: &str = "sans-serif";
const TITLE_FONT_SIZE: u32 = 22;
const TITLE_LINE_HEIGHT: u32 = 28;
const LABEL_FONT_SIZE: u32 = 22;
const TICK_FONT_SIZE: u32 = 16;
const LEGEND_FONT_SIZE: u32 = 19;
const CHART_MARGIN: u32 = 20;
const X_LABEL_AREA_SIZE: u32 = 60;
const Y_LABEL_AREA_SIZE: u32 = 80;
const LEGEND_SWATCH_LENGTH: i32 = 24;

/// Pixels of transparent border kept around the content when cropping.
pub const TIGHT_PADDING: u32 = 10;

/// On/off lengths, in multiples of the line width, of a patterned line.
fn dash_pattern(style: LineStyle) -> Option<&'static [f64]> {
    match style {
        LineStyle::Solid => None,
        LineStyle::Dashed => Some(&[3.7, 1.6]),
        LineStyle::DashDot => Some(&[6.4, 1.6, 1.0, 1.6]),
    }
}

/// Splits a polyline into its visible segments for an on/off `pattern` given in pixels.
///
/// `scale` converts data units to pixels along each axis. Pattern lengths alternate between
/// drawn and skipped, starting with drawn, and repeat along the whole path.
#[must_use]
pub fn dash_segments(
    points: &[(f64, f64)],
    pattern: &[f64],
    scale: (f64, f64),
) -> Vec<Vec<(f64, f64)>> {
    if pattern.is_empty() || pattern.iter().any(|&len| len <= 0.0) {
        return vec![points.to_vec()];
    }
    let mut segments = Vec::new();
    let Some(&first) = points.first() else {
        return segments;
    };
    let mut index = 0;
    let mut left = pattern[0];
    let mut current = vec![first];
    for pair in points.windows(2) {
        let (mut start, end) = (pair[0], pair[1]);
        loop {
            let (dx, dy) = (end.0 - start.0, end.1 - start.1);
            let length = (dx * scale.0).hypot(dy * scale.1);
            if length <= left {
                left -= length;
                if index % 2 == 0 {
                    current.push(end);
                }
                break;
            }
            let t = left / length;
            start = (start.0 + dx * t, start.1 + dy * t);
            if index % 2 == 0 {
                current.push(start);
                segments.push(std::mem::take(&mut current));
            } else {
                current = vec![start];
            }
            index = (index + 1) % pattern.len();
            left = pattern[index];
        }
    }
    if index % 2 == 0 && current.len() > 1 {
        segments.push(current);
    }
    segments
}

/// Clips a polyline to the rectangle `x_range` x `y_range`, returning the runs inside it.
#[must_use]
pub fn clip_polyline(
    points: &[(f64, f64)],
    x_range: &std::ops::Range<f64>,
    y_range: &std::ops::Range<f64>,
) -> Vec<Vec<(f64, f64)>> {
    let inside = |p: (f64, f64)| {
        (x_range.start..=x_range.end).contains(&p.0) && (y_range.start..=y_range.end).contains(&p.1)
    };
    let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    if points.len() == 1 && inside(points[0]) {
        return vec![points.to_vec()];
    }
    for pair in points.windows(2) {
        let Some((a, b)) = clip_segment(pair[0], pair[1], x_range, y_range) else {
            if current.len() > 1 {
                runs.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        };
        if current.last() != Some(&a) {
            if current.len() > 1 {
                runs.push(std::mem::take(&mut current));
            }
            current = vec![a];
        }
        current.push(b);
        // The segment left the rectangle; the next one starts a new run.
        if b != pair[1] {
            runs.push(std::mem::take(&mut current));
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}

/// Liang-Barsky clipping of one segment.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    x_range: &std::ops::Range<f64>,
    y_range: &std::ops::Range<f64>,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, a.0 - x_range.start),
        (dx, x_range.end - a.0),
        (-dy, a.1 - y_range.start),
        (dy, y_range.end - a.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    let at = |t: f64| {
        if t == 0.0 {
            a
        } else if t == 1.0 {
            b
        } else {
            (a.0 + dx * t, a.1 + dy * t)
        }
    };
    Some((at(t0), at(t1)))
}

type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_title(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    lines: &[&str],
) -> Result<(), BreakthroughError> {
    let (width, _) = area.dim_in_pixel();
    let style = TextStyle::from((FONT_FAMILY, TITLE_FONT_SIZE, FontStyle::Bold).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (i, line) in lines.iter().enumerate() {
        let y = (TITLE_LINE_HEIGHT / 4 + i as u32 * TITLE_LINE_HEIGHT) as i32;
        area.draw(&Text::new(*line, (width as i32 / 2, y), &style))?;
    }
    Ok(())
}

fn draw_line<'a>(
    chart: &mut Chart<'a, 'a>,
    points: &[(f64, f64)],
    spec: &LineSpec,
    scale: (f64, f64),
) -> Result<(), BreakthroughError> {
    let x_range = chart.x_range();
    let y_range = chart.y_range();
    let style = spec.color.stroke_width(spec.width);
    let runs = clip_polyline(points, &x_range, &y_range);
    let pattern = dash_pattern(spec.style);
    let segments: Vec<Vec<(f64, f64)>> = match pattern {
        None => runs,
        Some(pattern) => {
            let width = f64::from(spec.width.max(1));
            let pixels: Vec<f64> = pattern.iter().map(|len| len * width).collect();
            runs.iter()
                .flat_map(|run| dash_segments(run, &pixels, scale))
                .collect()
        }
    };
    trace!(
        "drawing {:?} line with {} points as {} segments",
        spec.style,
        points.len(),
        segments.len()
    );
    let annotation =
        chart.draw_series(segments.into_iter().map(|segment| PathElement::new(segment, style)))?;
    if let Some(label) = &spec.label {
        annotation.label(label.clone());
        match pattern {
            None => {
                annotation.legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + LEGEND_SWATCH_LENGTH, y)], style)
                });
            }
            Some(pattern) => {
                let width = f64::from(spec.width.max(1));
                let dash = (pattern[0] * width).round() as i32;
                let gap = (pattern[1] * width).round() as i32;
                annotation.legend(move |(x, y)| {
                    DashedPathElement::new(
                        vec![(x, y), (x + LEGEND_SWATCH_LENGTH, y)],
                        dash,
                        gap,
                        style,
                    )
                });
            }
        }
    }
    Ok(())
}

/// Points inside the axes, limits included.
fn visible_points(
    points: &[(f64, f64)],
    x_range: &std::ops::Range<f64>,
    y_range: &std::ops::Range<f64>,
) -> Vec<(f64, f64)> {
    points
        .iter()
        .copied()
        .filter(|p| {
            (x_range.start..=x_range.end).contains(&p.0)
                && (y_range.start..=y_range.end).contains(&p.1)
        })
        .collect()
}

fn draw_markers<'a>(
    chart: &mut Chart<'a, 'a>,
    points: &[(f64, f64)],
    spec: &MarkerSpec,
) -> Result<(), BreakthroughError> {
    let visible = visible_points(points, &chart.x_range(), &chart.y_range());
    let radius = spec.radius;
    let fill = spec.fill.filled();
    let outline = spec.outline.stroke_width(2);

    let annotation = chart.draw_series(visible.iter().map(|&p| Circle::new(p, radius, fill)))?;
    if let Some(label) = &spec.label {
        let offset = radius as i32;
        annotation.label(label.clone()).legend(move |(x, y)| {
            EmptyElement::at((x + offset, y))
                + Circle::new((0, 0), radius, fill)
                + Circle::new((0, 0), radius, outline)
        });
    }
    chart.draw_series(visible.iter().map(|&p| Circle::new(p, radius, outline)))?;
    Ok(())
}

fn draw_figure(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    figure: &Figure,
) -> Result<(), BreakthroughError> {
    let axes = figure.axes();
    let title_lines: Vec<&str> = figure.title().lines().collect();
    let title_height = if title_lines.is_empty() {
        0
    } else {
        title_lines.len() as u32 * TITLE_LINE_HEIGHT + TITLE_LINE_HEIGHT / 2
    };
    let (title_area, plot_area) = root.split_vertically(title_height);
    draw_title(&title_area, &title_lines)?;

    let x_range = axes.x_range();
    let y_range = axes.y_range();
    let mut chart = ChartBuilder::on(&plot_area)
        .margin(CHART_MARGIN)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(axes.x_label())
            .y_desc(axes.y_label())
            .axis_desc_style((FONT_FAMILY, LABEL_FONT_SIZE, FontStyle::Bold))
            .label_style((FONT_FAMILY, TICK_FONT_SIZE));
        if axes.grid() {
            mesh.bold_line_style(BLACK.mix(0.2))
                .light_line_style(TRANSPARENT);
        } else {
            mesh.disable_mesh();
        }
        mesh.draw()?;
    }

    let (pixel_x, pixel_y) = chart.plotting_area().get_pixel_range();
    let scale = (
        f64::from(pixel_x.end - pixel_x.start) / (x_range.end - x_range.start),
        f64::from(pixel_y.end - pixel_y.start) / (y_range.end - y_range.start),
    );
    debug!("plotting area {pixel_x:?} x {pixel_y:?}, scale {scale:?} px per unit");

    for series in axes.series() {
        match series {
            Series::Line { points, spec } => draw_line(&mut chart, points, spec, scale)?,
            Series::Markers { points, spec } => draw_markers(&mut chart, points, spec)?,
        }
    }

    if axes.has_legend() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .label_font((FONT_FAMILY, LEGEND_FONT_SIZE))
            .background_style(WHITE.filled())
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Rasterizes `figure` onto an opaque `background`.
///
/// # Errors
///
/// Returns `BreakthroughError::DrawingError` if plotters fails, e.g. when no font is available.
pub fn render_rgb(figure: &Figure, background: RGBColor) -> Result<RgbImage, BreakthroughError> {
    let (width, height) = figure.size();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&background)?;
        draw_figure(&root, figure)?;
        root.present()?;
    }
    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        BreakthroughError::DrawingError(format!("bitmap buffer does not match {width}x{height}"))
    })
}

/// Recovers an RGBA image from the same drawing rendered on white and on black.
///
/// # Errors
///
/// Returns `BreakthroughError::DrawingError` if the two renderings differ in size.
pub fn compose_transparent(
    on_white: &RgbImage,
    on_black: &RgbImage,
) -> Result<RgbaImage, BreakthroughError> {
    if on_white.dimensions() != on_black.dimensions() {
        return Err(BreakthroughError::DrawingError(format!(
            "renderings differ in size: {:?} vs {:?}",
            on_white.dimensions(),
            on_black.dimensions()
        )));
    }
    let (width, height) = on_white.dimensions();
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let Rgb(white) = *on_white.get_pixel(x, y);
        let Rgb(black) = *on_black.get_pixel(x, y);
        let alpha = (0..3)
            .map(|c| 255 - (i32::from(white[c]) - i32::from(black[c])).clamp(0, 255))
            .max()
            .unwrap_or(0);
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let unpremultiply = |c: u8| ((i32::from(c) * 255 + alpha / 2) / alpha).min(255) as u8;
        Rgba([
            unpremultiply(black[0]),
            unpremultiply(black[1]),
            unpremultiply(black[2]),
            alpha as u8,
        ])
    }))
}

/// Crops `image` to the bounding box of its non-transparent pixels plus `padding`.
///
/// A fully transparent image is returned unchanged.
#[must_use]
pub fn crop_to_content(image: &RgbaImage, padding: u32) -> RgbaImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return image.clone();
    };
    let (width, height) = image.dimensions();
    let left = x0.saturating_sub(padding);
    let top = y0.saturating_sub(padding);
    let right = (x1 + padding).min(width - 1);
    let bottom = (y1 + padding).min(height - 1);
    debug!("cropping {width}x{height} to ({left}, {top})..=({right}, {bottom})");
    imageops::crop_imm(image, left, top, right - left + 1, bottom - top + 1).to_image()
}

/// Renders `figure` to a tightly cropped image with a transparent background.
///
/// # Errors
///
/// Propagates any rendering failure.
pub fn render(figure: &Figure) -> Result<RgbaImage, BreakthroughError> {
    let on_white = render_rgb(figure, WHITE)?;
    let on_black = render_rgb(figure, BLACK)?;
    let composed = compose_transparent(&on_white, &on_black)?;
    Ok(crop_to_content(&composed, TIGHT_PADDING))
}

/// Renders `figure` and writes it to `path` as a PNG, replacing any existing file.
///
/// # Errors
///
/// Path validation and rendering failures are returned as is; I/O failures name the
/// attempted path.
pub fn save_figure(figure: &Figure, path: &Path) -> Result<(), BreakthroughError> {
    validate_chart_path(path, true)?;
    let image = render(figure)?;
    image.save(path).map_err(|error| match error {
        image::ImageError::IoError(source) => BreakthroughError::with_path(path, source),
        other => BreakthroughError::ImageError(other),
    })?;
    info!(
        "saved {}x{} chart to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}
