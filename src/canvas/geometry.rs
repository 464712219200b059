//! Lowering of operation parameters into backend-neutral `kurbo` paths.
//!
//! Validation of degenerate geometry lives here so every backend rejects the same inputs.

use kurbo::{BezPath, Shape};

use crate::canvas::params::{Circle, Line, Polygon, Polyline, Rect};
use crate::foundation::core::Point;
use crate::foundation::error::{VisionError, VisionResult};

/// Flattening tolerance for curved shapes, in pixels.
pub(crate) const PATH_TOLERANCE: f64 = 0.1;

/// How a lowered path is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PaintMode {
    Fill,
    Stroke { width: f64 },
}

fn check_coord(name: &str, v: f64) -> VisionResult<()> {
    if !v.is_finite() {
        return Err(VisionError::backend(format!("{name} must be finite, got {v}")));
    }
    Ok(())
}

fn check_extent(name: &str, v: f64) -> VisionResult<()> {
    check_coord(name, v)?;
    if v < 0.0 {
        return Err(VisionError::backend(format!(
            "{name} must be non-negative, got {v}"
        )));
    }
    Ok(())
}

fn stroke_mode(line_width: f64) -> VisionResult<PaintMode> {
    if !line_width.is_finite() || line_width <= 0.0 {
        return Err(VisionError::backend(format!(
            "line width must be positive, got {line_width}"
        )));
    }
    Ok(PaintMode::Stroke { width: line_width })
}

fn fill_or_stroke(fill: bool, line_width: f64) -> VisionResult<PaintMode> {
    if fill {
        Ok(PaintMode::Fill)
    } else {
        stroke_mode(line_width)
    }
}

fn points_path(points: &[Point], min: usize, close: bool) -> VisionResult<BezPath> {
    if points.len() < min {
        return Err(VisionError::backend(format!(
            "expected at least {min} points, got {}",
            points.len()
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.is_finite()) {
        return Err(VisionError::backend(format!(
            "point coordinates must be finite, got ({}, {})",
            p.0, p.1
        )));
    }

    let mut path = BezPath::new();
    path.move_to(kurbo::Point::from(points[0]));
    for &p in &points[1..] {
        path.line_to(kurbo::Point::from(p));
    }
    if close {
        path.close_path();
    }
    Ok(path)
}

pub(crate) fn line_path(p: &Line) -> VisionResult<(BezPath, PaintMode)> {
    for (name, v) in [("xs", p.xs), ("ys", p.ys), ("xe", p.xe), ("ye", p.ye)] {
        check_coord(name, v)?;
    }
    let mut path = BezPath::new();
    path.move_to((p.xs, p.ys));
    path.line_to((p.xe, p.ye));
    Ok((path, stroke_mode(p.line_width)?))
}

pub(crate) fn circle_path(p: &Circle) -> VisionResult<(BezPath, PaintMode)> {
    check_coord("x", p.x)?;
    check_coord("y", p.y)?;
    check_extent("radius", p.r)?;
    let mode = fill_or_stroke(p.fill, p.line_width)?;
    let path = kurbo::Circle::new((p.x, p.y), p.r).to_path(PATH_TOLERANCE);
    Ok((path, mode))
}

pub(crate) fn rect_path(p: &Rect) -> VisionResult<(BezPath, PaintMode)> {
    check_coord("x", p.x)?;
    check_coord("y", p.y)?;
    check_extent("rx", p.rx)?;
    check_extent("ry", p.ry)?;
    let mode = fill_or_stroke(p.fill, p.line_width)?;
    let path = kurbo::Rect::new(p.x - p.rx, p.y - p.ry, p.x + p.rx, p.y + p.ry)
        .to_path(PATH_TOLERANCE);
    Ok((path, mode))
}

pub(crate) fn polyline_path(p: &Polyline) -> VisionResult<(BezPath, PaintMode)> {
    let path = points_path(&p.points, Polyline::MIN_POINTS, p.close)?;
    Ok((path, stroke_mode(p.line_width)?))
}

pub(crate) fn polygon_path(p: &Polygon) -> VisionResult<(BezPath, PaintMode)> {
    let path = points_path(&p.points, Polygon::MIN_POINTS, true)?;
    Ok((path, PaintMode::Fill))
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/geometry.rs"]
mod tests;
