//! Parameter shapes of the six canvas operations.
//!
//! Field names match the IR and wire encodings (`lineWidth` is camel-cased). Optional parameters
//! carry the defaults of the drawing contract when omitted: white, width 1, unfilled, open.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Color, Point};
use crate::foundation::error::{VisionError, VisionResult};

fn default_line_width() -> f64 {
    1.0
}

/// Repaint the frame buffer, optionally with a new color or size.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Refresh {
    /// Background color for the new frame; the configured background when `None`.
    #[serde(default)]
    pub color: Option<Color>,
    /// New width in pixels; keeps the current width when `None`.
    #[serde(default)]
    pub width: Option<u32>,
    /// New height in pixels; keeps the current height when `None`.
    #[serde(default)]
    pub height: Option<u32>,
}

/// Straight segment from `(xs, ys)` to `(xe, ye)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Line {
    /// Start x.
    pub xs: f64,
    /// Start y.
    pub ys: f64,
    /// End x.
    pub xe: f64,
    /// End y.
    pub ye: f64,
    /// Stroke color.
    #[serde(default)]
    pub color: Color,
    /// Stroke width in pixels.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

impl Line {
    /// White, 1px segment between two points.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            xs: start.0,
            ys: start.1,
            xe: end.0,
            ye: end.1,
            color: Color::WHITE,
            line_width: 1.0,
        }
    }

    /// Set the stroke color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the stroke width.
    pub fn with_line_width(mut self, line_width: f64) -> Self {
        self.line_width = line_width;
        self
    }
}

/// Circle centered at `(x, y)` with radius `r`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Circle {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Radius.
    pub r: f64,
    /// Stroke or fill color.
    #[serde(default)]
    pub color: Color,
    /// Stroke width; ignored when `fill` is set.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Solid-fill the interior.
    #[serde(default)]
    pub fill: bool,
}

/// Rectangle centered at `(x, y)` spanning `x ± rx`, `y ± ry`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Rect {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Horizontal half extent.
    pub rx: f64,
    /// Vertical half extent.
    pub ry: f64,
    /// Stroke or fill color.
    #[serde(default)]
    pub color: Color,
    /// Stroke width; ignored when `fill` is set.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Solid-fill the interior.
    #[serde(default)]
    pub fill: bool,
}

/// Connected segments through an ordered point list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Polyline {
    /// At least two points.
    pub points: Vec<Point>,
    /// Stroke color.
    #[serde(default)]
    pub color: Color,
    /// Stroke width.
    #[serde(default = "default_line_width")]
    pub line_width: f64,
    /// Connect the last point back to the first.
    #[serde(default)]
    pub close: bool,
}

impl Polyline {
    /// Minimum number of points.
    pub const MIN_POINTS: usize = 2;

    /// Split into the independent two-point segments used by the streaming procedure.
    ///
    /// With `close`, a final segment runs from the last point back to the first.
    pub fn segments(&self) -> Vec<Line> {
        let n = self.points.len();
        if n < Self::MIN_POINTS {
            return Vec::new();
        }
        let end = if self.close { n } else { n - 1 };
        (0..end)
            .map(|i| {
                Line::new(self.points[i], self.points[(i + 1) % n])
                    .with_color(self.color)
                    .with_line_width(self.line_width)
            })
            .collect()
    }
}

/// Filled closed polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Polygon {
    /// At least three points.
    pub points: Vec<Point>,
    /// Fill color.
    #[serde(default)]
    pub color: Color,
}

impl Polygon {
    /// Minimum number of points.
    pub const MIN_POINTS: usize = 3;
}

pub(crate) fn ensure_min_points(
    command: &str,
    points: &[Point],
    min: usize,
) -> VisionResult<()> {
    if points.len() < min {
        return Err(VisionError::invalid_parameter(
            command,
            format!("expected at least {min} points, got {}", points.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/params.rs"]
mod tests;
