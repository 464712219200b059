use crate::canvas::params::{Circle, Line, Polygon, Polyline, Rect, Refresh};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::VisionResult;

/// The drawing contract every rendering backend implements.
///
/// Coordinates are canvas pixels with the origin at the top-left. Every operation except
/// [`Canvas::refresh`] requires an initialized frame buffer and fails with
/// [`crate::VisionError::UninitializedCanvas`] before the first refresh.
pub trait Canvas {
    /// Replace the frame buffer with a cleared one and advance the frame counter.
    ///
    /// Attached observers see the outgoing frame before it is replaced.
    fn refresh(&mut self, params: &Refresh) -> VisionResult<()>;

    /// Draw an anti-aliased straight segment.
    fn line(&mut self, params: &Line) -> VisionResult<()>;

    /// Draw a circle outline, or a filled disc when `fill` is set.
    fn circle(&mut self, params: &Circle) -> VisionResult<()>;

    /// Draw a center-anchored rectangle outline, or a filled one when `fill` is set.
    fn rect(&mut self, params: &Rect) -> VisionResult<()>;

    /// Draw connected segments through the point list.
    fn polyline(&mut self, params: &Polyline) -> VisionResult<()>;

    /// Fill a closed polygon.
    fn polygon(&mut self, params: &Polygon) -> VisionResult<()>;

    /// Number of successful refreshes so far.
    fn frame_count(&self) -> u64;

    /// Rasterize the current frame buffer.
    fn snapshot(&mut self) -> VisionResult<FrameRGBA>;
}
