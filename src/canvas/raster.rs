use crate::canvas::contract::Canvas;
use crate::canvas::geometry::{
    PaintMode, circle_path, line_path, polygon_path, polyline_path, rect_path,
};
use crate::canvas::observer::FrameObserver;
use crate::canvas::params::{Circle, Line, Polygon, Polyline, Rect, Refresh};
use crate::foundation::core::{Color, FrameRGBA};
use crate::foundation::error::{VisionError, VisionResult};

/// Default upper bound on `width * height` of a single frame (8192 x 8192).
pub const DEFAULT_MAX_PIXELS: u64 = 8192 * 8192;

/// Construction options for [`RasterCanvas`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterCanvasOpts {
    /// Initial frame width in pixels.
    pub width: u32,
    /// Initial frame height in pixels.
    pub height: u32,
    /// Background used by refreshes that carry no color.
    pub background: Color,
    /// Largest frame, in pixels, a refresh may allocate.
    pub max_pixels: u64,
}

impl Default for RasterCanvasOpts {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            background: Color::BACKGROUND,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }
}

struct Frame {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    dirty: bool,
}

/// CPU raster canvas powered by `vello_cpu`.
///
/// Draw calls are recorded into the frame's render context and rasterized lazily on
/// [`Canvas::snapshot`] or when the frame is handed to an observer.
pub struct RasterCanvas {
    width: u32,
    height: u32,
    background: Color,
    max_pixels: u64,
    frame: Option<Frame>,
    frame_count: u64,
    observer: Option<Box<dyn FrameObserver>>,
}

impl std::fmt::Debug for RasterCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("background", &self.background)
            .field("max_pixels", &self.max_pixels)
            .field("initialized", &self.frame.is_some())
            .field("frame_count", &self.frame_count)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl RasterCanvas {
    /// Create an uninitialized canvas; the first [`Canvas::refresh`] allocates the frame buffer.
    pub fn new(opts: RasterCanvasOpts) -> Self {
        Self {
            width: opts.width,
            height: opts.height,
            background: opts.background,
            max_pixels: opts.max_pixels,
            frame: None,
            frame_count: 0,
            observer: None,
        }
    }

    /// Attach an observer that receives each outgoing frame.
    pub fn with_observer(mut self, observer: impl FrameObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Current canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Integer center of the canvas.
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }

    /// Background used by refreshes that carry no color.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Largest frame, in pixels, a refresh may allocate.
    pub fn max_pixels(&self) -> u64 {
        self.max_pixels
    }

    /// Whether a frame buffer exists.
    pub fn is_initialized(&self) -> bool {
        self.frame.is_some()
    }

    /// Hand the current frame to the observer without replacing it.
    ///
    /// Does nothing when no observer is attached.
    pub fn export_current(&mut self) -> VisionResult<()> {
        if self.observer.is_none() {
            return Ok(());
        }
        let frame = self.rasterize("export")?;
        if let Some(observer) = self.observer.as_mut() {
            observer.frame_complete(self.frame_count, &frame)?;
        }
        Ok(())
    }

    fn rasterize(&mut self, operation: &'static str) -> VisionResult<FrameRGBA> {
        let frame = self
            .frame
            .as_mut()
            .ok_or(VisionError::UninitializedCanvas { operation })?;
        if frame.dirty {
            frame.ctx.flush();
            frame.ctx.render_to_pixmap(&mut frame.pixmap);
            frame.dirty = false;
        }
        Ok(FrameRGBA {
            width: u32::from(frame.width),
            height: u32::from(frame.height),
            data: frame.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw(
        &mut self,
        operation: &'static str,
        color: Color,
        lower: impl FnOnce() -> VisionResult<(kurbo::BezPath, PaintMode)>,
    ) -> VisionResult<()> {
        let frame = self
            .frame
            .as_mut()
            .ok_or(VisionError::UninitializedCanvas { operation })?;
        let (path, mode) = lower()?;

        let ctx = &mut frame.ctx;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint_for(color));
        let cpu_path = bezpath_to_cpu(&path);
        match mode {
            PaintMode::Fill => ctx.fill_path(&cpu_path),
            PaintMode::Stroke { width } => {
                ctx.set_stroke(
                    vello_cpu::kurbo::Stroke::new(width)
                        .with_caps(vello_cpu::kurbo::Cap::Round)
                        .with_join(vello_cpu::kurbo::Join::Round),
                );
                ctx.stroke_path(&cpu_path);
            }
        }
        frame.dirty = true;
        Ok(())
    }
}

impl Canvas for RasterCanvas {
    fn refresh(&mut self, params: &Refresh) -> VisionResult<()> {
        let width = params.width.unwrap_or(self.width);
        let height = params.height.unwrap_or(self.height);
        let (w16, h16) = frame_dims(width, height, self.max_pixels)?;
        let color = params.color.unwrap_or(self.background);

        // Export-before-overwrite: the outgoing frame is observed while it still exists.
        if self.observer.is_some() && self.frame.is_some() {
            let outgoing = self.rasterize("refresh")?;
            if let Some(observer) = self.observer.as_mut() {
                observer.frame_complete(self.frame_count, &outgoing)?;
            }
        }

        let (mut ctx, pixmap) = match self.frame.take() {
            Some(old) if old.width == w16 && old.height == h16 => {
                let mut ctx = old.ctx;
                ctx.reset();
                (ctx, old.pixmap)
            }
            _ => (
                vello_cpu::RenderContext::new(w16, h16),
                vello_cpu::Pixmap::new(w16, h16),
            ),
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(paint_for(color));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w16),
            f64::from(h16),
        ));
        self.frame = Some(Frame {
            width: w16,
            height: h16,
            ctx,
            pixmap,
            dirty: true,
        });
        self.width = width;
        self.height = height;
        self.frame_count += 1;
        tracing::info!(frame = self.frame_count, width, height, "refresh");
        Ok(())
    }

    fn line(&mut self, params: &Line) -> VisionResult<()> {
        self.draw("line", params.color, || line_path(params))
    }

    fn circle(&mut self, params: &Circle) -> VisionResult<()> {
        self.draw("circle", params.color, || circle_path(params))
    }

    fn rect(&mut self, params: &Rect) -> VisionResult<()> {
        self.draw("rect", params.color, || rect_path(params))
    }

    fn polyline(&mut self, params: &Polyline) -> VisionResult<()> {
        self.draw("polyline", params.color, || polyline_path(params))
    }

    fn polygon(&mut self, params: &Polygon) -> VisionResult<()> {
        self.draw("polygon", params.color, || polygon_path(params))
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn snapshot(&mut self) -> VisionResult<FrameRGBA> {
        self.rasterize("snapshot")
    }
}

// Runs before the observer or any allocation, so a rejected refresh leaves the canvas untouched.
fn frame_dims(width: u32, height: u32, max_pixels: u64) -> VisionResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VisionError::backend(format!("canvas width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VisionError::backend(format!("canvas height {height} exceeds u16")))?;
    if w == 0 || h == 0 {
        return Err(VisionError::backend(format!(
            "canvas dimensions must be non-zero, got {width}x{height}"
        )));
    }
    let pixels = u64::from(w) * u64::from(h);
    if pixels > max_pixels {
        return Err(VisionError::backend(format!(
            "canvas {width}x{height} is {pixels} pixels, over the limit of {max_pixels}"
        )));
    }
    Ok((w, h))
}

// The only place RGB becomes a backend paint; `vello_cpu` stores RGBA so no channel swap is needed.
fn paint_for(color: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, 255)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/raster.rs"]
mod tests;
