use serde::{Deserialize, Serialize};

/// Straight RGB color, serialized as `[r, g, b]`.
///
/// Everything above the raster backend speaks RGB; channel layout conversion happens only where a
/// backend paint is built or a pixel is read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Default draw color.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Default canvas background.
    pub const BACKGROUND: Self = Self::rgb(50, 50, 50);

    /// Build a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in RGB order.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

/// Canvas-space point, serialized as `[x, y]`. Origin is top-left, y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    /// Horizontal coordinate.
    pub fn x(self) -> f64 {
        self.0
    }

    /// Vertical coordinate.
    pub fn y(self) -> f64 {
        self.1
    }

    pub(crate) fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.0, p.1)
    }
}

/// A rasterized frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Raw RGBA8 bytes at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight RGB color at `(x, y)`, or `None` outside the frame.
    pub fn pixel_rgb(&self, x: u32, y: u32) -> Option<Color> {
        let [r, g, b, a] = self.pixel(x, y)?;
        if !self.premultiplied || a == 255 {
            return Some(Color::rgb(r, g, b));
        }
        if a == 0 {
            return Some(Color::rgb(0, 0, 0));
        }
        let unpremul = |c: u8| -> u8 {
            let v = (u16::from(c) * 255 + u16::from(a) / 2) / u16::from(a);
            v.min(255) as u8
        };
        Some(Color::rgb(unpremul(r), unpremul(g), unpremul(b)))
    }

    /// Straight RGB8 bytes for the whole frame, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.pixel_rgb(x, y).unwrap_or(Color::rgb(0, 0, 0));
                out.extend_from_slice(&c.to_array());
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
