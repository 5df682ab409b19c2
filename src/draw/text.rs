//! Text measurement and rendering
//!
//! The built-in pixel font is always available and renders identically on
//! every platform. An outline font can be supplied through the asset store and
//! is rasterized with `rusttype`.

use image::{Rgba, RgbaImage};
use rusttype::{point, Font, Scale};
use std::fmt;

use super::blend::{paint, SAMPLES};
use super::glyphs::{glyph, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Font used for every text command.
#[derive(Clone, Default)]
pub enum Typeface {
    /// Built-in 5x7 bitmap font scaled by whole pixels
    #[default]
    Pixel,
    Outline(Font<'static>),
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Typeface::Pixel => f.write_str("Typeface::Pixel"),
            Typeface::Outline(font) => {
                write!(f, "Typeface::Outline({} glyphs)", font.glyph_count())
            }
        }
    }
}

/// Whole-pixel scale of the bitmap font for a nominal text size.
///
/// ```
/// use statcard::draw::text::pixel_scale;
///
/// assert_eq!(pixel_scale(40), 5);
/// assert_eq!(pixel_scale(28), 4);
/// assert_eq!(pixel_scale(1), 1);
/// ```
pub fn pixel_scale(size: u32) -> u32 {
    ((size + 4) / 8).max(1)
}

impl Typeface {
    /// Parse TrueType/OpenType bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(Typeface::Outline)
    }

    pub fn is_pixel(&self) -> bool {
        matches!(self, Typeface::Pixel)
    }

    /// Width and height of `text` at `size`.
    pub fn measure(&self, text: &str, size: u32) -> (u32, u32) {
        match self {
            Typeface::Pixel => {
                let s = pixel_scale(size);
                let n = text.chars().count() as u32;
                let width = if n == 0 { 0 } else { n * ADVANCE * s - s };
                (width, GLYPH_HEIGHT * s)
            }
            Typeface::Outline(font) => {
                let scale = Scale::uniform(size as f32);
                let v = font.v_metrics(scale);
                let height = (v.ascent - v.descent).ceil().max(0.0) as u32;
                let width = font
                    .layout(text, scale, point(0.0, v.ascent))
                    .last()
                    .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                    .unwrap_or(0.0);
                (width.ceil().max(0.0) as u32, height)
            }
        }
    }

    /// Draw `text` with its top-left corner at (x, y). Pixels past the canvas
    /// edge are clipped.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size: u32,
        color: Rgba<u8>,
    ) {
        match self {
            Typeface::Pixel => draw_pixel_text(canvas, text, x, y, pixel_scale(size), color),
            Typeface::Outline(font) => {
                let scale = Scale::uniform(size as f32);
                let v = font.v_metrics(scale);
                for g in font.layout(text, scale, point(x as f32, y as f32 + v.ascent)) {
                    if let Some(bb) = g.pixel_bounding_box() {
                        g.draw(|gx, gy, cov| {
                            let coverage = (cov * SAMPLES as f32).round() as u32;
                            let (px, py) = (bb.min.x + gx as i32, bb.min.y + gy as i32);
                            paint(canvas, px, py, color, coverage);
                        });
                    }
                }
            }
        }
    }
}

fn draw_pixel_text(
    canvas: &mut RgbaImage,
    text: &str,
    x: i32,
    y: i32,
    scale: u32,
    color: Rgba<u8>,
) {
    let s = scale as i32;
    for (i, c) in text.chars().enumerate() {
        let gx = x + i as i32 * ADVANCE as i32 * s;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (*bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = gx + col as i32 * s;
                let py = y + row as i32 * s;
                for dy in 0..s {
                    for dx in 0..s {
                        paint(canvas, px + dx, py + dy, color, SAMPLES);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_measure() {
        let face = Typeface::Pixel;
        assert_eq!(face.measure("", 28), (0, 28));
        // 4 * 6 * 4 - 4
        assert_eq!(face.measure("Lv. ", 28), (92, 28));
        assert_eq!(face.measure("1", 18), (10, 14));
    }

    #[test]
    fn test_pixel_draw_marks_pixels() {
        let mut canvas = RgbaImage::new(20, 20);
        Typeface::Pixel.draw(&mut canvas, "I", 0, 0, 8, Rgba([255, 255, 255, 255]));
        // Top bar of 'I' spans columns 1..=3
        assert_eq!(canvas.get_pixel(1, 0)[3], 255);
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
        // Stem in column 2
        assert_eq!(canvas.get_pixel(2, 3)[3], 255);
        assert_eq!(canvas.get_pixel(1, 3)[3], 0);
    }

    #[test]
    fn test_pixel_draw_clips() {
        let mut canvas = RgbaImage::new(4, 4);
        Typeface::Pixel.draw(&mut canvas, "WWW", -3, -3, 8, Rgba([255, 0, 0, 255]));
        Typeface::Pixel.draw(&mut canvas, "WWW", 2, 2, 40, Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(Typeface::from_bytes(vec![0, 1, 2, 3]).is_none());
        assert!(Typeface::default().is_pixel());
    }
}
