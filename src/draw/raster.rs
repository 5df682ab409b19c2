//! Executes a [`DrawList`] into a bitmap

use image::{Rgba, RgbaImage};

use super::blend::{self, SAMPLES};
use super::shapes::{
    rasterize_thick_line, ring_coverage, rounded_rect_coverage, rounded_stroke_coverage,
};
use super::{Align, DrawCommand, DrawList, HAlign, ImageSource, Rect, VAlign};
use crate::assets::AssetStore;
use crate::error::LayoutViolation;
use crate::ledger::ResourceLedger;

/// Turns draw lists into pixels, reading bitmaps from the call's ledger and
/// the shared asset store.
///
/// Fills, strokes and blits must lie entirely inside the target; anything else
/// is a [`LayoutViolation::OutOfBounds`]. Text and lines are clipped.
pub struct Rasterizer<'a> {
    ledger: &'a ResourceLedger,
    assets: &'a AssetStore,
}

impl<'a> Rasterizer<'a> {
    pub fn new(ledger: &'a ResourceLedger, assets: &'a AssetStore) -> Self {
        Self { ledger, assets }
    }

    /// Execute every command onto a new transparent bitmap.
    pub fn render(&self, list: &DrawList) -> Result<RgbaImage, LayoutViolation> {
        let mut canvas = RgbaImage::new(list.width(), list.height());
        for command in list.commands() {
            self.execute(&mut canvas, command)?;
        }
        Ok(canvas)
    }

    fn execute(
        &self,
        canvas: &mut RgbaImage,
        command: &DrawCommand,
    ) -> Result<(), LayoutViolation> {
        match command {
            DrawCommand::Clear(color) => {
                for pixel in canvas.pixels_mut() {
                    *pixel = *color;
                }
            }
            DrawCommand::Fill { rect, color, radius } => {
                check_bounds(canvas, "fill", *rect)?;
                fill_rect(canvas, *rect, *color, *radius);
            }
            DrawCommand::Stroke {
                rect,
                color,
                width,
                radius,
            } => {
                check_bounds(canvas, "stroke", *rect)?;
                for py in 0..rect.h as i32 {
                    for px in 0..rect.w as i32 {
                        let coverage =
                            rounded_stroke_coverage(rect.w, rect.h, *radius, *width, px, py);
                        blend::paint(canvas, rect.x + px, rect.y + py, *color, coverage);
                    }
                }
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                let mut pixels: Vec<_> =
                    rasterize_thick_line(*from, *to, *width).into_iter().collect();
                // HashSet order is unstable; paint in raster order
                pixels.sort_unstable_by_key(|&(x, y)| (y, x));
                for (x, y) in pixels {
                    blend::paint(canvas, x, y, *color, SAMPLES);
                }
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let r = *radius as i32;
                let bounds = Rect::new(center.0 - r, center.1 - r, radius * 2, radius * 2);
                check_bounds(canvas, "circle", bounds)?;
                for py in bounds.y..bounds.bottom() {
                    for px in bounds.x..bounds.right() {
                        if let Some(color) = fill {
                            let coverage = ring_coverage(*center, *radius, 0, px, py);
                            blend::paint(canvas, px, py, *color, coverage);
                        }
                        if let Some((color, width)) = stroke {
                            let inner = radius.saturating_sub(*width);
                            let coverage = ring_coverage(*center, *radius, inner, px, py);
                            blend::paint(canvas, px, py, *color, coverage);
                        }
                    }
                }
            }
            DrawCommand::Blit { source, x, y } => {
                let image = self.source(*source)?;
                let rect = Rect::new(*x, *y, image.width(), image.height());
                check_bounds(canvas, "image", rect)?;
                blend::blit(canvas, image, *x as u32, *y as u32);
            }
            DrawCommand::Text {
                text,
                origin,
                size,
                align,
                color,
            } => {
                let typeface = self.assets.typeface();
                let (w, h) = typeface.measure(text, *size);
                let (x, y) = aligned_origin(*origin, (w, h), *align);
                typeface.draw(canvas, text, x, y, *size, *color);
            }
            DrawCommand::RoundCorners { radius } => {
                let (w, h) = canvas.dimensions();
                for (px, py, pixel) in canvas.enumerate_pixels_mut() {
                    let keep = rounded_rect_coverage(w, h, *radius, px as i32, py as i32);
                    if keep < SAMPLES {
                        blend::mask_alpha(pixel, keep);
                    }
                }
            }
        }
        Ok(())
    }

    fn source(&self, source: ImageSource) -> Result<&'a RgbaImage, LayoutViolation> {
        match source {
            ImageSource::Tracked(handle) => self.ledger.get(handle),
            ImageSource::Asset(id) => self
                .assets
                .image(id)
                .ok_or_else(|| LayoutViolation::MissingAsset(id.to_string())),
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>, radius: u32) {
    for py in 0..rect.h as i32 {
        for px in 0..rect.w as i32 {
            let coverage = if radius == 0 {
                SAMPLES
            } else {
                rounded_rect_coverage(rect.w, rect.h, radius, px, py)
            };
            blend::paint(canvas, rect.x + px, rect.y + py, color, coverage);
        }
    }
}

fn check_bounds(canvas: &RgbaImage, what: &'static str, rect: Rect) -> Result<(), LayoutViolation> {
    let (width, height) = canvas.dimensions();
    let inside = rect.x >= 0
        && rect.y >= 0
        && rect.right() as i64 <= width as i64
        && rect.bottom() as i64 <= height as i64;
    if inside {
        Ok(())
    } else {
        Err(LayoutViolation::OutOfBounds {
            what,
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            width,
            height,
        })
    }
}

/// Top-left corner of a `size` box anchored at `origin` with `align`.
pub fn aligned_origin(origin: (i32, i32), size: (u32, u32), align: Align) -> (i32, i32) {
    let (w, h) = (size.0 as i32, size.1 as i32);
    let x = match align.h {
        HAlign::Left => origin.0,
        HAlign::Center => origin.0 - w / 2,
        HAlign::Right => origin.0 - w,
    };
    let y = match align.v {
        VAlign::Top => origin.1,
        VAlign::Middle => origin.1 - h / 2,
        VAlign::Bottom => origin.1 - h,
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetId;
    use crate::color::{BLACK, WHITE};
    use crate::ledger::ResourceKind;

    #[test]
    fn test_fill_and_clear() {
        let ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let mut list = DrawList::new(10, 10);
        list.clear(BLACK);
        list.fill(Rect::new(2, 2, 3, 3), WHITE, 0);

        let out = Rasterizer::new(&ledger, &assets).render(&list).unwrap();
        assert_eq!(*out.get_pixel(0, 0), BLACK);
        assert_eq!(*out.get_pixel(2, 2), WHITE);
        assert_eq!(*out.get_pixel(4, 4), WHITE);
        assert_eq!(*out.get_pixel(5, 5), BLACK);
    }

    #[test]
    fn test_out_of_bounds_fill_is_violation() {
        let ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let mut list = DrawList::new(10, 10);
        list.fill(Rect::new(5, 5, 6, 2), WHITE, 0);

        let err = Rasterizer::new(&ledger, &assets).render(&list).unwrap_err();
        assert!(matches!(err, LayoutViolation::OutOfBounds { what: "fill", x: 5, .. }));
    }

    #[test]
    fn test_blit_tracked_and_bounds() {
        let mut ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let handle = ledger.track(ResourceKind::Chip, RgbaImage::from_pixel(4, 4, WHITE));

        let mut ok = DrawList::new(8, 8);
        ok.blit(ImageSource::Tracked(handle), 4, 4);
        let out = Rasterizer::new(&ledger, &assets).render(&ok).unwrap();
        assert_eq!(*out.get_pixel(7, 7), WHITE);
        assert_eq!(out.get_pixel(3, 3)[3], 0);

        let mut bad = DrawList::new(8, 8);
        bad.blit(ImageSource::Tracked(handle), 5, 0);
        assert!(Rasterizer::new(&ledger, &assets).render(&bad).is_err());
    }

    #[test]
    fn test_missing_asset() {
        let ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let mut list = DrawList::new(8, 8);
        list.blit(ImageSource::Asset(AssetId::BossCheck), 0, 0);
        assert!(matches!(
            Rasterizer::new(&ledger, &assets).render(&list),
            Err(LayoutViolation::MissingAsset(_))
        ));
    }

    #[test]
    fn test_round_corners_clears_corner() {
        let ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let mut list = DrawList::new(30, 30);
        list.clear(WHITE);
        list.push(DrawCommand::RoundCorners { radius: 10 });
        let out = Rasterizer::new(&ledger, &assets).render(&list).unwrap();
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(29, 0)[3], 0);
        assert_eq!(out.get_pixel(15, 15)[3], 255);
        assert_eq!(out.get_pixel(15, 0)[3], 255);
    }

    #[test]
    fn test_aligned_origin() {
        assert_eq!(aligned_origin((100, 50), (40, 10), Align::TOP_LEFT), (100, 50));
        assert_eq!(aligned_origin((100, 50), (40, 10), Align::BOTTOM_RIGHT), (60, 40));
        assert_eq!(aligned_origin((100, 50), (40, 10), Align::CENTER), (80, 45));
    }

    #[test]
    fn test_render_is_deterministic() {
        let ledger = ResourceLedger::new();
        let assets = AssetStore::empty();
        let mut list = DrawList::new(64, 64);
        list.clear(BLACK);
        list.line((0, 0), (63, 40), WHITE, 3);
        list.push(DrawCommand::Circle {
            center: (32, 32),
            radius: 20,
            fill: Some(Rgba([10, 20, 30, 200])),
            stroke: Some((WHITE, 2)),
        });
        list.text("Node 1", (32, 32), 18, Align::CENTER, WHITE);

        let r = Rasterizer::new(&ledger, &assets);
        assert_eq!(r.render(&list).unwrap(), r.render(&list).unwrap());
    }
}
