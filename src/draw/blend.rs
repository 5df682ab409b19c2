//! Source-over compositing

use image::{Rgba, RgbaImage};

/// Number of coverage samples per pixel (4x4 grid).
pub const SAMPLES: u32 = 16;

/// Blit a bitmap onto the canvas at the given position.
/// Uses alpha blending for transparent pixels; anything past the canvas edge is clipped.
pub fn blit(canvas: &mut RgbaImage, sprite: &RgbaImage, x: u32, y: u32) {
    let canvas_width = canvas.width();
    let canvas_height = canvas.height();

    for (sy, row) in sprite.rows().enumerate() {
        let dest_y = y + sy as u32;
        if dest_y >= canvas_height {
            break;
        }

        for (sx, src) in row.enumerate() {
            let dest_x = x + sx as u32;
            if dest_x >= canvas_width {
                break;
            }

            // Fully transparent source, skip
            if src[3] == 0 {
                continue;
            }

            let dst = canvas.get_pixel(dest_x, dest_y);
            let blended = blend_pixels(src, dst, src[3] as f32 / 255.0);
            canvas.put_pixel(dest_x, dest_y, blended);
        }
    }
}

/// Paint a colour onto one pixel with partial coverage (out of [`SAMPLES`]).
/// Pixels outside the canvas are ignored.
pub fn paint(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: u32) {
    if x < 0 || y < 0 || coverage == 0 || color[3] == 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let alpha = (color[3] as f32 / 255.0) * (coverage.min(SAMPLES) as f32 / SAMPLES as f32);
    let dst = canvas.get_pixel(x, y);
    let blended = blend_pixels(&color, dst, alpha);
    canvas.put_pixel(x, y, blended);
}

/// Scale a pixel's alpha by the fraction `keep` out of [`SAMPLES`].
pub fn mask_alpha(pixel: &mut Rgba<u8>, keep: u32) {
    let keep = keep.min(SAMPLES);
    pixel[3] = ((pixel[3] as u32 * keep + SAMPLES / 2) / SAMPLES) as u8;
}

/// Blend source pixel over destination with the given effective source alpha.
pub fn blend_pixels(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f32) -> Rgba<u8> {
    let dst_alpha = dst[3] as f32 / 255.0;

    // Porter-duff "source over"
    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    // out_color = (src_color * src_alpha + dst_color * dst_alpha * (1 - src_alpha)) / out_alpha
    let composite = |src: u8, dst: u8| -> u8 {
        let src = src as f32 / 255.0;
        let dst = dst as f32 / 255.0;
        let result = (src * src_alpha + dst * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        composite(src[0], dst[0]),
        composite(src[1], dst[1]),
        composite(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
