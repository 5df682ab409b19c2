//! Shape rasterization primitives
//!
//! Lines use Bresenham's algorithm. Rounded rectangles and circles use integer
//! 4x4 supersampling (sample positions in 1/8 pixel units), so coverage is
//! identical on every platform.

use std::collections::HashSet;

use super::blend::SAMPLES;

/// Rasterize a line using Bresenham's line algorithm.
///
/// Returns all pixels that form a line between two points.
///
/// # Examples
///
/// ```
/// use statcard::draw::shapes::rasterize_line;
///
/// let pixels = rasterize_line((0, 0), (3, 3));
/// assert_eq!(pixels.len(), 4);
/// assert!(pixels.contains(&(0, 0)));
/// assert!(pixels.contains(&(3, 3)));
/// ```
pub fn rasterize_line(p0: (i32, i32), p1: (i32, i32)) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();

    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        pixels.insert((x0, y0));

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    pixels
}

/// Rasterize a line stamped with a square brush `width` pixels wide.
pub fn rasterize_thick_line(p0: (i32, i32), p1: (i32, i32), width: u32) -> HashSet<(i32, i32)> {
    let spine = rasterize_line(p0, p1);
    if width <= 1 {
        return spine;
    }
    let w = width as i32;
    let lo = -(w - 1) / 2;
    let hi = w / 2;

    let mut pixels = HashSet::with_capacity(spine.len() * width as usize);
    for (x, y) in spine {
        for dy in lo..=hi {
            for dx in lo..=hi {
                pixels.insert((x + dx, y + dy));
            }
        }
    }
    pixels
}

/// Whether a sample point (1/8 px units, relative to the rect origin) lies
/// inside a `w8` x `h8` rectangle with corner radius `r8`.
fn inside_rounded(sx: i64, sy: i64, w8: i64, h8: i64, r8: i64) -> bool {
    if sx < 0 || sy < 0 || sx >= w8 || sy >= h8 {
        return false;
    }
    if r8 == 0 {
        return true;
    }
    let cx = sx.clamp(r8, w8 - r8);
    let cy = sy.clamp(r8, h8 - r8);
    let (dx, dy) = (sx - cx, sy - cy);
    dx * dx + dy * dy <= r8 * r8
}

/// Largest radius that fits a `w` x `h` rectangle.
pub fn clamp_radius(w: u32, h: u32, radius: u32) -> u32 {
    radius.min(w / 2).min(h / 2)
}

fn sample_positions(p: i32) -> [i64; 4] {
    let base = p as i64 * 8;
    [base + 1, base + 3, base + 5, base + 7]
}

/// Coverage (out of [`SAMPLES`]) of pixel `(px, py)` inside a `w` x `h`
/// rounded rectangle anchored at the origin.
///
/// # Examples
///
/// ```
/// use statcard::draw::shapes::rounded_rect_coverage;
///
/// assert_eq!(rounded_rect_coverage(20, 20, 5, 10, 10), 16);
/// assert_eq!(rounded_rect_coverage(20, 20, 5, 0, 0), 0);
/// ```
pub fn rounded_rect_coverage(w: u32, h: u32, radius: u32, px: i32, py: i32) -> u32 {
    if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
        return 0;
    }
    let r = clamp_radius(w, h, radius);
    // Outside the corner squares a pixel is fully covered
    let (ux, uy) = (px as u32, py as u32);
    if (ux >= r && ux < w - r) || (uy >= r && uy < h - r) {
        return SAMPLES;
    }

    let (w8, h8, r8) = (w as i64 * 8, h as i64 * 8, r as i64 * 8);
    let mut count = 0;
    for sy in sample_positions(py) {
        for sx in sample_positions(px) {
            if inside_rounded(sx, sy, w8, h8, r8) {
                count += 1;
            }
        }
    }
    count
}

/// Coverage of the border ring of a rounded rectangle: inside the outer
/// shape and outside the shape inset by `width`.
pub fn rounded_stroke_coverage(w: u32, h: u32, radius: u32, width: u32, px: i32, py: i32) -> u32 {
    if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h || width == 0 {
        return 0;
    }
    let r = clamp_radius(w, h, radius);
    let (ux, uy) = (px as u32, py as u32);
    let band = r.max(width);
    // Interior pixels away from every edge are empty
    if ux >= band && ux + band < w && uy >= band && uy + band < h {
        return 0;
    }

    let inner_w = w.saturating_sub(width * 2);
    let inner_h = h.saturating_sub(width * 2);
    let inner_r = clamp_radius(inner_w, inner_h, r.saturating_sub(width));
    let (w8, h8, r8) = (w as i64 * 8, h as i64 * 8, r as i64 * 8);
    let (iw8, ih8, ir8) = (inner_w as i64 * 8, inner_h as i64 * 8, inner_r as i64 * 8);
    let inset = width as i64 * 8;

    let mut count = 0;
    for sy in sample_positions(py) {
        for sx in sample_positions(px) {
            if inside_rounded(sx, sy, w8, h8, r8)
                && !inside_rounded(sx - inset, sy - inset, iw8, ih8, ir8)
            {
                count += 1;
            }
        }
    }
    count
}

/// Coverage of pixel `(px, py)` by the ring between `inner` and `outer`
/// radii around `center` (pixel-corner coordinates). `inner = 0` is a disc.
pub fn ring_coverage(center: (i32, i32), outer: u32, inner: u32, px: i32, py: i32) -> u32 {
    let (cx8, cy8) = (center.0 as i64 * 8, center.1 as i64 * 8);
    let (o8, i8) = (outer as i64 * 8, inner as i64 * 8);
    let mut count = 0;
    for sy in sample_positions(py) {
        for sx in sample_positions(px) {
            let (dx, dy) = (sx - cx8, sy - cy8);
            let d2 = dx * dx + dy * dy;
            if d2 <= o8 * o8 && (inner == 0 || d2 > i8 * i8) {
                count += 1;
            }
        }
    }
    count
}
