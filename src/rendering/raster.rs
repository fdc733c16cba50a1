/// Stroke rasterizer
///
/// Strokes are painted without antialiasing: a pixel is covered when its
/// center lies within `width / 2` of the segment, which yields round caps and
/// a dot for zero-length segments.

use crate::Point;
use image::{Rgba, RgbaImage};

/// Paint a round-capped segment onto `image`, clipped to its bounds.
///
/// Returns the number of pixels written.
pub fn stroke_segment(image: &mut RgbaImage, from: Point, to: Point, width: f32, rgba: Rgba<u8>) -> usize {
    let radius = width / 2.0;
    if radius.is_nan() || radius <= 0.0 {
        return 0;
    }

    let (w, h) = (image.width() as f32, image.height() as f32);
    let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
    let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
    let max_x = (from.x.max(to.x) + radius).ceil().min(w);
    let max_y = (from.y.max(to.y) + radius).ceil().min(h);
    if min_x >= max_x || min_y >= max_y {
        return 0;
    }

    let r2 = radius * radius;
    let mut painted = 0;
    for py in min_y as u32..max_y as u32 {
        for px in min_x as u32..max_x as u32 {
            let center = Point::new(px as f32 + 0.5, py as f32 + 0.5);
            if distance_sq_to_segment(center, from, to) <= r2 {
                image.put_pixel(px, py, rgba);
                painted += 1;
            }
        }
    }
    painted
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    (p.x - cx) * (p.x - cx) + (p.y - cy) * (p.y - cy)
}
