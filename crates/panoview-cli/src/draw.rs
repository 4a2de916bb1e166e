use image::{Rgba, RgbaImage};
use panoview_core::detection::PathSegment;
use panoview_core::geometry::Rect;

/// Stroke a projected outline as straight lines between segment end points.
pub fn draw_path(canvas: &mut RgbaImage, segments: impl IntoIterator<Item = PathSegment>, color: Rgba<u8>) {
    let mut start: Option<(i64, i64)> = None;
    let mut pen: Option<(i64, i64)> = None;
    for segment in segments {
        match segment {
            PathSegment::MoveTo(p) => {
                let p = (p.x.round() as i64, p.y.round() as i64);
                start = Some(p);
                pen = Some(p);
            }
            PathSegment::Close => {
                if let (Some(from), Some(to)) = (pen, start) {
                    draw_line(canvas, from, to, color);
                }
                pen = start;
            }
            other => {
                let Some(end) = other.end_point() else {
                    continue;
                };
                let end = (end.x.round() as i64, end.y.round() as i64);
                if let Some(from) = pen {
                    draw_line(canvas, from, end, color);
                }
                start.get_or_insert(end);
                pen = Some(end);
            }
        }
    }
}

/// One-pixel outline around `rect`.
pub fn draw_rect_outline(canvas: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    if rect.is_empty() {
        return;
    }
    let (l, t) = (i64::from(rect.x), i64::from(rect.y));
    let (r, b) = (i64::from(rect.right()), i64::from(rect.bottom()));
    draw_line(canvas, (l, t), (r, t), color);
    draw_line(canvas, (r, t), (r, b), color);
    draw_line(canvas, (r, b), (l, b), color);
    draw_line(canvas, (l, b), (l, t), color);
}

/// Bresenham line, clipped to the canvas.
fn draw_line(canvas: &mut RgbaImage, from: (i64, i64), to: (i64, i64), color: Rgba<u8>) {
    let (w, h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    // Skip lines reaching far off the canvas.
    let limit = 4 * (w + h);
    if [from.0, from.1, to.0, to.1].iter().any(|v| v.abs() > limit) {
        return;
    }
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        if (0..w).contains(&x) && (0..h).contains(&y) {
            canvas.put_pixel(x as u32, y as u32, color);
        }
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;

    #[test]
    fn test_draw_path_closes_outline() {
        let mut canvas = RgbaImage::new(10, 10);
        let red = Rgba([255, 0, 0, 255]);
        draw_path(
            &mut canvas,
            [
                PathSegment::MoveTo(DVec2::new(1.0, 1.0)),
                PathSegment::LineTo(DVec2::new(8.0, 1.0)),
                PathSegment::LineTo(DVec2::new(8.0, 8.0)),
                PathSegment::Close,
            ],
            red,
        );
        assert_eq!(*canvas.get_pixel(5, 1), red);
        assert_eq!(*canvas.get_pixel(8, 5), red);
        // Closing diagonal back to the start.
        assert_eq!(*canvas.get_pixel(4, 4), red);
        assert_eq!(canvas.get_pixel(1, 8)[3], 0);
    }

    #[test]
    fn test_draw_line_clips_to_canvas() {
        let mut canvas = RgbaImage::new(4, 4);
        let white = Rgba([255, 255, 255, 255]);
        draw_line(&mut canvas, (-3, 1), (6, 1), white);
        assert!((0..4).all(|x| *canvas.get_pixel(x, 1) == white));
        draw_line(&mut canvas, (-1_000_000, 0), (2, 0), white);
        assert_eq!(canvas.get_pixel(0, 0)[3], 0);
    }
}
