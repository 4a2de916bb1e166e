use crate::geometry::{Point, Rect, Size};

/// Part of the display area onto which `visible` is drawn.
///
/// Keeps the aspect ratio of `visible`: the result is centred and the
/// shorter display axis is padded. Returns `None` for degenerate input.
pub fn compute_draw_rect(visible: &Rect, display: Size) -> Option<Rect> {
    if visible.is_empty() || display.is_empty() {
        return None;
    }
    let mut x = 0;
    let mut y = 0;
    let mut w = display.width;
    let mut h = display.height;
    let w_fact = i64::from(w) * i64::from(visible.height);
    let h_fact = i64::from(h) * i64::from(visible.width);
    if w_fact > h_fact {
        w = (h_fact / i64::from(visible.height)) as i32;
        x = (display.width - w) / 2;
    } else if w_fact < h_fact {
        h = (w_fact / i64::from(visible.width)) as i32;
        y = (display.height - h) / 2;
    }
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(Rect::new(x, y, w, h))
}

/// Map a screen point to image coordinates.
pub fn screen_to_image(visible: &Rect, draw: &Rect, screen: Point) -> Option<Point> {
    if draw.is_empty() || visible.is_empty() {
        return None;
    }
    Some(Point::new(
        visible.x + scale(screen.x - draw.x, visible.width, draw.width),
        visible.y + scale(screen.y - draw.y, visible.height, draw.height),
    ))
}

/// Map an image point to screen coordinates. Inverse of [`screen_to_image`]
/// up to integer truncation.
pub fn image_to_screen(visible: &Rect, draw: &Rect, image: Point) -> Option<Point> {
    if draw.is_empty() || visible.is_empty() {
        return None;
    }
    Some(Point::new(
        draw.x + scale(image.x - visible.x, draw.width, visible.width),
        draw.y + scale(image.y - visible.y, draw.height, visible.height),
    ))
}

/// `value * num / den` with a 64-bit intermediate, truncating toward zero.
pub(crate) fn scale(value: i32, num: i32, den: i32) -> i32 {
    (i64::from(value) * i64::from(num) / i64::from(den)) as i32
}
