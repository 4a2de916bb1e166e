use serde::{Deserialize, Serialize};

use crate::config::ZoomConfig;
use crate::error::{Result, ViewerError};
use crate::geometry::{Point, Rect, Size};

use super::transform::{compute_draw_rect, image_to_screen, scale, screen_to_image};

/// Wheel zoom direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    /// Shrink the visible rectangle (magnify).
    In,
    /// Grow the visible rectangle.
    Out,
}

impl ZoomDirection {
    /// Direction for a wheel rotation: positive rotation zooms out.
    pub fn from_wheel(rotation: i32) -> Self {
        if rotation > 0 {
            Self::Out
        } else {
            Self::In
        }
    }
}

/// Mapping between the display area and the image it shows.
///
/// `bounds` is the raster the visible rectangle lives in: the image itself
/// in flat mode, the offscreen camera buffer in panorama mode. Every
/// mutation keeps `visible` non-empty and inside `bounds`; mutations that
/// resize it also restore the display aspect ratio unless the image bounds
/// cut it short.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    bounds: Size,
    display: Size,
    visible: Rect,
    selection: Option<Rect>,
    selection_anchor: Option<Point>,
    zoom: ZoomConfig,
}

impl Viewport {
    /// Full-extent viewport over `bounds`.
    pub fn new(bounds: Size, display: Size, zoom: ZoomConfig) -> Result<Self> {
        if bounds.is_empty() {
            return Err(ViewerError::InvalidDimensions {
                width: bounds.width.max(0) as u32,
                height: bounds.height.max(0) as u32,
            });
        }
        Ok(Self {
            bounds,
            display,
            visible: bounds.to_rect(),
            selection: None,
            selection_anchor: None,
            zoom,
        })
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn display(&self) -> Size {
        self.display
    }

    pub fn visible(&self) -> Rect {
        self.visible
    }

    /// In-progress zoom selection, in image coordinates.
    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn is_full_extent(&self) -> bool {
        self.visible == self.bounds.to_rect()
    }

    /// Letterboxed target rectangle for the current visible rectangle.
    pub fn draw_rect(&self) -> Option<Rect> {
        compute_draw_rect(&self.visible, self.display)
    }

    pub fn screen_to_image(&self, screen: Point) -> Option<Point> {
        screen_to_image(&self.visible, &self.draw_rect()?, screen)
    }

    pub fn image_to_screen(&self, image: Point) -> Option<Point> {
        image_to_screen(&self.visible, &self.draw_rect()?, image)
    }

    /// Zoom one step, keeping `anchor_image` under `anchor_screen`.
    ///
    /// Returns `false` when nothing could be computed (empty display).
    pub fn zoom(&mut self, direction: ZoomDirection, anchor_image: Point, anchor_screen: Point) -> bool {
        if self.display.is_empty() {
            return false;
        }
        let ratio = match direction {
            ZoomDirection::In => self.zoom.zoom_in,
            ZoomDirection::Out => self.zoom.zoom_out,
        };
        let mut rect = self.visible;
        rect.width = ratio.apply(rect.width);
        rect.height = ratio.apply(rect.height);
        self.cap_and_fit(&mut rect);
        clamp_size(&mut rect, self.bounds);

        let Some(draw) = compute_draw_rect(&rect, self.display) else {
            return false;
        };
        rect.x = anchor_image.x + scale(draw.x - anchor_screen.x, rect.width, draw.width);
        rect.y = anchor_image.y + scale(draw.y - anchor_screen.y, rect.height, draw.height);
        clamp_position(&mut rect, self.bounds);
        self.visible = rect;
        true
    }

    /// Translate the visible rectangle by `delta` image pixels.
    pub fn pan(&mut self, delta: Point) {
        let mut rect = self.visible;
        rect.x += delta.x;
        rect.y += delta.y;
        clamp_position(&mut rect, self.bounds);
        self.visible = rect;
    }

    /// Move the visible rectangle so that `target` becomes its centre.
    pub fn center_on(&mut self, target: Point) {
        let center = self.visible.center();
        self.pan(Point::new(target.x - center.x, target.y - center.y));
    }

    /// Start a zoom selection at `anchor`, clamped into the visible rectangle.
    pub fn begin_selection(&mut self, anchor: Point) {
        let anchor = self.visible.clamp_point(anchor);
        self.selection_anchor = Some(anchor);
        self.selection = Some(Rect::new(anchor.x, anchor.y, 0, 0));
    }

    /// Stretch the selection to `current`. No-op without an active selection.
    pub fn update_selection(&mut self, current: Point) {
        let Some(anchor) = self.selection_anchor else {
            return;
        };
        let current = self.visible.clamp_point(current);
        let mut rect = Rect::from_corners(anchor, current);
        clamp_size(&mut rect, self.bounds);
        clamp_position(&mut rect, self.bounds);
        self.selection = Some(rect);
    }

    /// Turn the selection into the new visible rectangle.
    ///
    /// The selection is widened to the zoom cap and the display aspect ratio
    /// around its own centre. Returns `false` when no selection was active.
    pub fn commit_selection(&mut self) -> bool {
        self.selection_anchor = None;
        let Some(mut rect) = self.selection.take() else {
            return false;
        };
        if self.display.is_empty() {
            return false;
        }
        let (old_width, old_height) = (rect.width, rect.height);
        self.cap_and_fit(&mut rect);
        if rect.width != old_width {
            rect.x -= (rect.width - old_width) / 2;
        }
        if rect.height != old_height {
            rect.y -= (rect.height - old_height) / 2;
        }
        clamp_size(&mut rect, self.bounds);
        clamp_position(&mut rect, self.bounds);
        self.visible = rect;
        true
    }

    /// Drop any in-progress selection. Returns whether one existed.
    pub fn cancel_selection(&mut self) -> bool {
        self.selection_anchor = None;
        self.selection.take().is_some()
    }

    /// Toggle between the whole image and a 1:1 view around the current centre.
    pub fn zoom_best_fit_or_one(&mut self) {
        if self.visible.size() != self.bounds {
            self.visible = self.bounds.to_rect();
            return;
        }
        let center = self.visible.center();
        let mut rect = Rect::new(
            center.x - self.display.width / 2,
            center.y - self.display.height / 2,
            self.display.width.max(1),
            self.display.height.max(1),
        );
        clamp_size(&mut rect, self.bounds);
        clamp_position(&mut rect, self.bounds);
        self.visible = rect;
    }

    /// Show the whole of `bounds`.
    pub fn reset_to_full(&mut self) {
        self.visible = self.bounds.to_rect();
    }

    /// Adapt to a new display size and, in panorama mode, new buffer bounds.
    ///
    /// A changed `bounds` resets to full extent. Otherwise a zoomed view is
    /// re-fitted to the new aspect ratio around its centre.
    pub fn resize(&mut self, display: Size, bounds: Size) {
        self.display = display;
        self.cancel_selection();
        if bounds != self.bounds && !bounds.is_empty() {
            self.bounds = bounds;
            self.reset_to_full();
            return;
        }
        if self.is_full_extent() || display.is_empty() {
            return;
        }
        let center = self.visible.center();
        let mut rect = self.visible;
        self.cap_and_fit(&mut rect);
        clamp_size(&mut rect, self.bounds);
        rect.x = center.x - rect.width / 2;
        rect.y = center.y - rect.height / 2;
        clamp_position(&mut rect, self.bounds);
        self.visible = rect;
    }

    /// Enforce the magnification cap, then grow the dimension that restores
    /// the display aspect ratio.
    fn cap_and_fit(&self, rect: &mut Rect) {
        let max_mag = self.zoom.max_magnification.max(1);
        rect.width = rect.width.max(self.display.width / max_mag);
        rect.height = rect.height.max(self.display.height / max_mag);

        let h_fact = i64::from(rect.height) * i64::from(self.display.width);
        let w_fact = i64::from(rect.width) * i64::from(self.display.height);
        if h_fact > w_fact {
            rect.width = (h_fact / i64::from(self.display.height)) as i32;
        } else {
            rect.height = (w_fact / i64::from(self.display.width)) as i32;
        }
        rect.width = rect.width.max(1);
        rect.height = rect.height.max(1);
    }
}

fn clamp_size(rect: &mut Rect, bounds: Size) {
    rect.width = rect.width.min(bounds.width);
    rect.height = rect.height.min(bounds.height);
}

fn clamp_position(rect: &mut Rect, bounds: Size) {
    rect.x = rect.x.max(0);
    rect.y = rect.y.max(0);
    if rect.right() > bounds.width {
        rect.x = bounds.width - rect.width;
    }
    if rect.bottom() > bounds.height {
        rect.y = bounds.height - rect.height;
    }
}
