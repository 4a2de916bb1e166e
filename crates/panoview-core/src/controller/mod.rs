//! Pointer gesture state machine.
//!
//! Events arrive as plain [`PointerEvent`] values and are translated into
//! calls on an [`ImageDisplay`]. Events with no effect in the current gesture
//! mode are silently ignored.

pub mod event;

pub use event::{PointerButton, PointerEvent};

use tracing::debug;

use crate::display::{ImageDisplay, ViewState};
use crate::geometry::Point;
use crate::viewport::ZoomDirection;

/// Gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Flat drag; `anchor` is the image point that stays under the pointer.
    Panning { anchor: Point },
    /// Flat zoom rectangle being dragged out.
    Selecting,
    /// Panorama drag; rotation is applied on release only.
    Rotating { anchor: Point },
}

#[derive(Debug)]
pub struct InteractionController {
    gesture: Gesture,
    wheel_anchor: Option<Point>,
    last_wheel_ms: Option<u64>,
    inside: bool,
    generation: u64,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
            wheel_anchor: None,
            last_wheel_ms: None,
            inside: true,
            generation: 0,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Image point the wheel currently zooms around, if one is cached.
    pub fn wheel_anchor(&self) -> Option<Point> {
        self.wheel_anchor
    }

    /// Drop any gesture in progress and the cached wheel anchor.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.wheel_anchor = None;
        self.last_wheel_ms = None;
    }

    /// Apply one pointer event to `display`.
    pub fn handle(&mut self, display: &ImageDisplay, event: &PointerEvent) {
        let view = display.snapshot();
        if view.generation() != self.generation || view.image().is_none() {
            if self.gesture != Gesture::Idle || self.wheel_anchor.is_some() {
                debug!(generation = view.generation(), "Gesture state reset");
            }
            self.reset();
            self.generation = view.generation();
        }

        let buttons = &display.config().buttons;
        match *event {
            PointerEvent::Entered => self.inside = true,
            PointerEvent::Exited => self.inside = false,

            PointerEvent::Pressed { button, x, y } => {
                if self.gesture != Gesture::Idle {
                    return;
                }
                let Some(anchor) = to_image(&view, Point::new(x, y)) else {
                    return;
                };
                if button == buttons.drag {
                    self.gesture = if view.is_panorama() {
                        Gesture::Rotating { anchor }
                    } else {
                        Gesture::Panning { anchor }
                    };
                } else if button == buttons.zoom && !view.is_panorama() {
                    display.begin_selection(anchor);
                    self.gesture = Gesture::Selecting;
                }
                if self.gesture != Gesture::Idle {
                    debug!(?button, x, y, gesture = ?self.gesture, "Gesture started");
                }
            }

            PointerEvent::Dragged { x, y } => {
                let Some(current) = to_image(&view, Point::new(x, y)) else {
                    return;
                };
                match self.gesture {
                    Gesture::Panning { anchor } => {
                        display.pan_by(Point::new(anchor.x - current.x, anchor.y - current.y));
                    }
                    Gesture::Selecting => {
                        display.update_selection(current);
                    }
                    Gesture::Rotating { .. } | Gesture::Idle => {}
                }
            }

            PointerEvent::Released { button, x, y } => {
                let current = to_image(&view, Point::new(x, y));
                match self.gesture {
                    Gesture::Panning { .. } if button == buttons.drag => {}
                    Gesture::Rotating { anchor } if button == buttons.drag => {
                        if let Some(current) = current {
                            display.rotate_from_delta(anchor, current);
                        }
                    }
                    Gesture::Selecting if button == buttons.zoom => {
                        if let Some(current) = current {
                            display.update_selection(current);
                        }
                        display.commit_selection();
                    }
                    _ => return,
                }
                debug!(?button, x, y, gesture = ?self.gesture, "Gesture finished");
                self.gesture = Gesture::Idle;
            }

            PointerEvent::Wheel {
                rotation,
                x,
                y,
                when_ms,
            } => self.wheel(display, &view, rotation, Point::new(x, y), when_ms),

            PointerEvent::Clicked { button, x, y } => {
                if self.gesture != Gesture::Idle {
                    return;
                }
                let Some(target) = to_image(&view, Point::new(x, y)) else {
                    return;
                };
                if button == buttons.option {
                    if view.is_panorama() {
                        let full = view.viewport().is_some_and(|vp| vp.is_full_extent());
                        if !full {
                            display.reset_zoom();
                        }
                    } else {
                        display.zoom_best_fit_or_one();
                    }
                } else if button == buttons.drag {
                    if view.is_panorama() {
                        display.rotate_towards(target);
                    } else {
                        display.center_on(target);
                    }
                }
            }
        }
    }

    fn wheel(
        &mut self,
        display: &ImageDisplay,
        view: &ViewState,
        rotation: i32,
        screen: Point,
        when_ms: u64,
    ) {
        if rotation == 0 || !self.inside || self.gesture != Gesture::Idle {
            return;
        }
        if !view.display().to_rect().contains(screen) {
            return;
        }
        let debounce = display.config().wheel_anchor_debounce_ms;
        let stale = self
            .last_wheel_ms
            .map_or(true, |last| when_ms.saturating_sub(last) > debounce);
        self.last_wheel_ms = Some(when_ms);
        if stale || self.wheel_anchor.is_none() {
            self.wheel_anchor = to_image(view, screen);
            debug!(anchor = ?self.wheel_anchor, "Wheel anchor resampled");
        }
        let Some(anchor) = self.wheel_anchor else {
            return;
        };
        display.zoom_at(ZoomDirection::from_wheel(rotation), anchor, screen);
    }
}

fn to_image(view: &ViewState, screen: Point) -> Option<Point> {
    view.viewport()?.screen_to_image(screen)
}
