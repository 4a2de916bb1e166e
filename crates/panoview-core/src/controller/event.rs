use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

impl fmt::Display for PointerButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
            Self::Middle => write!(f, "middle"),
        }
    }
}

/// Framework-neutral pointer input, in display-area pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    Pressed { button: PointerButton, x: i32, y: i32 },
    Dragged { x: i32, y: i32 },
    Released { button: PointerButton, x: i32, y: i32 },
    /// `rotation > 0` scrolls towards the user (zoom out). `when_ms` is any
    /// monotonic timestamp in milliseconds.
    Wheel { rotation: i32, x: i32, y: i32, when_ms: u64 },
    /// Press and release without movement; delivered after `Released`.
    Clicked { button: PointerButton, x: i32, y: i32 },
    Entered,
    Exited,
}

impl PointerEvent {
    /// Pointer position, for events that carry one.
    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::Pressed { x, y, .. }
            | Self::Dragged { x, y }
            | Self::Released { x, y, .. }
            | Self::Wheel { x, y, .. }
            | Self::Clicked { x, y, .. } => Some(Point::new(x, y)),
            Self::Entered | Self::Exited => None,
        }
    }
}
