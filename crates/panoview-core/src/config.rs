use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FIELD_OF_VIEW_DEG, DEFAULT_MAX_MAGNIFICATION, DEFAULT_WHEEL_ANCHOR_DEBOUNCE_MS,
    DEFAULT_ZOOM_IN_RATIO, DEFAULT_ZOOM_OUT_RATIO,
};
use crate::controller::PointerButton;
use crate::error::{Result, ViewerError};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Horizontal field of view of the panorama camera, in degrees.
    pub field_of_view_deg: f64,
    pub buttons: ButtonConfig,
    /// Whether detection outlines are projected for painting.
    pub show_detections: bool,
    pub zoom: ZoomConfig,
    /// Wheel events within this window keep zooming around the same anchor.
    pub wheel_anchor_debounce_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            field_of_view_deg: DEFAULT_FIELD_OF_VIEW_DEG,
            buttons: ButtonConfig::default(),
            show_detections: true,
            zoom: ZoomConfig::default(),
            wheel_anchor_debounce_ms: DEFAULT_WHEEL_ANCHOR_DEBOUNCE_MS,
        }
    }
}

impl ViewerConfig {
    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.field_of_view_deg > 0.0 && self.field_of_view_deg < 180.0) {
            return Err(ViewerError::InvalidFieldOfView(self.field_of_view_deg));
        }
        self.buttons.validate()?;
        self.zoom.validate()
    }
}

/// Which pointer button performs which gesture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// Pans a flat image, rotates a panorama, re-centres on click.
    pub drag: PointerButton,
    /// Drags out a zoom rectangle (flat images only).
    pub zoom: PointerButton,
    /// Click toggles best fit / 1:1.
    pub option: PointerButton,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            drag: PointerButton::Primary,
            zoom: PointerButton::Secondary,
            option: PointerButton::Middle,
        }
    }
}

impl ButtonConfig {
    /// Every gesture needs a button of its own.
    pub fn validate(&self) -> Result<()> {
        let roles = [
            (self.drag, "drag", self.zoom, "zoom"),
            (self.option, "option", self.drag, "drag"),
            (self.option, "option", self.zoom, "zoom"),
        ];
        for (a, a_role, b, b_role) in roles {
            if a == b {
                return Err(ViewerError::InvalidConfig(format!(
                    "{a} cannot be both the {a_role} and the {b_role} button"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: i32,
    pub denominator: i32,
}

impl Ratio {
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// `value * numerator / denominator`, truncated toward zero.
    pub fn apply(&self, value: i32) -> i32 {
        (i64::from(value) * i64::from(self.numerator) / i64::from(self.denominator)) as i32
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Growth of the visible rectangle per zoom-out step.
    pub zoom_out: Ratio,
    /// Shrink of the visible rectangle per zoom-in step.
    pub zoom_in: Ratio,
    /// Visible rectangle never gets smaller than `display / max_magnification`.
    pub max_magnification: i32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            zoom_out: Ratio::new(DEFAULT_ZOOM_OUT_RATIO.0, DEFAULT_ZOOM_OUT_RATIO.1),
            zoom_in: Ratio::new(DEFAULT_ZOOM_IN_RATIO.0, DEFAULT_ZOOM_IN_RATIO.1),
            max_magnification: DEFAULT_MAX_MAGNIFICATION,
        }
    }
}

impl ZoomConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, ratio) in [("zoom_out", self.zoom_out), ("zoom_in", self.zoom_in)] {
            if ratio.numerator <= 0 || ratio.denominator <= 0 {
                return Err(ViewerError::InvalidConfig(format!(
                    "{name} ratio {ratio} must have positive terms"
                )));
            }
        }
        if self.zoom_out.numerator <= self.zoom_out.denominator {
            return Err(ViewerError::InvalidConfig(format!(
                "zoom_out ratio {} must be greater than 1",
                self.zoom_out
            )));
        }
        if self.zoom_in.numerator >= self.zoom_in.denominator {
            return Err(ViewerError::InvalidConfig(format!(
                "zoom_in ratio {} must be less than 1",
                self.zoom_in
            )));
        }
        if self.max_magnification <= 0 {
            return Err(ViewerError::InvalidConfig(
                "max_magnification must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
