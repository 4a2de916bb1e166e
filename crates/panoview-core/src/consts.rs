/// Minimum destination pixel count (h*w) to use row-level Rayon parallelism
/// when mapping a panorama onto the camera plane.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default horizontal field of view of the panorama camera, in degrees.
pub const DEFAULT_FIELD_OF_VIEW_DEG: f64 = 110.0;

/// Margin kept between the camera pitch and the poles, in radians.
/// Pitch is clamped to `±(π/2 - PITCH_POLE_MARGIN)`.
pub const PITCH_POLE_MARGIN: f64 = 1e-3;

/// Wheel events closer together than this reuse the previous zoom anchor.
pub const DEFAULT_WHEEL_ANCHOR_DEBOUNCE_MS: u64 = 1500;

/// Zoom-out growth ratio applied to the visible rectangle per wheel step.
pub const DEFAULT_ZOOM_OUT_RATIO: (i32, i32) = (3, 2);

/// Zoom-in shrink ratio applied to the visible rectangle per wheel step.
pub const DEFAULT_ZOOM_IN_RATIO: (i32, i32) = (2, 3);

/// Maximum screen-pixels-per-image-pixel magnification.
pub const DEFAULT_MAX_MAGNIFICATION: i32 = 2;

/// Relative tolerance on the 2:1 width:height ratio of equirectangular images.
pub const EQUIRECTANGULAR_ASPECT_TOLERANCE: f64 = 0.01;
