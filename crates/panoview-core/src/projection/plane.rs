use glam::{DMat3, DVec2, DVec3};

/// Everything needed to project a world direction onto the camera plane.
///
/// Cheap to copy; unlike [`crate::camera::CameraPlane`] it carries no
/// per-pixel ray table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraBasis {
    pub width: i32,
    pub height: i32,
    /// Distance from the eye to the image plane, in screen pixels.
    pub focal_distance: f64,
    /// Camera-to-world rotation (`R_y(yaw) * R_x(pitch)`).
    pub rotation: DMat3,
}

impl CameraBasis {
    pub fn new(width: i32, height: i32, focal_distance: f64, yaw: f64, pitch: f64) -> Self {
        Self {
            width,
            height,
            focal_distance,
            rotation: rotation_matrix(yaw, pitch),
        }
    }

    /// Screen-space centre of the plane.
    pub fn center(&self) -> DVec2 {
        DVec2::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// World direction of the ray through a screen point.
    pub fn unproject(&self, screen: DVec2) -> DVec3 {
        self.rotation * camera_ray(self.width, self.height, self.focal_distance, screen)
    }
}

/// Camera-to-world rotation: yaw about the vertical axis after pitch about
/// the horizontal one. Positive pitch looks up.
pub fn rotation_matrix(yaw: f64, pitch: f64) -> DMat3 {
    DMat3::from_rotation_y(yaw) * DMat3::from_rotation_x(pitch)
}

/// Unrotated unit ray through a screen point of a `width x height` plane.
pub fn camera_ray(width: i32, height: i32, focal_distance: f64, screen: DVec2) -> DVec3 {
    DVec3::new(
        screen.x - f64::from(width) / 2.0,
        screen.y - f64::from(height) / 2.0,
        focal_distance,
    )
    .normalize()
}

/// Intersect the ray along `direction` with the camera's image plane.
///
/// Returns `None` when the direction points sideways or behind the camera,
/// or when the intersection is not finite.
pub fn project_to_plane(direction: DVec3, camera: &CameraBasis) -> Option<DVec2> {
    let local = camera.rotation.transpose() * direction;
    if local.z <= 0.0 {
        return None;
    }
    let point = DVec2::new(local.x, local.y) / local.z * camera.focal_distance + camera.center();
    point.is_finite().then_some(point)
}
