use std::f64::consts::FRAC_PI_2;

use approx::assert_abs_diff_eq;
use glam::{DVec2, DVec3};

use panoview_core::camera::CameraPlane;
use panoview_core::geometry::{Point, Size};
use panoview_core::projection::{project_to_plane, spherical_to_vector, texture_coordinate, CameraBasis};

// ---------------------------------------------------------------------------
// Spherical coordinates
// ---------------------------------------------------------------------------

#[test]
fn test_spherical_center_is_forward() {
    let v = spherical_to_vector(0.5, 0.5);
    assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(v.z, 1.0, epsilon = 1e-12);
}

#[test]
fn test_spherical_poles() {
    // v = 0 is the top of the image, which looks up (negative y).
    let up = spherical_to_vector(0.3, 0.0);
    assert_abs_diff_eq!(up.y, -1.0, epsilon = 1e-12);
    let down = spherical_to_vector(0.7, 1.0);
    assert_abs_diff_eq!(down.y, 1.0, epsilon = 1e-12);
}

#[test]
fn test_spherical_vectors_are_unit_length() {
    for i in 0..=10 {
        for j in 0..=10 {
            let v = spherical_to_vector(f64::from(i) / 10.0, f64::from(j) / 10.0);
            assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_texture_coordinate_inverts_spherical() {
    for &(u, v) in &[(0.5, 0.5), (0.1, 0.2), (0.75, 0.9), (0.33, 0.5), (0.99, 0.01)] {
        let uv = texture_coordinate(spherical_to_vector(u, v));
        assert_abs_diff_eq!(uv.x, u, epsilon = 1e-9);
        assert_abs_diff_eq!(uv.y, v, epsilon = 1e-9);
    }
}

#[test]
fn test_texture_coordinate_tolerates_denormalized_input() {
    let uv = texture_coordinate(DVec3::new(0.0, 1.0 + 1e-12, 0.0));
    assert!(uv.is_finite());
    assert_abs_diff_eq!(uv.y, 1.0, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Plane projection
// ---------------------------------------------------------------------------

#[test]
fn test_forward_axis_projects_to_plane_center() {
    let camera = CameraBasis::new(800, 600, 500.0, 0.0, 0.0);
    let p = project_to_plane(spherical_to_vector(0.5, 0.5), &camera).unwrap();
    assert_abs_diff_eq!(p.x, 400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(p.y, 300.0, epsilon = 1e-9);
}

#[test]
fn test_forward_axis_get_point_is_exact_center() {
    let camera = CameraPlane::new(Size::new(800, 600), 110.0).unwrap();
    assert_eq!(
        camera.get_point(spherical_to_vector(0.5, 0.5)),
        Some(Point::new(400, 300))
    );
}

#[test]
fn test_behind_camera_is_not_visible() {
    let camera = CameraBasis::new(800, 600, 500.0, 0.0, 0.0);
    assert_eq!(project_to_plane(DVec3::new(0.0, 0.0, -1.0), &camera), None);
    // Exactly sideways never meets the plane either.
    assert_eq!(project_to_plane(DVec3::new(1.0, 0.0, 0.0), &camera), None);
}

#[test]
fn test_rotated_camera_sees_target_at_center() {
    let camera = CameraBasis::new(640, 480, 400.0, FRAC_PI_2, 0.0);
    // Yaw of +90 degrees looks along +x.
    let p = project_to_plane(DVec3::X, &camera).unwrap();
    assert_abs_diff_eq!(p.x, 320.0, epsilon = 1e-9);
    assert_abs_diff_eq!(p.y, 240.0, epsilon = 1e-9);
    assert_eq!(project_to_plane(-DVec3::X, &camera), None);
}

#[test]
fn test_unproject_then_project_round_trip() {
    let camera = CameraBasis::new(800, 600, 350.0, 0.7, -0.3);
    for &(x, y) in &[(0.0, 0.0), (123.5, 456.25), (799.0, 599.0), (400.0, 300.0)] {
        let screen = DVec2::new(x, y);
        let p = project_to_plane(camera.unproject(screen), &camera).unwrap();
        assert_abs_diff_eq!(p.x, x, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, y, epsilon = 1e-6);
    }
}
