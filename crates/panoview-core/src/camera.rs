use std::f64::consts::{FRAC_PI_2, PI, TAU};

use glam::{DMat3, DVec2, DVec3};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::consts::{PARALLEL_PIXEL_THRESHOLD, PITCH_POLE_MARGIN};
use crate::error::{Result, ViewerError};
use crate::geometry::{Point, Size};
use crate::projection::plane::{camera_ray, rotation_matrix};
use crate::projection::{project_to_plane, texture_coordinate, CameraBasis};

/// Largest absolute pitch the camera accepts.
pub const MAX_PITCH: f64 = FRAC_PI_2 - PITCH_POLE_MARGIN;

/// Pinhole camera looking out from the centre of an equirectangular sphere.
///
/// The unrotated ray of every screen pixel is computed once at construction;
/// the plane is rebuilt whenever the display area changes size.
#[derive(Clone, Debug)]
pub struct CameraPlane {
    size: Size,
    focal_distance: f64,
    yaw: f64,
    pitch: f64,
    rotation: DMat3,
    /// Row-major unrotated unit rays, `width * height` entries.
    rays: Vec<DVec3>,
}

impl CameraPlane {
    /// Build a camera plane covering `size` with the given horizontal field of view.
    pub fn new(size: Size, field_of_view_deg: f64) -> Result<Self> {
        if size.is_empty() {
            return Err(ViewerError::InvalidDimensions {
                width: size.width.max(0) as u32,
                height: size.height.max(0) as u32,
            });
        }
        if !(field_of_view_deg > 0.0 && field_of_view_deg < 180.0) {
            return Err(ViewerError::InvalidFieldOfView(field_of_view_deg));
        }

        let focal_distance = focal_distance_for(size.width, field_of_view_deg);
        let Size { width, height } = size;
        let rays: Vec<DVec3> = (0..height)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..width).map(move |x| {
                    camera_ray(width, height, focal_distance, DVec2::new(f64::from(x), f64::from(y)))
                })
            })
            .collect();

        debug!(width, height, focal_distance, "Camera plane built");
        Ok(Self {
            size,
            focal_distance,
            yaw: 0.0,
            pitch: 0.0,
            rotation: DMat3::IDENTITY,
            rays,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn focal_distance(&self) -> f64 {
        self.focal_distance
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Copyable projection basis for the current rotation.
    pub fn basis(&self) -> CameraBasis {
        CameraBasis {
            width: self.size.width,
            height: self.size.height,
            focal_distance: self.focal_distance,
            rotation: self.rotation,
        }
    }

    /// Set the rotation. Yaw wraps into `[-π, π)`, pitch is clamped to
    /// [`MAX_PITCH`].
    pub fn set_yaw_pitch(&mut self, yaw: f64, pitch: f64) {
        self.yaw = (yaw + PI).rem_euclid(TAU) - PI;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
        self.rotation = rotation_matrix(self.yaw, self.pitch);
    }

    /// Turn the camera so that the ray currently through `screen` becomes
    /// the viewing direction.
    pub fn set_rotation(&mut self, screen: Point) {
        let direction = self.vector_at(screen);
        self.set_yaw_pitch(yaw_of(direction), pitch_of(direction));
    }

    /// Rotate by the angular difference between the rays through `from`
    /// and `to`, so that the scene follows a drag from `from` to `to`.
    pub fn set_rotation_from_delta(&mut self, from: Point, to: Point) {
        if from == to {
            return;
        }
        let f = self.ray(from);
        let t = self.ray(to);
        let delta_yaw = yaw_of(f) - yaw_of(t);
        let delta_pitch = pitch_of(f) - pitch_of(t);
        self.set_yaw_pitch(self.yaw + delta_yaw, self.pitch + delta_pitch);
    }

    /// World direction seen through a screen point.
    pub fn vector_at(&self, screen: Point) -> DVec3 {
        self.rotation * self.ray(screen)
    }

    /// Screen point of a world direction, or `None` when it cannot be drawn
    /// (behind the camera or outside the integer range).
    pub fn get_point(&self, direction: DVec3) -> Option<Point> {
        let p = project_to_plane(direction, &self.basis())?.round();
        let in_range = |v: f64| v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX);
        (in_range(p.x) && in_range(p.y)).then(|| Point::new(p.x as i32, p.y as i32))
    }

    /// Render the perspective crop of `source` into `target`.
    ///
    /// Every target pixel takes the nearest source sample along its ray.
    pub fn mapping(&self, source: &RgbaImage, target: &mut RgbaImage) {
        let (src_w, src_h) = source.dimensions();
        let row_len = target.width() as usize * 4;
        if src_w == 0 || src_h == 0 || row_len == 0 {
            return;
        }
        let pixel_count = target.width() as usize * target.height() as usize;
        let pixels: &mut [u8] = target;

        if pixel_count >= PARALLEL_PIXEL_THRESHOLD {
            pixels
                .par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| self.sample_row(source, y, row));
        } else {
            pixels
                .chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| self.sample_row(source, y, row));
        }
    }

    fn sample_row(&self, source: &RgbaImage, y: usize, row: &mut [u8]) {
        let (src_w, src_h) = source.dimensions();
        let max_u = f64::from(src_w - 1);
        let max_v = f64::from(src_h - 1);

        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let direction = self.vector_at(Point::new(x as i32, y as i32));
            let uv = texture_coordinate(direction);
            let sx = ((uv.x * max_u) as u32).min(src_w - 1);
            let sy = ((uv.y * max_v) as u32).min(src_h - 1);
            px.copy_from_slice(&source.get_pixel(sx, sy).0);
        }
    }

    /// Unrotated ray through a screen point; off-plane points are computed
    /// directly instead of read from the table.
    fn ray(&self, p: Point) -> DVec3 {
        let Size { width, height } = self.size;
        if (0..width).contains(&p.x) && (0..height).contains(&p.y) {
            self.rays[(p.y * width + p.x) as usize]
        } else {
            camera_ray(
                width,
                height,
                self.focal_distance,
                DVec2::new(f64::from(p.x), f64::from(p.y)),
            )
        }
    }
}

/// Focal distance, in pixels, giving `field_of_view_deg` across `width` pixels.
pub fn focal_distance_for(width: i32, field_of_view_deg: f64) -> f64 {
    (f64::from(width) / 2.0) / (field_of_view_deg.to_radians() / 2.0).tan()
}

fn yaw_of(v: DVec3) -> f64 {
    v.x.atan2(v.z)
}

fn pitch_of(v: DVec3) -> f64 {
    (-v.y).atan2(v.x.hypot(v.z))
}
