use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::projection::{project_to_plane, spherical_to_vector, CameraBasis};

/// One element of an outline path.
///
/// Detection shapes use image-normalized `[0, 1] x [0, 1]` coordinates for
/// flat images and spherical `(u, v)` coordinates for panoramas. Projected
/// paths reuse the type with screen-pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    MoveTo(DVec2),
    LineTo(DVec2),
    QuadTo(DVec2, DVec2),
    CubicTo(DVec2, DVec2, DVec2),
    Close,
}

impl PathSegment {
    /// Point the pen ends at after this segment.
    pub fn end_point(&self) -> Option<DVec2> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::QuadTo(_, p) | Self::CubicTo(_, _, p) => {
                Some(p)
            }
            Self::Close => None,
        }
    }

    /// Apply `f` to every point of the segment.
    pub fn map(&self, f: impl Fn(DVec2) -> DVec2) -> Self {
        match *self {
            Self::MoveTo(p) => Self::MoveTo(f(p)),
            Self::LineTo(p) => Self::LineTo(f(p)),
            Self::QuadTo(c, p) => Self::QuadTo(f(c), f(p)),
            Self::CubicTo(c1, c2, p) => Self::CubicTo(f(c1), f(c2), f(p)),
            Self::Close => Self::Close,
        }
    }

    fn points(&self) -> impl Iterator<Item = DVec2> {
        let pts: [Option<DVec2>; 3] = match *self {
            Self::MoveTo(p) | Self::LineTo(p) => [Some(p), None, None],
            Self::QuadTo(c, p) => [Some(c), Some(p), None],
            Self::CubicTo(c1, c2, p) => [Some(c1), Some(c2), Some(p)],
            Self::Close => [None, None, None],
        };
        pts.into_iter().flatten()
    }
}

/// An annotation shape detected on an image, e.g. a traffic sign outline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Classification value, e.g. `regulatory--stop--g1`.
    pub value: String,
    #[serde(default)]
    pub traffic_sign: bool,
    pub shape: Vec<PathSegment>,
}

impl Detection {
    pub fn new(value: impl Into<String>, traffic_sign: bool, shape: Vec<PathSegment>) -> Self {
        Self {
            value: value.into(),
            traffic_sign,
            shape,
        }
    }
}

/// How shape coordinates reach the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projector {
    /// Affine map from unit image coordinates: `p * scale + offset`.
    Flat { scale: DVec2, offset: DVec2 },
    /// Spherical coordinates through the camera plane, then the affine map
    /// from the offscreen buffer onto the display (`p * scale + offset`).
    Panorama {
        camera: CameraBasis,
        scale: DVec2,
        offset: DVec2,
    },
}

/// A detection bound to the projection in effect when it was requested.
///
/// Nothing is cached: every call to [`ProjectedPath::segments`] walks the
/// shape again.
#[derive(Clone, Copy, Debug)]
pub struct ProjectedPath<'a> {
    detection: &'a Detection,
    projector: Projector,
}

impl<'a> ProjectedPath<'a> {
    pub fn new(detection: &'a Detection, projector: Projector) -> Self {
        Self {
            detection,
            projector,
        }
    }

    pub fn detection(&self) -> &'a Detection {
        self.detection
    }

    /// Screen-space segments of the outline.
    pub fn segments(&self) -> ProjectedSegments<'a> {
        ProjectedSegments {
            inner: self.detection.shape.iter(),
            projector: self.projector,
            pen_visible: false,
        }
    }

    /// Screen-space bounding box of the projected outline, if any of it is
    /// visible.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.segments().flat_map(|s| s.points());
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        let min = min.floor();
        let max = max.ceil();
        Some(Rect::new(
            min.x as i32,
            min.y as i32,
            (max.x - min.x) as i32,
            (max.y - min.y) as i32,
        ))
    }
}

impl<'a> IntoIterator for ProjectedPath<'a> {
    type Item = PathSegment;
    type IntoIter = ProjectedSegments<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments()
    }
}

/// Lazy iterator over the screen-space segments of a [`ProjectedPath`].
///
/// In panorama mode only straight lines between successive end points are
/// produced, and vertices behind the camera break the outline: the next
/// visible vertex starts a new sub-path with `MoveTo`.
pub struct ProjectedSegments<'a> {
    inner: std::slice::Iter<'a, PathSegment>,
    projector: Projector,
    pen_visible: bool,
}

impl Iterator for ProjectedSegments<'_> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<PathSegment> {
        match self.projector {
            Projector::Flat { scale, offset } => {
                let segment = self.inner.next()?;
                Some(segment.map(|p| p * scale + offset))
            }
            Projector::Panorama {
                camera,
                scale,
                offset,
            } => loop {
                let segment = self.inner.next()?;
                let Some(end) = segment.end_point() else {
                    self.pen_visible = false;
                    continue;
                };
                let Some(plane) = project_to_plane(spherical_to_vector(end.x, end.y), &camera)
                else {
                    self.pen_visible = false;
                    continue;
                };
                let screen = plane * scale + offset;
                let starts_subpath = matches!(segment, PathSegment::MoveTo(_)) || !self.pen_visible;
                self.pen_visible = true;
                return Some(if starts_subpath {
                    PathSegment::MoveTo(screen)
                } else {
                    PathSegment::LineTo(screen)
                });
            },
        }
    }
}
