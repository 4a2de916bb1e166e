//! Thread-safe owner of everything the input and paint paths share.
//!
//! `{image, panorama flag, detections, viewport}` live in one immutable
//! [`ViewState`] behind an `RwLock<Arc<_>>`: readers clone the `Arc`, writers
//! publish a new value in one store. The offscreen buffer and the camera
//! plane form a separate [`DisplaySurface`] that is only ever replaced as a
//! pair. Locks are always taken surface first, then view state.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use glam::DVec2;
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::camera::CameraPlane;
use crate::config::ViewerConfig;
use crate::detection::{Detection, ProjectedPath, Projector};
use crate::error::{Result, ViewerError};
use crate::geometry::{Point, Rect, Size};
use crate::probe::{default_probe, PanoramaProbe};
use crate::projection::CameraBasis;
use crate::viewport::{Viewport, ZoomDirection};

/// Notification emitted once per external-facing mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewChange {
    ImageReplaced,
    ImageCleared,
    Resized,
    ViewportChanged,
    SelectionChanged,
    CameraRotated,
}

/// One consistent view of the displayed image.
#[derive(Clone, Debug)]
pub struct ViewState {
    image: Option<Arc<RgbaImage>>,
    panorama: bool,
    detections: Arc<[Detection]>,
    viewport: Option<Viewport>,
    display: Size,
    generation: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            image: None,
            panorama: false,
            detections: Arc::from(Vec::new()),
            viewport: None,
            display: Size::default(),
            generation: 0,
        }
    }
}

impl ViewState {
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn is_panorama(&self) -> bool {
        self.panorama
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// `None` while no image is set, or while a panorama waits for a
    /// non-empty display area.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn display(&self) -> Size {
        self.display
    }

    /// Incremented by every `set_image`.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything a paint collaborator needs to blit one frame.
#[derive(Debug)]
pub struct RenderFrame<'a> {
    /// Raster to copy from: the image itself, or the freshly mapped
    /// offscreen buffer for panoramas.
    pub source: &'a RgbaImage,
    /// Part of `source` to copy.
    pub source_rect: Rect,
    /// Display-area rectangle to copy into.
    pub target: Rect,
    /// In-progress zoom selection, in screen coordinates.
    pub selection: Option<Rect>,
    pub panorama: bool,
    /// Detection outlines for this frame, empty when detections are off.
    pub detections: Vec<ProjectedPath<'a>>,
}

struct DisplaySurface {
    offscreen: RgbaImage,
    camera: CameraPlane,
}

pub struct ImageDisplay {
    config: ViewerConfig,
    probe: PanoramaProbe,
    surface: Mutex<Option<DisplaySurface>>,
    state: RwLock<Arc<ViewState>>,
    listeners: Mutex<Vec<Sender<ViewChange>>>,
}

impl ImageDisplay {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        Self::with_probe(config, default_probe())
    }

    /// Build a display whose panorama detection is delegated to `probe`.
    pub fn with_probe(config: ViewerConfig, probe: PanoramaProbe) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            probe,
            surface: Mutex::new(None),
            state: RwLock::new(Arc::new(ViewState::default())),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Receive a [`ViewChange`] for every subsequent mutation.
    pub fn subscribe(&self) -> Receiver<ViewChange> {
        let (tx, rx) = mpsc::channel();
        lock(&self.listeners).push(tx);
        rx
    }

    /// Current view state. Cheap; never blocks writers for long.
    pub fn snapshot(&self) -> Arc<ViewState> {
        Arc::clone(&read(&self.state))
    }

    /// Replace the displayed image. `None` clears the view.
    ///
    /// When `panorama_hint` is false the probe gets a chance to recognise
    /// the image as a panorama anyway.
    pub fn set_image(
        &self,
        image: Option<RgbaImage>,
        detections: Vec<Detection>,
        panorama_hint: bool,
    ) -> Result<()> {
        if let Some(img) = &image {
            if img.width() == 0 || img.height() == 0 {
                warn!(width = img.width(), height = img.height(), "Rejected empty image");
                return Err(ViewerError::InvalidDimensions {
                    width: img.width(),
                    height: img.height(),
                });
            }
        }
        let panorama = match &image {
            Some(img) if !panorama_hint => {
                let sniffed = (self.probe)(img);
                if sniffed {
                    debug!("Panorama detected by probe");
                }
                sniffed
            }
            Some(_) => true,
            None => false,
        };
        self.publish_image(image, detections, panorama);
        Ok(())
    }

    /// Clear the view, e.g. when the layer owning the image goes away.
    pub fn clear(&self) {
        self.publish_image(None, Vec::new(), false);
    }

    fn publish_image(&self, image: Option<RgbaImage>, detections: Vec<Detection>, panorama: bool) {
        let cleared = image.is_none();

        {
            let mut surface = lock(&self.surface);
            if panorama {
                if let Some(s) = surface.as_mut() {
                    s.camera.set_yaw_pitch(0.0, 0.0);
                }
            }

            let mut state = write(&self.state);
            let display = state.display;
            let generation = state.generation + 1;
            let viewport = image
                .as_ref()
                .and_then(|img| self.build_viewport(image_size(img), display, panorama));
            if let Some(img) = &image {
                info!(
                    width = img.width(),
                    height = img.height(),
                    panorama,
                    detections = detections.len(),
                    "Image set"
                );
            }
            *state = Arc::new(ViewState {
                image: image.map(Arc::new),
                panorama,
                detections: detections.into(),
                viewport,
                display,
                generation,
            });
        }

        self.notify(if cleared {
            ViewChange::ImageCleared
        } else {
            ViewChange::ImageReplaced
        });
    }

    /// The display area changed size: reallocate the offscreen buffer,
    /// rebuild the camera plane and re-fit the visible rectangle.
    pub fn resize(&self, width: u32, height: u32) {
        let size = Size::new(
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );
        {
            let mut surface = lock(&self.surface);
            let rotation = surface
                .as_ref()
                .map(|s| (s.camera.yaw(), s.camera.pitch()));
            *surface = if size.is_empty() {
                None
            } else {
                match CameraPlane::new(size, self.config.field_of_view_deg) {
                    Ok(mut camera) => {
                        if let Some((yaw, pitch)) = rotation {
                            camera.set_yaw_pitch(yaw, pitch);
                        }
                        Some(DisplaySurface {
                            offscreen: RgbaImage::new(width, height),
                            camera,
                        })
                    }
                    Err(e) => {
                        warn!(error = %e, "Camera plane unavailable");
                        None
                    }
                }
            };

            let mut guard = write(&self.state);
            let state = Arc::make_mut(&mut *guard);
            state.display = size;
            let bounds = match (&state.image, state.panorama) {
                (Some(_), true) => Some(size),
                (Some(img), false) => Some(image_size(img)),
                (None, _) => None,
            };
            if let Some(bounds) = bounds {
                match state.viewport.as_mut() {
                    Some(viewport) => viewport.resize(size, bounds),
                    None => {
                        state.viewport = Viewport::new(bounds, size, self.config.zoom).ok();
                    }
                }
            }
        }
        info!(width, height, "Display area resized");
        self.notify(ViewChange::Resized);
    }

    pub fn display_size(&self) -> Size {
        read(&self.state).display
    }

    pub fn visible_rect(&self) -> Option<Rect> {
        read(&self.state).viewport.as_ref().map(Viewport::visible)
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        read(&self.state).viewport.as_ref().and_then(Viewport::selection)
    }

    /// Display-area rectangle the visible rectangle is drawn into.
    pub fn draw_target(&self) -> Option<Rect> {
        let view = self.snapshot();
        let viewport = view.viewport.as_ref()?;
        if view.panorama {
            Some(viewport.display().to_rect()).filter(|r| !r.is_empty())
        } else {
            viewport.draw_rect()
        }
    }

    /// Current `(yaw, pitch)` of the panorama camera, in radians.
    pub fn camera_rotation(&self) -> Option<(f64, f64)> {
        lock(&self.surface)
            .as_ref()
            .map(|s| (s.camera.yaw(), s.camera.pitch()))
    }

    /// How shape coordinates map to the screen right now.
    pub fn projector(&self) -> Option<Projector> {
        self.projector_for(&self.snapshot())
    }

    /// How shape coordinates of `view` map to the screen.
    ///
    /// The camera only takes part when `view` is a panorama, and only while
    /// its plane still matches the display area `view` was laid out for.
    pub fn projector_for(&self, view: &ViewState) -> Option<Projector> {
        let viewport = view.viewport.as_ref()?;
        if view.panorama {
            let camera = lock(&self.surface).as_ref()?.camera.basis();
            panorama_projector(viewport, camera)
        } else {
            flat_projector(viewport)
        }
    }

    /// Screen-space outline of one detection, recomputed on every call.
    pub fn project_detection<'a>(&self, detection: &'a Detection) -> Option<ProjectedPath<'a>> {
        Some(ProjectedPath::new(detection, self.projector()?))
    }

    /// Outlines of every detection of `view`, or nothing when detections
    /// are switched off.
    pub fn projected_detections<'a>(&self, view: &'a ViewState) -> Vec<ProjectedPath<'a>> {
        if !self.config.show_detections {
            return Vec::new();
        }
        self.overlay(view, self.projector_for(view))
    }

    /// Prepare the current frame and hand it to `paint`.
    ///
    /// In panorama mode the camera view is mapped into the offscreen buffer
    /// first. No lock is held while `paint` runs, and the frame's detection
    /// outlines come from the same view state as its raster. Returns `None`
    /// when there is nothing to draw.
    pub fn render<R>(&self, paint: impl FnOnce(&RenderFrame<'_>) -> R) -> Option<R> {
        let (view, mapped) = {
            let mut surface = lock(&self.surface);
            let view = self.snapshot();
            let mapped = match (view.panorama, view.image.as_deref(), surface.as_mut()) {
                (true, Some(image), Some(s)) => {
                    let (width, height) = offscreen_dimensions(&s.camera);
                    let mut buffer = std::mem::replace(&mut s.offscreen, RgbaImage::new(0, 0));
                    if buffer.dimensions() != (width, height) {
                        buffer = RgbaImage::new(width, height);
                    }
                    s.camera.mapping(image, &mut buffer);
                    Some((buffer, s.camera.basis()))
                }
                _ => None,
            };
            (view, mapped)
        };

        if view.panorama {
            let (buffer, camera) = mapped?;
            let result = view.viewport.as_ref().map(|viewport| {
                let frame = RenderFrame {
                    source: &buffer,
                    source_rect: viewport.visible(),
                    target: viewport.display().to_rect(),
                    selection: None,
                    panorama: true,
                    detections: self.overlay(&view, panorama_projector(viewport, camera)),
                };
                paint(&frame)
            });
            self.restore_offscreen(buffer);
            result
        } else {
            let image = view.image.as_deref()?;
            let viewport = view.viewport.as_ref()?;
            let selection = viewport.selection().and_then(|s| {
                let top_left = viewport.image_to_screen(Point::new(s.x, s.y))?;
                let bottom_right = viewport.image_to_screen(Point::new(s.right(), s.bottom()))?;
                Some(Rect::from_corners(top_left, bottom_right))
            });
            let frame = RenderFrame {
                source: image,
                source_rect: viewport.visible(),
                target: viewport.draw_rect()?,
                selection,
                panorama: false,
                detections: self.overlay(&view, flat_projector(viewport)),
            };
            Some(paint(&frame))
        }
    }

    pub fn zoom_at(&self, direction: ZoomDirection, anchor_image: Point, anchor_screen: Point) -> bool {
        self.update_viewport(ViewChange::ViewportChanged, |vp| {
            vp.cancel_selection();
            vp.zoom(direction, anchor_image, anchor_screen);
        })
    }

    pub fn pan_by(&self, delta: Point) -> bool {
        self.update_viewport(ViewChange::ViewportChanged, |vp| vp.pan(delta))
    }

    pub fn center_on(&self, target: Point) -> bool {
        self.update_viewport(ViewChange::ViewportChanged, |vp| vp.center_on(target))
    }

    pub fn zoom_best_fit_or_one(&self) -> bool {
        self.update_viewport(ViewChange::ViewportChanged, Viewport::zoom_best_fit_or_one)
    }

    /// Show the whole offscreen buffer again (panorama 1:1).
    pub fn reset_zoom(&self) -> bool {
        self.update_viewport(ViewChange::ViewportChanged, Viewport::reset_to_full)
    }

    pub fn begin_selection(&self, anchor: Point) -> bool {
        self.update_viewport(ViewChange::SelectionChanged, |vp| vp.begin_selection(anchor))
    }

    pub fn update_selection(&self, current: Point) -> bool {
        self.update_viewport(ViewChange::SelectionChanged, |vp| vp.update_selection(current))
    }

    pub fn commit_selection(&self) -> bool {
        self.update_viewport(ViewChange::ViewportChanged, |vp| {
            vp.commit_selection();
        })
    }

    pub fn cancel_selection(&self) -> bool {
        self.update_viewport(ViewChange::SelectionChanged, |vp| {
            vp.cancel_selection();
        })
    }

    pub fn rotate_from_delta(&self, from: Point, to: Point) -> bool {
        self.update_camera(|camera| camera.set_rotation_from_delta(from, to))
    }

    /// Turn the camera towards the given offscreen-buffer point.
    pub fn rotate_towards(&self, screen: Point) -> bool {
        self.update_camera(|camera| camera.set_rotation(screen))
    }

    pub fn set_camera_rotation(&self, yaw: f64, pitch: f64) -> bool {
        self.update_camera(|camera| camera.set_yaw_pitch(yaw, pitch))
    }

    fn overlay<'a>(&self, view: &'a ViewState, projector: Option<Projector>) -> Vec<ProjectedPath<'a>> {
        match projector {
            Some(projector) if self.config.show_detections => view
                .detections
                .iter()
                .map(|d| ProjectedPath::new(d, projector))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Hand the mapped buffer back unless the surface was rebuilt meanwhile.
    fn restore_offscreen(&self, buffer: RgbaImage) {
        let mut surface = lock(&self.surface);
        if let Some(s) = surface.as_mut() {
            if s.offscreen.dimensions() == (0, 0)
                && buffer.dimensions() == offscreen_dimensions(&s.camera)
            {
                s.offscreen = buffer;
            }
        }
    }

    fn build_viewport(&self, image: Size, display: Size, panorama: bool) -> Option<Viewport> {
        let bounds = if panorama { display } else { image };
        Viewport::new(bounds, display, self.config.zoom).ok()
    }

    fn update_viewport(&self, change: ViewChange, f: impl FnOnce(&mut Viewport)) -> bool {
        let changed = {
            let mut guard = write(&self.state);
            let state = Arc::make_mut(&mut *guard);
            match state.viewport.as_mut() {
                Some(viewport) => {
                    let before = viewport.clone();
                    f(viewport);
                    *viewport != before
                }
                None => false,
            }
        };
        if changed {
            self.notify(change);
        }
        changed
    }

    fn update_camera(&self, f: impl FnOnce(&mut CameraPlane)) -> bool {
        let changed = {
            let mut surface = lock(&self.surface);
            match surface.as_mut() {
                Some(s) => {
                    let before = (s.camera.yaw(), s.camera.pitch());
                    f(&mut s.camera);
                    (s.camera.yaw(), s.camera.pitch()) != before
                }
                None => false,
            }
        };
        if changed {
            self.notify(ViewChange::CameraRotated);
        }
        changed
    }

    fn notify(&self, change: ViewChange) {
        lock(&self.listeners).retain(|tx| tx.send(change).is_ok());
    }
}

fn flat_projector(viewport: &Viewport) -> Option<Projector> {
    let size = viewport.bounds();
    let upper_left = viewport.image_to_screen(Point::new(0, 0))?;
    let lower_right = viewport.image_to_screen(Point::new(size.width, size.height))?;
    Some(Projector::Flat {
        scale: DVec2::new(
            f64::from(lower_right.x - upper_left.x),
            f64::from(lower_right.y - upper_left.y),
        ),
        offset: DVec2::new(f64::from(upper_left.x), f64::from(upper_left.y)),
    })
}

/// `None` when the camera plane no longer covers the viewport's display area.
fn panorama_projector(viewport: &Viewport, camera: CameraBasis) -> Option<Projector> {
    let display = viewport.display();
    if (camera.width, camera.height) != (display.width, display.height) {
        return None;
    }
    let visible = viewport.visible();
    let scale = DVec2::new(
        f64::from(display.width) / f64::from(visible.width),
        f64::from(display.height) / f64::from(visible.height),
    );
    let offset = -DVec2::new(f64::from(visible.x), f64::from(visible.y)) * scale;
    Some(Projector::Panorama {
        camera,
        scale,
        offset,
    })
}

fn offscreen_dimensions(camera: &CameraPlane) -> (u32, u32) {
    let Size { width, height } = camera.size();
    (
        u32::try_from(width).unwrap_or(0),
        u32::try_from(height).unwrap_or(0),
    )
}

fn image_size(image: &RgbaImage) -> Size {
    Size::new(
        i32::try_from(image.width()).unwrap_or(i32::MAX),
        i32::try_from(image.height()).unwrap_or(i32::MAX),
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
