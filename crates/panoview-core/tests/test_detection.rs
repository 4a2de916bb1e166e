use glam::DVec2;

use panoview_core::config::ViewerConfig;
use panoview_core::detection::{Detection, PathSegment, ProjectedPath, Projector};
use panoview_core::display::ImageDisplay;
use panoview_core::geometry::Rect;
use panoview_core::viewport::ZoomDirection;

mod common;
use common::{gradient_image, pt, solid_image};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn square(value: &str) -> Detection {
    Detection::new(
        value,
        true,
        vec![
            PathSegment::MoveTo(DVec2::new(0.25, 0.25)),
            PathSegment::LineTo(DVec2::new(0.75, 0.25)),
            PathSegment::LineTo(DVec2::new(0.75, 0.75)),
            PathSegment::LineTo(DVec2::new(0.25, 0.75)),
            PathSegment::Close,
        ],
    )
}

fn display_with(config: ViewerConfig, panorama: bool, detections: Vec<Detection>) -> ImageDisplay {
    let display = ImageDisplay::new(config).unwrap();
    display.resize(800, 600);
    let image = if panorama {
        gradient_image(512, 256)
    } else {
        solid_image(1600, 900, 0)
    };
    display.set_image(Some(image), detections, panorama).unwrap();
    display
}

fn end_points(path: &ProjectedPath<'_>) -> Vec<DVec2> {
    path.segments().filter_map(|s| s.end_point()).collect()
}

// ---------------------------------------------------------------------------
// Flat projection
// ---------------------------------------------------------------------------

#[test]
fn test_flat_projection_follows_draw_rect() {
    let display = display_with(ViewerConfig::default(), false, vec![square("stop")]);
    let view = display.snapshot();
    let paths = display.projected_detections(&view);
    assert_eq!(paths.len(), 1);

    let segments: Vec<PathSegment> = paths[0].segments().collect();
    assert_eq!(segments.len(), 5);
    assert_eq!(segments[0], PathSegment::MoveTo(DVec2::new(200.0, 187.5)));
    assert_eq!(segments[2], PathSegment::LineTo(DVec2::new(600.0, 412.5)));
    assert_eq!(segments[4], PathSegment::Close);
    assert_eq!(paths[0].bounds(), Some(Rect::new(200, 187, 400, 226)));
}

#[test]
fn test_flat_projection_tracks_zoom() {
    let display = display_with(ViewerConfig::default(), false, vec![square("stop")]);
    let detection = square("stop");
    let before = end_points(&display.project_detection(&detection).unwrap());
    display.zoom_best_fit_or_one();
    let after = end_points(&display.project_detection(&detection).unwrap());
    // 1:1 around the image center doubles the on-screen size.
    let width_before = before[1].x - before[0].x;
    let width_after = after[1].x - after[0].x;
    assert_eq!(width_after, 2.0 * width_before);
}

#[test]
fn test_curves_keep_control_points_in_flat_mode() {
    let projector = Projector::Flat {
        scale: DVec2::new(100.0, 50.0),
        offset: DVec2::new(10.0, 20.0),
    };
    let detection = Detection::new(
        "curve",
        false,
        vec![
            PathSegment::MoveTo(DVec2::ZERO),
            PathSegment::QuadTo(DVec2::new(0.5, 1.0), DVec2::ONE),
        ],
    );
    let segments: Vec<_> = ProjectedPath::new(&detection, projector).into_iter().collect();
    assert_eq!(
        segments[1],
        PathSegment::QuadTo(DVec2::new(60.0, 70.0), DVec2::new(110.0, 70.0))
    );
}

#[test]
fn test_segments_are_restartable() {
    let display = display_with(ViewerConfig::default(), false, vec![square("a")]);
    let view = display.snapshot();
    let paths = display.projected_detections(&view);
    let first: Vec<_> = paths[0].segments().collect();
    let second: Vec<_> = paths[0].segments().collect();
    assert_eq!(first, second);
}

#[test]
fn test_hidden_detections_are_not_projected() {
    let config = ViewerConfig {
        show_detections: false,
        ..ViewerConfig::default()
    };
    let display = display_with(config, false, vec![square("a"), square("b")]);
    let view = display.snapshot();
    assert_eq!(view.detections().len(), 2);
    assert!(display.projected_detections(&view).is_empty());
}

#[test]
fn test_no_projection_without_image() {
    let display = ImageDisplay::new(ViewerConfig::default()).unwrap();
    assert!(display.projector().is_none());
    assert!(display.project_detection(&square("a")).is_none());
}

#[test]
fn test_snapshot_projection_survives_image_swap() {
    let display = display_with(ViewerConfig::default(), false, vec![square("stop")]);
    let view = display.snapshot();
    display
        .set_image(Some(gradient_image(512, 256)), Vec::new(), true)
        .unwrap();

    let paths = display.projected_detections(&view);
    assert_eq!(paths.len(), 1);
    assert_eq!(
        paths[0].segments().next(),
        Some(PathSegment::MoveTo(DVec2::new(200.0, 187.5)))
    );
    assert!(matches!(display.projector_for(&view), Some(Projector::Flat { .. })));
    assert!(matches!(display.projector(), Some(Projector::Panorama { .. })));
}

#[test]
fn test_render_frame_carries_detections() {
    let display = display_with(ViewerConfig::default(), false, vec![square("stop")]);
    let first = display
        .render(|f| {
            f.detections
                .iter()
                .map(|p| p.segments().next())
                .collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(first, vec![Some(PathSegment::MoveTo(DVec2::new(200.0, 187.5)))]);

    let config = ViewerConfig {
        show_detections: false,
        ..ViewerConfig::default()
    };
    let hidden = display_with(config, false, vec![square("stop")]);
    assert_eq!(hidden.render(|f| f.detections.len()), Some(0));
}

// ---------------------------------------------------------------------------
// Panorama projection
// ---------------------------------------------------------------------------

#[test]
fn test_panorama_forward_point_at_center() {
    let detection = Detection::new(
        "dot",
        false,
        vec![PathSegment::MoveTo(DVec2::new(0.5, 0.5))],
    );
    let display = display_with(ViewerConfig::default(), true, Vec::new());
    let points = end_points(&display.project_detection(&detection).unwrap());
    assert_eq!(points.len(), 1);
    assert!((points[0] - DVec2::new(400.0, 300.0)).length() < 1e-6);
}

#[test]
fn test_panorama_breaks_path_behind_camera() {
    let detection = Detection::new(
        "wrap",
        false,
        vec![
            PathSegment::MoveTo(DVec2::new(0.5, 0.5)),
            PathSegment::LineTo(DVec2::new(0.0, 0.5)),
            PathSegment::LineTo(DVec2::new(0.52, 0.5)),
            PathSegment::LineTo(DVec2::new(0.52, 0.45)),
        ],
    );
    let display = display_with(ViewerConfig::default(), true, Vec::new());
    let segments: Vec<_> = display.project_detection(&detection).unwrap().segments().collect();
    assert_eq!(segments.len(), 3);
    assert!(matches!(segments[0], PathSegment::MoveTo(_)));
    assert!(matches!(segments[1], PathSegment::MoveTo(p) if p.x > 400.0));
    assert!(matches!(segments[2], PathSegment::LineTo(p) if p.y < 300.0));
}

#[test]
fn test_panorama_curves_become_lines() {
    let detection = Detection::new(
        "curve",
        false,
        vec![
            PathSegment::MoveTo(DVec2::new(0.49, 0.5)),
            PathSegment::CubicTo(
                DVec2::new(0.0, 0.0),
                DVec2::new(0.0, 0.0),
                DVec2::new(0.51, 0.5),
            ),
            PathSegment::Close,
            PathSegment::LineTo(DVec2::new(0.5, 0.49)),
        ],
    );
    let display = display_with(ViewerConfig::default(), true, Vec::new());
    let segments: Vec<_> = display.project_detection(&detection).unwrap().segments().collect();
    assert_eq!(segments.len(), 3);
    assert!(matches!(segments[1], PathSegment::LineTo(_)));
    // Close lifts the pen.
    assert!(matches!(segments[2], PathSegment::MoveTo(_)));
}

#[test]
fn test_panorama_projection_follows_camera() {
    let detection = Detection::new(
        "dot",
        false,
        vec![PathSegment::MoveTo(DVec2::new(0.5, 0.5))],
    );
    let display = display_with(ViewerConfig::default(), true, Vec::new());
    display.set_camera_rotation(std::f64::consts::PI, 0.0);
    assert!(display
        .project_detection(&detection)
        .unwrap()
        .segments()
        .next()
        .is_none());
}

#[test]
fn test_panorama_projection_follows_wheel_zoom() {
    let detection = Detection::new(
        "dot",
        false,
        vec![PathSegment::MoveTo(DVec2::new(0.5, 0.5))],
    );
    let display = display_with(ViewerConfig::default(), true, Vec::new());
    // Zoom towards the top-left corner of the buffer.
    display.zoom_at(ZoomDirection::In, pt(0, 0), pt(0, 0));
    assert_eq!(display.visible_rect(), Some(Rect::new(0, 0, 533, 400)));
    let p = end_points(&display.project_detection(&detection).unwrap())[0];
    assert!((p.x - 800.0 / 533.0 * 400.0).abs() < 1e-6, "{p:?}");
    assert!((p.y - 450.0).abs() < 1e-6, "{p:?}");
}

#[test]
fn test_detections_from_toml() {
    #[derive(serde::Deserialize)]
    struct File {
        detections: Vec<Detection>,
    }
    let file: File = toml::from_str(
        r#"
        [[detections]]
        value = "regulatory--stop--g1"
        traffic_sign = true
        shape = [
            { move_to = [0.1, 0.2] },
            { line_to = [0.3, 0.2] },
            "close",
        ]
        "#,
    )
    .unwrap();
    let d = &file.detections[0];
    assert!(d.traffic_sign);
    assert_eq!(d.shape.len(), 3);
    assert_eq!(d.shape[0], PathSegment::MoveTo(DVec2::new(0.1, 0.2)));
    assert_eq!(d.shape[2], PathSegment::Close);
}

#[test]
fn test_stale_panorama_snapshot_is_not_projected_after_resize() {
    let display = display_with(ViewerConfig::default(), true, vec![square("a")]);
    let view = display.snapshot();
    display.resize(640, 480);
    assert!(display.projector_for(&view).is_none());
    assert!(display.projected_detections(&view).is_empty());
    assert!(display.projector_for(&display.snapshot()).is_some());
}

#[test]
fn test_panorama_render_projects_its_own_frame() {
    let detection = Detection::new(
        "dot",
        false,
        vec![PathSegment::MoveTo(DVec2::new(0.5, 0.5))],
    );
    let display = display_with(ViewerConfig::default(), true, vec![detection]);
    let point = display
        .render(|f| f.detections[0].segments().next().and_then(|s| s.end_point()))
        .unwrap()
        .unwrap();
    assert!((point - DVec2::new(400.0, 300.0)).length() < 1e-6);
}
