use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use image::{imageops, Rgba, RgbaImage};
use panoview_core::config::ViewerConfig;
use panoview_core::controller::{InteractionController, PointerEvent};
use panoview_core::detection::Detection;
use panoview_core::display::{ImageDisplay, RenderFrame};
use serde::Deserialize;
use tracing::{debug, info};

use crate::draw::{draw_path, draw_rect_outline};
use crate::summary::{print_render_summary, RenderSummary};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const SELECTION_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SIGN_COLOR: Rgba<u8> = Rgba([255, 48, 48, 255]);
const DETECTION_COLOR: Rgba<u8> = Rgba([255, 210, 0, 255]);

#[derive(Args)]
pub struct RenderArgs {
    /// Input image file
    pub file: PathBuf,

    /// Viewer config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Display area width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Display area height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,

    /// Treat the image as a 360° panorama regardless of its shape
    #[arg(long)]
    pub panorama: bool,

    /// Detections file (TOML, `[[detections]]` entries)
    #[arg(long)]
    pub detections: Option<PathBuf>,

    /// Gesture script (TOML, `[[events]]` entries) replayed before rendering
    #[arg(long)]
    pub gestures: Option<PathBuf>,

    /// Initial panorama yaw in degrees
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub yaw: f64,

    /// Initial panorama pitch in degrees
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub pitch: f64,

    /// Output file path
    #[arg(short, long, default_value = "view.png")]
    pub output: PathBuf,
}

#[derive(Debug, Deserialize)]
struct DetectionFile {
    #[serde(default)]
    detections: Vec<Detection>,
}

#[derive(Debug, Deserialize)]
struct GestureScript {
    #[serde(default)]
    events: Vec<PointerEvent>,
}

pub fn run(args: &RenderArgs) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        bail!("Display area must not be empty, got {}x{}", args.width, args.height);
    }
    let config = match args.config {
        Some(ref path) => load_config(path)?,
        None => ViewerConfig::default(),
    };
    let detections = match args.detections {
        Some(ref path) => load_detections(path)?,
        None => Vec::new(),
    };
    let events = match args.gestures {
        Some(ref path) => load_gestures(path)?,
        None => Vec::new(),
    };

    let image = image::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?
        .into_rgba8();
    let image_size = image.dimensions();

    let display = ImageDisplay::new(config).context("Invalid viewer config")?;
    display.resize(args.width, args.height);
    display.set_image(Some(image), detections, args.panorama)?;
    if args.yaw != 0.0 || args.pitch != 0.0 {
        display.set_camera_rotation(args.yaw.to_radians(), args.pitch.to_radians());
    }

    let mut controller = InteractionController::new();
    for event in &events {
        debug!(?event, "Replaying");
        controller.handle(&display, event);
    }

    let mut canvas = RgbaImage::from_pixel(args.width, args.height, BACKGROUND);
    let projected = display
        .render(|frame| {
            compose(&mut canvas, frame);
            draw_detections(&mut canvas, frame)
        })
        .context("Nothing to render")?;
    let view = display.snapshot();

    canvas
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "View saved");

    print_render_summary(&RenderSummary {
        input: &args.file,
        output: &args.output,
        image_size,
        display_size: (args.width, args.height),
        panorama: view.is_panorama(),
        visible: display.visible_rect(),
        draw_target: display.draw_target(),
        camera: display
            .camera_rotation()
            .filter(|_| view.is_panorama()),
        events: events.len(),
        detections: view.detections().len(),
        projected,
    });

    Ok(())
}

/// Scale the frame's source rectangle into its target rectangle on `canvas`.
fn compose(canvas: &mut RgbaImage, frame: &RenderFrame<'_>) {
    let src = frame.source_rect;
    let dst = frame.target;
    if src.is_empty() || dst.is_empty() {
        return;
    }
    let crop = imageops::crop_imm(
        frame.source,
        src.x as u32,
        src.y as u32,
        src.width as u32,
        src.height as u32,
    )
    .to_image();
    let scaled = if (src.width, src.height) == (dst.width, dst.height) {
        crop
    } else {
        imageops::resize(
            &crop,
            dst.width as u32,
            dst.height as u32,
            imageops::FilterType::Triangle,
        )
    };
    imageops::overlay(canvas, &scaled, i64::from(dst.x), i64::from(dst.y));
    if let Some(selection) = frame.selection {
        draw_rect_outline(canvas, selection, SELECTION_COLOR);
    }
}

/// Outline the frame's detections; returns how many were drawn.
fn draw_detections(canvas: &mut RgbaImage, frame: &RenderFrame<'_>) -> usize {
    for path in &frame.detections {
        let color = if path.detection().traffic_sign {
            SIGN_COLOR
        } else {
            DETECTION_COLOR
        };
        draw_path(canvas, path.segments(), color);
    }
    frame.detections.len()
}

fn load_config(path: &Path) -> Result<ViewerConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: ViewerConfig = toml::from_str(&contents).context("Invalid viewer config")?;
    config.validate()?;
    Ok(config)
}

fn load_detections(path: &Path) -> Result<Vec<Detection>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read detections {}", path.display()))?;
    let file: DetectionFile = toml::from_str(&contents).context("Invalid detections file")?;
    Ok(file.detections)
}

fn load_gestures(path: &Path) -> Result<Vec<PointerEvent>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read gestures {}", path.display()))?;
    let script: GestureScript = toml::from_str(&contents).context("Invalid gesture script")?;
    Ok(script.events)
}
