use std::path::Path;

use console::Style;
use panoview_core::geometry::Rect;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    mode: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            mode: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub struct RenderSummary<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub image_size: (u32, u32),
    pub display_size: (u32, u32),
    pub panorama: bool,
    pub visible: Option<Rect>,
    pub draw_target: Option<Rect>,
    /// `(yaw, pitch)` in radians, panoramas only.
    pub camera: Option<(f64, f64)>,
    pub events: usize,
    pub detections: usize,
    pub projected: usize,
}

pub fn print_render_summary(summary: &RenderSummary<'_>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Panoview Render"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(summary.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(summary.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Mode"),
        s.mode.apply_to(if summary.panorama { "panorama" } else { "flat" })
    );
    println!();

    println!("  {}", s.header.apply_to("Viewport"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Image"),
        s.value
            .apply_to(format!("{}x{}", summary.image_size.0, summary.image_size.1))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Display"),
        s.value
            .apply_to(format!("{}x{}", summary.display_size.0, summary.display_size.1))
    );
    print_rect(&s, "Visible", summary.visible);
    print_rect(&s, "Draw target", summary.draw_target);
    if let Some((yaw, pitch)) = summary.camera {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Camera"),
            s.value.apply_to(format!(
                "yaw {:.1}°, pitch {:.1}°",
                yaw.to_degrees(),
                pitch.to_degrees()
            ))
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Input"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Gestures"),
        s.value.apply_to(summary.events)
    );
    if summary.detections == 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Detections"),
            s.disabled.apply_to("none")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Detections"),
            s.value
                .apply_to(format!("{} ({} drawn)", summary.detections, summary.projected))
        );
    }
    println!();
}

fn print_rect(s: &Styles, label: &str, rect: Option<Rect>) {
    let text = match rect {
        Some(r) => format!("{}x{} at ({}, {})", r.width, r.height, r.x, r.y),
        None => "n/a".to_string(),
    };
    println!("    {:<12}{}", s.label.apply_to(label), s.value.apply_to(text));
}
