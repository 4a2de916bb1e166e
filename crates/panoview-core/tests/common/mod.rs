#![allow(dead_code)]

use image::{Rgba, RgbaImage};

use panoview_core::config::ViewerConfig;
use panoview_core::display::ImageDisplay;
use panoview_core::geometry::Point;

/// Image whose every pixel encodes its own coordinates.
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256 + y / 256) % 256) as u8, 255])
    })
}

pub fn solid_image(width: u32, height: u32, value: u8) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([value, value, value, 255]))
}

/// Display sized `width x height` showing a flat `image_w x image_h` image.
pub fn flat_display(width: u32, height: u32, image_w: u32, image_h: u32) -> ImageDisplay {
    let display = ImageDisplay::new(ViewerConfig::default()).unwrap();
    display.resize(width, height);
    display
        .set_image(Some(solid_image(image_w, image_h, 128)), Vec::new(), false)
        .unwrap();
    display
}

/// Display sized `width x height` showing a 2:1 panorama.
pub fn panorama_display(width: u32, height: u32) -> ImageDisplay {
    let display = ImageDisplay::new(ViewerConfig::default()).unwrap();
    display.resize(width, height);
    display
        .set_image(Some(gradient_image(512, 256)), Vec::new(), true)
        .unwrap();
    display
}

pub fn pt(x: i32, y: i32) -> Point {
    Point::new(x, y)
}
