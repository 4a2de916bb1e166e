use std::sync::Arc;

use image::RgbaImage;

use crate::consts::EQUIRECTANGULAR_ASPECT_TOLERANCE;

/// Capability deciding whether a raster is an equirectangular panorama.
///
/// Supplied by whoever can inspect image metadata; the engine only calls it.
pub type PanoramaProbe = Arc<dyn Fn(&RgbaImage) -> bool + Send + Sync>;

/// Shape heuristic: a 360x180 degree image is twice as wide as it is high.
pub fn is_equirectangular(image: &RgbaImage) -> bool {
    let (w, h) = image.dimensions();
    if h == 0 {
        return false;
    }
    let ratio = f64::from(w) / f64::from(h);
    (ratio - 2.0).abs() <= 2.0 * EQUIRECTANGULAR_ASPECT_TOLERANCE
}

/// Probe used when no metadata collaborator is supplied.
pub fn default_probe() -> PanoramaProbe {
    Arc::new(is_equirectangular)
}
