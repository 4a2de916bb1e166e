pub mod state;
pub mod transform;

pub use state::{Viewport, ZoomDirection};
pub use transform::{compute_draw_rect, image_to_screen, screen_to_image};
