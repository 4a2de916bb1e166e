//! Vector math for equirectangular panoramas.
//!
//! Camera space is x right, y down, z forward. World-forward `(0, 0, 1)`
//! corresponds to the centre of the equirectangular texture.

pub mod plane;
pub mod uv;

pub use plane::{project_to_plane, CameraBasis};
pub use uv::{spherical_to_vector, texture_coordinate};
