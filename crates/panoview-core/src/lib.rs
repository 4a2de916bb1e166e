pub mod camera;
pub mod config;
pub mod consts;
pub mod controller;
pub mod detection;
pub mod display;
pub mod error;
pub mod geometry;
pub mod probe;
pub mod projection;
pub mod viewport;
