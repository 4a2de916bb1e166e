use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Field of view must be within (0, 180) degrees, got {0}")]
    InvalidFieldOfView(f64),

    #[error("Invalid viewer config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
