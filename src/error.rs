use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("No image loaded")]
    NotLoaded,

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
