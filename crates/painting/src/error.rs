//! Error types for texture and project operations.

use thiserror::Error;

/// Errors raised by pixel buffer construction and image I/O.
///
/// Out-of-range pixel coordinates are never reported here: reads return
/// transparent and writes are dropped.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Invalid texture dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    #[error("Pixel data length {actual} does not match {expected} bytes")]
    BufferSize { expected: usize, actual: usize },

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while saving or loading a layered project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to (de)serialize project manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("Invalid project manifest: {0}")]
    InvalidManifest(String),
}
