//! Rendering error types.

use sidcam_core::{CameraError, MeshError};
use thiserror::Error;

/// Errors that can occur while preparing or rendering the scene.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Camera parameters were missing or invalid.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// The mesh could not be loaded or prepared.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Projection model or scene layout the renderer does not handle.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// No object has been added to the scene.
    #[error("scene has no object to render")]
    EmptyScene,

    /// Image dimensions must be non-zero.
    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    /// Failed to encode or write the output image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or camera file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
