//! Error types for the camera model and mesh loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`CameraModel`](crate::CameraModel) and the projection helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    /// A matrix has the wrong dimensions for the field it was written to.
    #[error("{field} must be a {}x{} matrix, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    Shape {
        field: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The value is not a dense numeric matrix.
    #[error("expected {field} as a dense matrix, got {found}")]
    Type { field: &'static str, found: String },

    /// An operation needs a field that has not been set yet.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A read accessor was called before the field was ever written.
    #[error("{0} is not set")]
    UnsetField(&'static str),

    /// Matrix inversion failed or the matrix is too close to singular.
    #[error("numeric error: {0}")]
    Numeric(String),

    /// The requested projection model is not implemented.
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Errors raised while loading or preparing a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("mesh file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to parse mesh: {0}")]
    Parse(String),

    /// Vertex scale must be finite and non-zero.
    #[error("invalid vertex scale: {0}")]
    InvalidScale(f32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for camera operations.
pub type CameraResult<T> = std::result::Result<T, CameraError>;

/// Result type for mesh operations.
pub type MeshResult<T> = std::result::Result<T, MeshError>;
