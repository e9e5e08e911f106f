/// sidcam core library - camera parameter model and scene geometry
///
/// This library holds the per-camera pose and intrinsics state, the
/// projection math a renderer needs from it, and mesh loading for the single
/// scene object.

pub mod camera;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod mesh_io;
pub mod obj;
pub mod projection;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use camera::{CameraModel, CameraParams, Slot};
pub use error::{CameraError, CameraResult, MeshError, MeshResult};
pub use geometry::{Mesh, Triangle, Vertex};
pub use matrix::IntoDenseMatrix;
pub use mesh_io::{load_mesh, MeshFormat};
pub use projection::{extended_intrinsics, PerspectiveCamera, ProjectionModel, ScreenPoint};
pub use transform::RotationState;
