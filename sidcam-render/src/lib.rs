/// sidcam renderer - draws the scene object as seen by a camera model
///
/// A CPU rasterizer that consumes only the rotation, translation and
/// intrinsics of a `CameraModel`, with PNG and terminal output.

pub mod app;
pub mod config;
pub mod error;
pub mod frame;
pub mod renderer;
pub mod visualiser;

pub use app::TerminalApp;
pub use config::{PointLight, RenderConfig};
pub use error::{RenderError, RenderResult};
pub use frame::RenderedImage;
pub use renderer::{Rasterizer, Shading, TexturedMesh};
pub use visualiser::Visualiser;
