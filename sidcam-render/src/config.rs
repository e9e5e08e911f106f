//! Render configuration.
//!
//! Every field has a default, so a JSON file only needs to list what it
//! changes:
//!
//! ```json
//! { "image_height": 480, "image_width": 640, "light": { "location": [0, 0, -2] } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sidcam_core::ProjectionModel;

use crate::error::{RenderError, RenderResult};

/// Point light with Phong colour terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    /// Light position in world coordinates.
    pub location: [f64; 3],
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            location: [0.0, 0.0, -1.0],
            ambient: [0.5; 3],
            diffuse: [0.3; 3],
            specular: [0.2; 3],
        }
    }
}

/// Settings for [`Visualiser`](crate::Visualiser).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub image_height: u32,
    pub image_width: u32,
    pub projection: ProjectionModel,
    pub light: PointLight,
    /// Specular exponent.
    pub shininess: f32,
    /// Vertex colour applied to the scene object.
    pub base_color: [f32; 3],
    /// Colour of pixels no triangle covers (alpha is always 0 there).
    pub background: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_height: 480,
            image_width: 640,
            projection: ProjectionModel::Perspective,
            light: PointLight::default(),
            shininess: 64.0,
            base_color: [1.0, 1.0, 0.5],
            background: [1.0, 1.0, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn new(image_height: u32, image_width: u32) -> Self {
        Self {
            image_height,
            image_width,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let data = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RenderResult<()> {
        if self.image_height == 0 || self.image_width == 0 {
            return Err(RenderError::InvalidImageSize {
                width: self.image_width,
                height: self.image_height,
            });
        }
        Ok(())
    }
}
