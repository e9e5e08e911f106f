/// Projection models and the perspective camera used by the renderer
use std::fmt;
use std::str::FromStr;

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::{CameraError, CameraResult};

/// Points closer to the camera plane than this are not projected.
pub const NEAR_EPSILON: f64 = 1e-6;

/// Projection model for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionModel {
    #[default]
    Perspective,
    Orthographic,
}

impl fmt::Display for ProjectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionModel::Perspective => write!(f, "perspective"),
            ProjectionModel::Orthographic => write!(f, "orthographic"),
        }
    }
}

impl FromStr for ProjectionModel {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "perspective" => Ok(ProjectionModel::Perspective),
            "orthographic" => Ok(ProjectionModel::Orthographic),
            other => Err(CameraError::NotSupported(format!(
                "projection {other} not implemented"
            ))),
        }
    }
}

/// Embed a 3x3 intrinsics matrix into the 4x4 form used for projection.
///
/// For the perspective model the result maps a camera-space point
/// `[x, y, z, 1]` to `[fx*x + cx*z, fy*y + cy*z, 1, z]`, so that dividing by
/// the last component yields pixel coordinates and inverse depth.
pub fn extended_intrinsics(k: &Matrix3<f64>, model: ProjectionModel) -> CameraResult<Matrix4<f64>> {
    match model {
        ProjectionModel::Perspective => {
            let mut ext = Matrix4::zeros();
            ext.fixed_view_mut::<3, 3>(0, 0).copy_from(k);
            ext[(2, 2)] = 0.0;
            ext[(2, 3)] = 1.0;
            ext[(3, 2)] = 1.0;
            Ok(ext)
        }
        other => Err(CameraError::NotSupported(format!(
            "projection {other} not implemented"
        ))),
    }
}

/// A projected point in pixel coordinates (x right, y down) with its
/// camera-space depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Perspective camera in screen space, built from a w2c rotation and
/// translation plus extended intrinsics.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    pub k_ext: Matrix4<f64>,
    pub image_height: u32,
    pub image_width: u32,
}

impl PerspectiveCamera {
    pub fn new(
        rotation: Matrix3<f64>,
        translation: Vector3<f64>,
        k_ext: Matrix4<f64>,
        image_height: u32,
        image_width: u32,
    ) -> Self {
        Self {
            rotation,
            translation,
            k_ext,
            image_height,
            image_width,
        }
    }

    /// Transform a world point into camera coordinates.
    pub fn to_camera(&self, p_world: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * p_world + self.translation
    }

    /// Camera position in world coordinates.
    pub fn center(&self) -> Vector3<f64> {
        -(self.rotation.transpose() * self.translation)
    }

    /// Project a world point to screen space.
    ///
    /// Returns `None` for points at or behind the camera plane.
    pub fn project(&self, p_world: &Vector3<f64>) -> Option<ScreenPoint> {
        let p_cam = self.to_camera(p_world);
        let clip = self.k_ext * Vector4::new(p_cam.x, p_cam.y, p_cam.z, 1.0);

        // w carries camera depth
        if clip.w <= NEAR_EPSILON {
            return None;
        }

        Some(ScreenPoint {
            x: clip.x / clip.w,
            y: clip.y / clip.w,
            depth: clip.w,
        })
    }

    /// Whether a screen point falls inside the image.
    pub fn in_bounds(&self, point: &ScreenPoint) -> bool {
        point.x >= 0.0
            && point.y >= 0.0
            && point.x < f64::from(self.image_width)
            && point.y < f64::from(self.image_height)
    }
}
