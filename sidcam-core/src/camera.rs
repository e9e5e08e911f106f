//! Per-camera pose and intrinsics state.
//!
//! A [`CameraModel`] holds three independently written fields: the
//! world-to-camera transform (`w2c`), its inverse (`c2w`) and the 3x3
//! intrinsics. Writing `w2c` does not update `c2w`; callers run
//! [`CameraModel::derive_c2w`] afterwards (or use [`CameraModel::setup`]).
//! Writing `c2w` explicitly through [`CameraModel::set_c2w`] overwrites `w2c`
//! with its inverse, treating the supplied `c2w` as ground truth.

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{CameraError, CameraResult};
use crate::matrix::{rows3, rows4, to_matrix3, to_matrix4, IntoDenseMatrix};
use crate::transform::decompose;

/// Determinants below this magnitude are treated as singular.
pub const SINGULAR_EPSILON: f64 = 1e-12;

/// Largest element-wise difference tolerated between a stored `c2w` and the
/// inverse of `w2c`, relative to the larger of 1 and the inverse's norm.
pub const INVERSE_TOLERANCE: f64 = 1e-9;

/// A field that is either unset or holds a value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Slot<T> {
    #[default]
    Unset,
    Set(T),
}

impl<T> Slot<T> {
    /// Borrow the value, or fail with [`CameraError::UnsetField`].
    pub fn get(&self, field: &'static str) -> CameraResult<&T> {
        match self {
            Slot::Set(value) => Ok(value),
            Slot::Unset => Err(CameraError::UnsetField(field)),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Set(_))
    }

    fn as_option(&self) -> Option<&T> {
        match self {
            Slot::Set(value) => Some(value),
            Slot::Unset => None,
        }
    }
}

/// Read-only snapshot of a camera's parameters, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub id: String,
    pub w2c: Option<[[f64; 4]; 4]>,
    pub c2w: Option<[[f64; 4]; 4]>,
    pub intrinsics: Option<[[f64; 3]; 3]>,
}

/// Pose and intrinsics of a single camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraModel {
    camera_id: String,
    w2c: Slot<Matrix4<f64>>,
    c2w: Slot<Matrix4<f64>>,
    intrinsics: Slot<Matrix3<f64>>,
}

impl CameraModel {
    /// Create a camera with no pose and no intrinsics.
    pub fn new(camera_id: impl Into<String>) -> Self {
        Self {
            camera_id: camera_id.into(),
            w2c: Slot::Unset,
            c2w: Slot::Unset,
            intrinsics: Slot::Unset,
        }
    }

    /// Rebuild a camera from a parameter snapshot.
    ///
    /// `w2c` is the source of truth when present and `c2w` is derived from
    /// it. A stored `c2w` must then agree with that inverse within
    /// [`INVERSE_TOLERANCE`], else the snapshot is rejected with
    /// [`CameraError::Precondition`]. A snapshot holding only `c2w` goes
    /// through [`CameraModel::set_c2w`].
    pub fn from_params(params: &CameraParams) -> CameraResult<Self> {
        let mut camera = Self::new(params.id.clone());
        if let Some(w2c) = params.w2c {
            camera.set_w2c(w2c)?;
            camera.derive_c2w()?;
            if let Some(stored) = params.c2w {
                let stored = to_matrix4(stored, "c2w")?;
                let derived = camera.c2w()?;
                let scale = derived.norm().max(1.0);
                if (stored - derived).amax() > INVERSE_TOLERANCE * scale {
                    return Err(CameraError::Precondition(
                        "stored c2w is not the inverse of w2c".to_string(),
                    ));
                }
            }
        } else if let Some(c2w) = params.c2w {
            camera.set_c2w(c2w)?;
        }
        if let Some(intrinsics) = params.intrinsics {
            camera.set_intrinsics(intrinsics)?;
        }
        Ok(camera)
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    /// Set pose and intrinsics in one go: `set_w2c`, `derive_c2w`,
    /// `set_intrinsics`, stopping at the first failure.
    pub fn setup<W, K>(&mut self, w2c: W, intrinsics: K) -> CameraResult<()>
    where
        W: IntoDenseMatrix,
        K: IntoDenseMatrix,
    {
        self.set_w2c(w2c)?;
        self.derive_c2w()?;
        self.set_intrinsics(intrinsics)
    }

    /// Store the world-to-camera transform. `c2w` is left untouched.
    pub fn set_w2c<M: IntoDenseMatrix>(&mut self, w2c: M) -> CameraResult<()> {
        let w2c = to_matrix4(w2c, "w2c")?;
        log::debug!("camera {}: w2c set", self.camera_id);
        self.w2c = Slot::Set(w2c);
        Ok(())
    }

    /// Compute `c2w` as the inverse of the stored `w2c`.
    pub fn derive_c2w(&mut self) -> CameraResult<()> {
        let w2c = match &self.w2c {
            Slot::Set(w2c) => w2c,
            Slot::Unset => {
                return Err(CameraError::Precondition(
                    "w2c must be set first".to_string(),
                ))
            }
        };
        let c2w = invert(w2c, "w2c")?;
        log::debug!("camera {}: c2w derived from w2c", self.camera_id);
        self.c2w = Slot::Set(c2w);
        Ok(())
    }

    /// Store an externally supplied `c2w` and overwrite `w2c` with its inverse.
    pub fn set_c2w<M: IntoDenseMatrix>(&mut self, c2w: M) -> CameraResult<()> {
        let c2w = to_matrix4(c2w, "c2w")?;
        let w2c = invert(&c2w, "c2w")?;
        log::debug!("camera {}: c2w set, w2c recomputed", self.camera_id);
        self.c2w = Slot::Set(c2w);
        self.w2c = Slot::Set(w2c);
        Ok(())
    }

    /// Single entry point for both derive forms: `None` derives `c2w` from
    /// `w2c`, `Some` behaves like [`set_c2w`](Self::set_c2w).
    pub fn derive_c2w_from<M: IntoDenseMatrix>(&mut self, c2w: Option<M>) -> CameraResult<()> {
        match c2w {
            Some(c2w) => self.set_c2w(c2w),
            None => self.derive_c2w(),
        }
    }

    pub fn set_intrinsics<M: IntoDenseMatrix>(&mut self, intrinsics: M) -> CameraResult<()> {
        let intrinsics = to_matrix3(intrinsics, "intrinsics")?;
        log::debug!("camera {}: intrinsics set", self.camera_id);
        self.intrinsics = Slot::Set(intrinsics);
        Ok(())
    }

    pub fn w2c(&self) -> CameraResult<&Matrix4<f64>> {
        self.w2c.get("w2c")
    }

    pub fn c2w(&self) -> CameraResult<&Matrix4<f64>> {
        self.c2w.get("c2w")
    }

    pub fn intrinsics(&self) -> CameraResult<&Matrix3<f64>> {
        self.intrinsics.get("intrinsics")
    }

    /// Rotation block of `w2c`.
    pub fn rotation(&self) -> CameraResult<Matrix3<f64>> {
        Ok(decompose(self.w2c()?).0)
    }

    /// Translation column of `w2c`.
    pub fn translation(&self) -> CameraResult<Vector3<f64>> {
        Ok(decompose(self.w2c()?).1)
    }

    /// Camera position in world coordinates, read from `c2w`.
    pub fn center(&self) -> CameraResult<Vector3<f64>> {
        Ok(decompose(self.c2w()?).1)
    }

    /// Assemble a snapshot of the current parameters.
    pub fn params(&self) -> CameraParams {
        CameraParams {
            id: self.camera_id.clone(),
            w2c: self.w2c.as_option().map(rows4),
            c2w: self.c2w.as_option().map(rows4),
            intrinsics: self.intrinsics.as_option().map(rows3),
        }
    }
}

/// Invert a 4x4 transform, rejecting near-singular input.
fn invert(m: &Matrix4<f64>, field: &'static str) -> CameraResult<Matrix4<f64>> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return Err(CameraError::Numeric(format!(
            "{field} is singular (determinant {det:e})"
        )));
    }
    let inverse = m
        .lu()
        .try_inverse()
        .ok_or_else(|| CameraError::Numeric(format!("{field} could not be inverted")))?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(CameraError::Numeric(format!(
            "inverse of {field} has non-finite entries"
        )));
    }
    Ok(inverse)
}
