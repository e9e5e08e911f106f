/// Rigid transform helpers and object rotation state
use nalgebra::{Matrix3, Matrix4, Rotation3, RowVector4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Rotation matrix applying X, then Y, then Z.
    pub fn matrix(&self) -> Matrix3<f32> {
        // from_euler_angles composes as Rz * Ry * Rx
        Rotation3::from_euler_angles(self.x, self.y, self.z).into_inner()
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Assemble a homogeneous transform from a rotation block and translation.
pub fn compose(rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    m.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    m
}

/// Split a homogeneous transform into its rotation block and translation.
pub fn decompose(m: &Matrix4<f64>) -> (Matrix3<f64>, Vector3<f64>) {
    let rotation = m.fixed_view::<3, 3>(0, 0).into_owned();
    let translation = m.fixed_view::<3, 1>(0, 3).into_owned();
    (rotation, translation)
}

/// Translation-only transform.
pub fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Whether `m` is a proper rigid transform: orthonormal rotation with
/// determinant +1 and a `[0, 0, 0, 1]` bottom row.
pub fn is_rigid(m: &Matrix4<f64>, tol: f64) -> bool {
    let (r, _) = decompose(m);
    let bottom = m.fixed_view::<1, 4>(3, 0);
    let orthonormal = (r.transpose() * r - Matrix3::identity()).norm() <= tol;
    let proper = (r.determinant() - 1.0).abs() <= tol;
    let homogeneous = (bottom - RowVector4::new(0.0, 0.0, 0.0, 1.0)).norm() <= tol;
    orthonormal && proper && homogeneous
}
