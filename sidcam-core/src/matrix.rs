//! Conversion of caller-supplied values into validated fixed-size matrices.
//!
//! Setters on [`CameraModel`](crate::CameraModel) accept anything implementing
//! [`IntoDenseMatrix`]. Conversion first checks that the value is a dense
//! numeric matrix at all (`CameraError::Type`), then the caller checks the
//! dimensions against the field (`CameraError::Shape`).

use nalgebra::{DMatrix, Matrix3, Matrix4};
use serde_json::Value;

use crate::error::{CameraError, CameraResult};

/// A value that can be turned into a dense `f64` matrix.
pub trait IntoDenseMatrix {
    /// Convert into a dense matrix. `field` names the destination in errors.
    fn into_dense(self, field: &'static str) -> CameraResult<DMatrix<f64>>;
}

impl IntoDenseMatrix for DMatrix<f64> {
    fn into_dense(self, _field: &'static str) -> CameraResult<DMatrix<f64>> {
        Ok(self)
    }
}

impl IntoDenseMatrix for &DMatrix<f64> {
    fn into_dense(self, _field: &'static str) -> CameraResult<DMatrix<f64>> {
        Ok(self.clone())
    }
}

impl IntoDenseMatrix for Matrix4<f64> {
    fn into_dense(self, _field: &'static str) -> CameraResult<DMatrix<f64>> {
        Ok(DMatrix::from_column_slice(4, 4, self.as_slice()))
    }
}

impl IntoDenseMatrix for Matrix3<f64> {
    fn into_dense(self, _field: &'static str) -> CameraResult<DMatrix<f64>> {
        Ok(DMatrix::from_column_slice(3, 3, self.as_slice()))
    }
}

impl<const C: usize, const R: usize> IntoDenseMatrix for [[f64; C]; R] {
    fn into_dense(self, _field: &'static str) -> CameraResult<DMatrix<f64>> {
        Ok(DMatrix::from_fn(R, C, |r, c| self[r][c]))
    }
}

impl IntoDenseMatrix for Vec<Vec<f64>> {
    fn into_dense(self, field: &'static str) -> CameraResult<DMatrix<f64>> {
        rows_to_dense(&self, field)
    }
}

impl IntoDenseMatrix for &Value {
    fn into_dense(self, field: &'static str) -> CameraResult<DMatrix<f64>> {
        let rows = self.as_array().ok_or_else(|| CameraError::Type {
            field,
            found: json_kind(self).to_string(),
        })?;

        let mut parsed = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row.as_array().ok_or_else(|| CameraError::Type {
                field,
                found: format!("array of {}", json_kind(row)),
            })?;
            let mut values = Vec::with_capacity(cells.len());
            for cell in cells {
                let value = cell.as_f64().ok_or_else(|| CameraError::Type {
                    field,
                    found: format!("matrix with {} entries", json_kind(cell)),
                })?;
                values.push(value);
            }
            parsed.push(values);
        }
        rows_to_dense(&parsed, field)
    }
}

impl IntoDenseMatrix for Value {
    fn into_dense(self, field: &'static str) -> CameraResult<DMatrix<f64>> {
        (&self).into_dense(field)
    }
}

/// Build a dense matrix from row vectors; ragged rows are not a matrix.
fn rows_to_dense(rows: &[Vec<f64>], field: &'static str) -> CameraResult<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(CameraError::Type {
            field,
            found: "ragged nested list".to_string(),
        });
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check dimensions of a dense matrix against the required shape.
pub(crate) fn expect_shape(
    m: &DMatrix<f64>,
    field: &'static str,
    expected: (usize, usize),
) -> CameraResult<()> {
    let actual = m.shape();
    if actual != expected {
        return Err(CameraError::Shape {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Convert and validate a 4x4 input.
pub(crate) fn to_matrix4<M: IntoDenseMatrix>(value: M, field: &'static str) -> CameraResult<Matrix4<f64>> {
    let dense = value.into_dense(field)?;
    expect_shape(&dense, field, (4, 4))?;
    Ok(Matrix4::from_iterator(dense.iter().copied()))
}

/// Convert and validate a 3x3 input.
pub(crate) fn to_matrix3<M: IntoDenseMatrix>(value: M, field: &'static str) -> CameraResult<Matrix3<f64>> {
    let dense = value.into_dense(field)?;
    expect_shape(&dense, field, (3, 3))?;
    Ok(Matrix3::from_iterator(dense.iter().copied()))
}

/// Row-major nested array of a 4x4 matrix.
pub(crate) fn rows4(m: &Matrix4<f64>) -> [[f64; 4]; 4] {
    let mut out = [[0.0; 4]; 4];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = m[(r, c)];
        }
    }
    out
}

/// Row-major nested array of a 3x3 matrix.
pub(crate) fn rows3(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    let mut out = [[0.0; 3]; 3];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = m[(r, c)];
        }
    }
    out
}
