/// Loading meshes from disk
use std::fs;
use std::path::Path;

use crate::error::{MeshError, MeshResult};
use crate::geometry::Mesh;
use crate::{obj, stl};

/// Mesh file formats understood by [`load_mesh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> MeshResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "stl" => Ok(MeshFormat::Stl),
            "obj" => Ok(MeshFormat::Obj),
            _ => Err(MeshError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load a single mesh from an STL or OBJ file.
pub fn load_mesh(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(MeshError::FileNotFound(path.to_path_buf()));
    }

    let format = MeshFormat::from_path(path)?;
    let mesh = match format {
        MeshFormat::Stl => stl::parse_stl(&fs::read(path)?)?,
        MeshFormat::Obj => obj::parse_obj(&fs::read_to_string(path)?)?,
    };
    log::info!(
        "loaded {} triangles from {}",
        mesh.triangles.len(),
        path.display()
    );
    Ok(mesh)
}
