//! Single-object mesh visualiser driven by camera parameters.
//!
//! The visualiser only ever sees the rotation and translation of a camera's
//! `w2c` and its 3x3 intrinsics; everything else about the camera stays in
//! [`CameraModel`].

use std::path::Path;

use nalgebra::{Matrix3, Matrix4, Vector3};
use sidcam_core::transform::translation;
use sidcam_core::{
    extended_intrinsics, load_mesh, CameraError, CameraModel, CameraResult, Mesh, PerspectiveCamera,
};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::frame::RenderedImage;
use crate::renderer::{Rasterizer, Shading, TexturedMesh};

/// Distance of the default camera from the world origin.
const DEFAULT_CAMERA_DISTANCE: f64 = 5.0;

/// Renders one mesh from a given camera pose.
#[derive(Debug, Clone)]
pub struct Visualiser {
    config: RenderConfig,
    scene_objects: Vec<Mesh>,
}

impl Visualiser {
    pub fn new(config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scene_objects: Vec::new(),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn scene_objects(&self) -> &[Mesh] {
        &self.scene_objects
    }

    /// Load a mesh file and add it to the scene, dividing its vertices by
    /// `verts_scale`.
    pub fn add_obj(&mut self, mesh_path: impl AsRef<Path>, verts_scale: f32) -> RenderResult<()> {
        let mesh = load_mesh(mesh_path)?.scaled_down(verts_scale)?;
        self.add_mesh(mesh);
        Ok(())
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        log::debug!("scene object added ({} triangles)", mesh.triangles.len());
        self.scene_objects.push(mesh);
    }

    pub fn clear(&mut self) {
        self.scene_objects.clear();
    }

    /// Replace the scene object's vertices with `R * p + t`.
    pub fn transform_obj(&mut self, rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> RenderResult<()> {
        let mesh = self.single_object_mut()?;
        *mesh = mesh.transformed(&rotation.cast::<f32>(), &translation.cast::<f32>());
        Ok(())
    }

    /// Attach the configured base colour to every vertex of `mesh`.
    pub fn textured_mesh(&self, mesh: &Mesh) -> TexturedMesh {
        TexturedMesh::uniform(mesh.clone(), self.config.base_color)
    }

    /// 4x4 intrinsics for the configured projection model.
    pub fn extended_intrinsics(&self, intrinsics: &Matrix3<f64>) -> RenderResult<Matrix4<f64>> {
        extended_intrinsics(intrinsics, self.config.projection).map_err(|e| match e {
            CameraError::NotSupported(msg) => RenderError::NotSupported(msg),
            other => other.into(),
        })
    }

    /// Render the scene object seen from a camera with the given `w2c`
    /// rotation, translation and 3x3 intrinsics.
    pub fn render_object(
        &self,
        cam_rotation: &Matrix3<f64>,
        cam_translation: &Vector3<f64>,
        intrinsics: &Matrix3<f64>,
    ) -> RenderResult<RenderedImage> {
        let mesh = self.single_object()?;
        let textured = self.textured_mesh(mesh);
        let k_ext = self.extended_intrinsics(intrinsics)?;

        let camera = PerspectiveCamera::new(
            *cam_rotation,
            *cam_translation,
            k_ext,
            self.config.image_height,
            self.config.image_width,
        );
        let shading = Shading {
            light: self.config.light,
            shininess: self.config.shininess,
        };

        let mut image = RenderedImage::new(
            self.config.image_width as usize,
            self.config.image_height as usize,
            self.config.background,
        );
        Rasterizer::new(&camera, shading).render(&textured, &mut image);
        log::info!(
            "rendered {}x{} image, {} pixels covered",
            image.width(),
            image.height(),
            image.coverage()
        );
        Ok(image)
    }

    /// Render from a camera model's current `w2c` and intrinsics.
    pub fn render_camera(&self, camera: &CameraModel) -> RenderResult<RenderedImage> {
        let rotation = camera.rotation()?;
        let translation = camera.translation()?;
        let intrinsics = camera.intrinsics()?;
        log::debug!("rendering from camera {}", camera.camera_id());
        self.render_object(&rotation, &translation, intrinsics)
    }

    /// A camera on the negative z axis looking at the origin, with a focal
    /// length matched to the configured image size.
    pub fn default_camera(&self, camera_id: &str) -> CameraResult<CameraModel> {
        let width = f64::from(self.config.image_width);
        let height = f64::from(self.config.image_height);
        let focal = width.min(height);
        let k = Matrix3::new(focal, 0.0, width / 2.0, 0.0, focal, height / 2.0, 0.0, 0.0, 1.0);

        let mut camera = CameraModel::new(camera_id);
        camera.setup(translation(0.0, 0.0, DEFAULT_CAMERA_DISTANCE), k)?;
        Ok(camera)
    }

    fn single_object(&self) -> RenderResult<&Mesh> {
        match self.scene_objects.as_slice() {
            [] => Err(RenderError::EmptyScene),
            [mesh] => Ok(mesh),
            _ => Err(too_many_objects()),
        }
    }

    fn single_object_mut(&mut self) -> RenderResult<&mut Mesh> {
        match self.scene_objects.as_mut_slice() {
            [] => Err(RenderError::EmptyScene),
            [mesh] => Ok(mesh),
            _ => Err(too_many_objects()),
        }
    }
}

fn too_many_objects() -> RenderError {
    RenderError::NotSupported("current implementation assumes one object in the scene".to_string())
}
