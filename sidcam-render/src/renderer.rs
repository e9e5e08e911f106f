/// Software rasterizer with hard Phong shading
use nalgebra::Vector3;
use sidcam_core::{Mesh, PerspectiveCamera, ScreenPoint};

use crate::config::PointLight;
use crate::frame::RenderedImage;

/// A mesh with one colour per vertex, in triangle order.
#[derive(Debug, Clone)]
pub struct TexturedMesh {
    pub mesh: Mesh,
    pub colors: Vec<[f32; 3]>,
}

impl TexturedMesh {
    /// Give every vertex the same colour.
    pub fn uniform(mesh: Mesh, color: [f32; 3]) -> Self {
        let colors = vec![color; mesh.vertex_count()];
        Self { mesh, colors }
    }
}

/// Phong shading parameters shared by every fragment.
#[derive(Debug, Clone, Copy)]
pub struct Shading {
    pub light: PointLight,
    pub shininess: f32,
}

/// A projected triangle corner carrying what shading needs.
#[derive(Clone, Copy)]
struct Corner {
    screen: ScreenPoint,
    world: Vector3<f64>,
    normal: Vector3<f64>,
    color: [f32; 3],
}

/// Rasterizes a textured mesh into an image, one sample per pixel.
pub struct Rasterizer<'a> {
    camera: &'a PerspectiveCamera,
    shading: Shading,
    eye: Vector3<f64>,
    light: Vector3<f64>,
}

impl<'a> Rasterizer<'a> {
    pub fn new(camera: &'a PerspectiveCamera, shading: Shading) -> Self {
        let [lx, ly, lz] = shading.light.location;
        Self {
            camera,
            shading,
            eye: camera.center(),
            light: Vector3::new(lx, ly, lz),
        }
    }

    /// Render every triangle of `textured` into `target`.
    pub fn render(&self, textured: &TexturedMesh, target: &mut RenderedImage) {
        let mut skipped = 0usize;
        for (i, triangle) in textured.mesh.triangles.iter().enumerate() {
            let mut corners = Vec::with_capacity(3);
            for (k, vertex) in triangle.vertices.iter().enumerate() {
                let world = vertex.position.coords.cast::<f64>();
                match self.camera.project(&world) {
                    Some(screen) => corners.push(Corner {
                        screen,
                        world,
                        normal: vertex.normal.cast::<f64>(),
                        color: textured.colors[i * 3 + k],
                    }),
                    // Triangle crosses the camera plane
                    None => break,
                }
            }

            if corners.len() != 3 {
                skipped += 1;
                continue;
            }

            self.rasterize_triangle(&[corners[0], corners[1], corners[2]], target);
        }

        if skipped > 0 {
            log::warn!("skipped {skipped} triangles behind or on the camera plane");
        }
    }

    fn rasterize_triangle(&self, corners: &[Corner; 3], target: &mut RenderedImage) {
        let [c0, c1, c2] = corners;
        let (v0, v1, v2) = (c0.screen, c1.screen, c2.screen);

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i64;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i64;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i64;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i64;

        // Clip to image bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(target.width() as i64 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(target.height() as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;

                let Some((w0, w1, w2)) = barycentric(
                    (v0.x, v0.y),
                    (v1.x, v1.y),
                    (v2.x, v2.y),
                    (px, py),
                ) else {
                    // Degenerate in screen space
                    return;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                // Perspective-correct weights
                let p0 = w0 / v0.depth;
                let p1 = w1 / v1.depth;
                let p2 = w2 / v2.depth;
                let inv_depth = p0 + p1 + p2;
                let depth = 1.0 / inv_depth;
                let (p0, p1, p2) = (p0 * depth, p1 * depth, p2 * depth);

                if depth as f32 >= target.depth(x as usize, y as usize) {
                    continue;
                }

                let world = c0.world * p0 + c1.world * p1 + c2.world * p2;
                let normal = c0.normal * p0 + c1.normal * p1 + c2.normal * p2;
                let albedo = [0, 1, 2].map(|ch| {
                    (f64::from(c0.color[ch]) * p0 + f64::from(c1.color[ch]) * p1 + f64::from(c2.color[ch]) * p2) as f32
                });

                let color = self.shade(&world, &normal, albedo);
                target.write_if_nearer(x as usize, y as usize, depth as f32, color);
            }
        }
    }

    /// Ambient + diffuse + specular from a single point light.
    fn shade(&self, world: &Vector3<f64>, normal: &Vector3<f64>, albedo: [f32; 3]) -> [f32; 3] {
        let light = &self.shading.light;
        let n = normal.try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
        let to_light = (self.light - world).try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
        let to_eye = (self.eye - world).try_normalize(1e-12).unwrap_or_else(Vector3::zeros);

        let cos_angle = n.dot(&to_light);
        let diffuse = cos_angle.max(0.0) as f32;
        let specular = if cos_angle > 0.0 {
            let reflected = n * (2.0 * cos_angle) - to_light;
            (reflected.dot(&to_eye).max(0.0) as f32).powf(self.shading.shininess)
        } else {
            0.0
        };

        [0, 1, 2].map(|ch| {
            let lit = albedo[ch] * (light.ambient[ch] + light.diffuse[ch] * diffuse) + light.specular[ch] * specular;
            lit.clamp(0.0, 1.0)
        })
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-12 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix3, Point3};
    use sidcam_core::{extended_intrinsics, ProjectionModel, Triangle};

    fn camera(size: u32) -> PerspectiveCamera {
        let half = f64::from(size) / 2.0;
        let k = Matrix3::new(f64::from(size), 0.0, half, 0.0, f64::from(size), half, 0.0, 0.0, 1.0);
        let k_ext = extended_intrinsics(&k, ProjectionModel::Perspective).unwrap();
        PerspectiveCamera::new(Matrix3::identity(), Vector3::new(0.0, 0.0, 5.0), k_ext, size, size)
    }

    fn shading() -> Shading {
        Shading {
            light: PointLight::default(),
            shininess: 64.0,
        }
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-12);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_nearer_triangle_wins() {
        let cam = camera(32);
        let mut mesh = Mesh::new();
        // far triangle first, near one second; both face the camera
        for z in [1.0f32, -1.0] {
            mesh.add_triangle(Triangle::from_positions(
                Point3::new(-2.0, -2.0, z),
                Point3::new(-2.0, 2.0, z),
                Point3::new(2.0, 0.0, z),
            ));
        }
        let mut textured = TexturedMesh::uniform(mesh, [1.0, 1.0, 1.0]);
        textured.colors[3..].fill([1.0, 0.0, 0.0]);

        let mut img = RenderedImage::new(32, 32, [0.0; 3]);
        Rasterizer::new(&cam, shading()).render(&textured, &mut img);

        let centre = img.pixel(16, 16);
        assert_eq!(centre[3], 1.0);
        assert!(centre[1] < 0.05, "far triangle leaked through: {centre:?}");
        assert!((img.depth(16, 16) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_triangle_behind_camera_is_skipped() {
        let cam = camera(16);
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::from_positions(
            Point3::new(-1.0, -1.0, -10.0),
            Point3::new(1.0, -1.0, -10.0),
            Point3::new(0.0, 1.0, -10.0),
        ));
        let mut img = RenderedImage::new(16, 16, [0.0; 3]);
        Rasterizer::new(&cam, shading()).render(&TexturedMesh::uniform(mesh, [1.0; 3]), &mut img);
        assert_eq!(img.coverage(), 0);
    }

    #[test]
    fn test_lit_face_is_brighter_than_ambient() {
        let cam = camera(8);
        let r = Rasterizer::new(&cam, shading());
        // light sits at z = -1, above this point
        let facing = r.shade(&Vector3::new(0.0, 0.0, -1.5), &Vector3::new(0.0, 0.0, 1.0), [1.0; 3]);
        let away = r.shade(&Vector3::new(0.0, 0.0, -1.5), &Vector3::new(0.0, 0.0, -1.0), [1.0; 3]);
        assert!(facing[0] > away[0]);
        assert!((away[0] - 0.5).abs() < 1e-6);
    }
}
