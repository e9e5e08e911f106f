/// Triangle mesh geometry for the scene object
use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{MeshError, MeshResult};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Build a triangle from three positions, with the face normal as the
    /// vertex normal. Degenerate triangles get a zero normal.
    pub fn from_positions(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Self {
        let normal = face_normal(&p0, &p1, &p2);
        let vertex = |p: Point3<f32>| Vertex {
            position: p,
            normal,
        };
        Self::new(vertex(p0), vertex(p1), vertex(p2))
    }

    /// Face normal from the winding order (counter-clockwise is front)
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = &self.vertices;
        face_normal(&v0.position, &v1.position, &v2.position)
    }
}

fn face_normal(p0: &Point3<f32>, p1: &Point3<f32>, p2: &Point3<f32>) -> Vector3<f32> {
    (p1 - p0)
        .cross(&(p2 - p0))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds as (min, max), or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut positions = self
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(lo, hi), p| {
            (lo.inf(&p), hi.sup(&p))
        }))
    }

    /// Divide every vertex position by `verts_scale`.
    pub fn scaled_down(&self, verts_scale: f32) -> MeshResult<Self> {
        if !verts_scale.is_finite() || verts_scale == 0.0 {
            return Err(MeshError::InvalidScale(verts_scale));
        }
        let mut mesh = self.clone();
        for triangle in &mut mesh.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position = Point3::from(vertex.position.coords / verts_scale);
            }
        }
        Ok(mesh)
    }

    /// Apply `p' = R * p + t` to every vertex; normals are rotated.
    pub fn transformed(&self, rotation: &Matrix3<f32>, translation: &Vector3<f32>) -> Self {
        let mut mesh = self.clone();
        for triangle in &mut mesh.triangles {
            for vertex in &mut triangle.vertices {
                vertex.position = Point3::from(rotation * vertex.position.coords + translation);
                vertex.normal = rotation * vertex.normal;
            }
        }
        mesh
    }

    /// Axis-aligned cube with edge length `size`, centred at the origin.
    /// Two triangles per face, wound counter-clockwise seen from outside.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        // (normal, u, v) with u x v = normal
        let faces: [(Vector3<f32>, Vector3<f32>, Vector3<f32>); 6] = [
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), Vector3::y(), Vector3::x()),
            (Vector3::y(), Vector3::z(), Vector3::x()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::x(), Vector3::y(), Vector3::z()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
        ];

        let mut mesh = Self::with_capacity(faces.len() * 2);
        for (normal, u, v) in faces {
            let corner = |su: f32, sv: f32| Vertex {
                position: Point3::from((normal + u * su + v * sv) * half),
                normal,
            };
            let quad = [corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0)];
            mesh.add_triangle(Triangle::new(quad[0], quad[1], quad[2]));
            mesh.add_triangle(Triangle::new(quad[0], quad[2], quad[3]));
        }
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
