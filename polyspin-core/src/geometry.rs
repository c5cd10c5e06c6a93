/// Polyhedron geometry: face-count selection, indexed mesh definitions and
/// the flat-shaded triangle meshes the rasterizers consume
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// The six supported polyhedra, keyed by their face count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum FaceCount {
    Tetrahedron,
    #[default]
    Cube,
    Octahedron,
    Bipyramid,
    Dodecahedron,
    Icosahedron,
}

impl FaceCount {
    /// Selector order used by every shape picker
    pub const ALL: [FaceCount; 6] = [
        FaceCount::Tetrahedron,
        FaceCount::Cube,
        FaceCount::Octahedron,
        FaceCount::Bipyramid,
        FaceCount::Dodecahedron,
        FaceCount::Icosahedron,
    ];

    pub fn faces(self) -> u32 {
        match self {
            FaceCount::Tetrahedron => 4,
            FaceCount::Cube => 6,
            FaceCount::Octahedron => 8,
            FaceCount::Bipyramid => 10,
            FaceCount::Dodecahedron => 12,
            FaceCount::Icosahedron => 20,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceCount::Tetrahedron => "tetrahedron",
            FaceCount::Cube => "cube",
            FaceCount::Octahedron => "octahedron",
            FaceCount::Bipyramid => "pentagonal bipyramid",
            FaceCount::Dodecahedron => "dodecahedron",
            FaceCount::Icosahedron => "icosahedron",
        }
    }
}

/// Unsupported counts fall back to the cube
impl From<u32> for FaceCount {
    fn from(faces: u32) -> Self {
        match faces {
            4 => FaceCount::Tetrahedron,
            8 => FaceCount::Octahedron,
            10 => FaceCount::Bipyramid,
            12 => FaceCount::Dodecahedron,
            20 => FaceCount::Icosahedron,
            _ => FaceCount::Cube,
        }
    }
}

impl From<FaceCount> for u32 {
    fn from(face_count: FaceCount) -> Self {
        face_count.faces()
    }
}

/// Indexed polyhedron: shared vertex positions plus polygon faces.
///
/// Faces are wound counter-clockwise when seen from outside the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDefinition {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Vec<usize>>,
}

impl MeshDefinition {
    /// Build from a flat `[x, y, z, ...]` vertex list and flat triangle
    /// indices, projecting every vertex onto a sphere of `radius`.
    pub fn from_triangles(vertices: &[f32], indices: &[usize], radius: f32) -> Self {
        let faces = indices.chunks_exact(3).map(|tri| tri.to_vec()).collect();
        Self::from_polygons(vertices, faces, radius)
    }

    /// Build from a flat vertex list and polygon faces, projecting every
    /// vertex onto a sphere of `radius`.
    pub fn from_polygons(vertices: &[f32], faces: Vec<Vec<usize>>, radius: f32) -> Self {
        let vertices = vertices
            .chunks_exact(3)
            .map(|v| Point3::from(Vector3::new(v[0], v[1], v[2]).normalize() * radius))
            .collect();
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Fan-triangulated faces
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.faces.iter().flat_map(|face| {
            (1..face.len().saturating_sub(1)).map(move |i| [face[0], face[i], face[i + 1]])
        })
    }

    /// Flat-shaded triangle mesh with one normal per face
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::with_capacity(self.triangles().count());
        for [a, b, c] in self.triangles() {
            let (p0, p1, p2) = (self.vertices[a], self.vertices[b], self.vertices[c]);
            let n = (p1 - p0).cross(&(p2 - p0)).normalize();
            mesh.add_triangle(Triangle::new(
                Vertex::new(p0.x, p0.y, p0.z, n.x, n.y, n.z),
                Vertex::new(p1.x, p1.y, p1.z, n.x, n.y, n.z),
                Vertex::new(p2.x, p2.y, p2.z, n.x, n.y, n.z),
            ));
        }
        mesh
    }
}

/// Map a face-count selector to its polyhedron
pub fn build_geometry(face_count: FaceCount) -> MeshDefinition {
    match face_count {
        FaceCount::Tetrahedron => tetrahedron(),
        FaceCount::Cube => cube(1.0),
        FaceCount::Octahedron => octahedron(),
        FaceCount::Bipyramid => pentagonal_bipyramid(),
        FaceCount::Dodecahedron => dodecahedron(),
        FaceCount::Icosahedron => icosahedron(),
    }
}

fn tetrahedron() -> MeshDefinition {
    #[rustfmt::skip]
    let vertices = [
        1.0, 1.0, 1.0,
        -1.0, -1.0, 1.0,
        -1.0, 1.0, -1.0,
        1.0, -1.0, -1.0,
    ];
    let indices = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];
    MeshDefinition::from_triangles(&vertices, &indices, 1.0)
}

/// Axis-aligned box with edge length `size`, one quad per side
fn cube(size: f32) -> MeshDefinition {
    let half = size / 2.0;
    let vertices = vec![
        Point3::new(-half, -half, -half),
        Point3::new(half, -half, -half),
        Point3::new(half, half, -half),
        Point3::new(-half, half, -half),
        Point3::new(-half, -half, half),
        Point3::new(half, -half, half),
        Point3::new(half, half, half),
        Point3::new(-half, half, half),
    ];
    let faces = vec![
        vec![0, 3, 2, 1], // back
        vec![4, 5, 6, 7], // front
        vec![0, 4, 7, 3], // left
        vec![1, 2, 6, 5], // right
        vec![0, 1, 5, 4], // bottom
        vec![3, 7, 6, 2], // top
    ];
    MeshDefinition { vertices, faces }
}

fn octahedron() -> MeshDefinition {
    #[rustfmt::skip]
    let vertices = [
        1.0, 0.0, 0.0,
        -1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, -1.0, 0.0,
        0.0, 0.0, 1.0,
        0.0, 0.0, -1.0,
    ];
    #[rustfmt::skip]
    let indices = [
        0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2,
        1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
    ];
    MeshDefinition::from_triangles(&vertices, &indices, 1.0)
}

/// Ten triangles joining two apexes to a pentagonal equator
fn pentagonal_bipyramid() -> MeshDefinition {
    let mut vertices = vec![0.0, 0.0, 1.0, 0.0, 0.0, -1.0];
    for i in 0..5 {
        let angle = 2.0 * PI * i as f32 / 5.0;
        vertices.extend_from_slice(&[angle.cos(), angle.sin(), 0.0]);
    }
    #[rustfmt::skip]
    let indices = [
        0, 2, 3, 0, 3, 4, 0, 4, 5, 0, 5, 6, 0, 6, 2,
        1, 4, 3, 1, 5, 4, 1, 6, 5, 1, 2, 6, 1, 3, 2,
    ];
    MeshDefinition::from_triangles(&vertices, &indices, 1.0)
}

fn dodecahedron() -> MeshDefinition {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let r = 1.0 / t;
    #[rustfmt::skip]
    let vertices = [
        // (±1, ±1, ±1)
        -1.0, -1.0, -1.0, -1.0, -1.0, 1.0,
        -1.0, 1.0, -1.0, -1.0, 1.0, 1.0,
        1.0, -1.0, -1.0, 1.0, -1.0, 1.0,
        1.0, 1.0, -1.0, 1.0, 1.0, 1.0,
        // (0, ±1/φ, ±φ)
        0.0, -r, -t, 0.0, -r, t,
        0.0, r, -t, 0.0, r, t,
        // (±1/φ, ±φ, 0)
        -r, -t, 0.0, -r, t, 0.0,
        r, -t, 0.0, r, t, 0.0,
        // (±φ, 0, ±1/φ)
        -t, 0.0, -r, t, 0.0, -r,
        -t, 0.0, r, t, 0.0, r,
    ];
    let faces = vec![
        vec![3, 11, 7, 15, 13],
        vec![7, 19, 17, 6, 15],
        vec![17, 4, 8, 10, 6],
        vec![8, 0, 16, 2, 10],
        vec![0, 12, 1, 18, 16],
        vec![6, 10, 2, 13, 15],
        vec![2, 16, 18, 3, 13],
        vec![18, 1, 9, 11, 3],
        vec![4, 14, 12, 0, 8],
        vec![11, 9, 5, 19, 7],
        vec![19, 5, 14, 4, 17],
        vec![1, 12, 14, 5, 9],
    ];
    MeshDefinition::from_polygons(&vertices, faces, 1.0)
}

fn icosahedron() -> MeshDefinition {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    #[rustfmt::skip]
    let vertices = [
        -1.0, t, 0.0, 1.0, t, 0.0, -1.0, -t, 0.0, 1.0, -t, 0.0,
        0.0, -1.0, t, 0.0, 1.0, t, 0.0, -1.0, -t, 0.0, 1.0, -t,
        t, 0.0, -1.0, t, 0.0, 1.0, -t, 0.0, -1.0, -t, 0.0, 1.0,
    ];
    #[rustfmt::skip]
    let indices = [
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11,
        1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1, 8,
        3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9,
        4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
    ];
    MeshDefinition::from_triangles(&vertices, &indices, 1.0)
}

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

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }

    /// Centroid, used for depth sorting and lighting
    pub fn centroid(&self) -> Point3<f32> {
        let sum = self.vertices[0].position.coords
            + self.vertices[1].position.coords
            + self.vertices[2].position.coords;
        Point3::from(sum / 3.0)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }
}
