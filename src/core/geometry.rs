use nalgebra::{Point3, Vector2, Vector3};

/// Represents a single vertex in 3D space.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    /// Position in local object space.
    pub position: Point3<f32>,
    /// Normal vector for lighting calculations.
    pub normal: Vector3<f32>,
    /// Texture coordinates (UV).
    pub texcoord: Vector2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            texcoord,
        }
    }
}

/// A collection of vertices and indices representing a 3D object.
pub struct Mesh {
    /// List of vertices.
    pub vertices: Vec<Vertex>,
    /// List of indices defining triangles (3 indices per triangle).
    pub indices: Vec<u32>,
}

/// Interleaved layout of the baked vertex tables below:
/// position (3), normal (3), texcoord (2).
type RawVertex = [f32; 8];

#[rustfmt::skip]
const CUBE_VERTICES: [RawVertex; 36] = [
    // back face (-Z)
    [-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0],
    [ 0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0],
    [ 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0],
    [-0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0],
    [-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0],
    // front face (+Z)
    [-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0],
    [ 0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0],
    [ 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0],
    [-0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0],
    [-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0],
    // left face (-X)
    [-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0],
    [-0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 1.0],
    [-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0],
    [-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0],
    [-0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 0.0],
    [-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0],
    // right face (+X)
    [ 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0],
    [ 0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0],
    [ 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0],
    [ 0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 0.0],
    [ 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0],
    // bottom face (-Y)
    [-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0],
    [ 0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  1.0, 1.0],
    [ 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0],
    [ 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0],
    [-0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  0.0, 0.0],
    [-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0],
    // top face (+Y)
    [-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0],
    [ 0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 1.0],
    [ 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0],
    [ 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0],
    [-0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 0.0],
    [-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0],
];

#[rustfmt::skip]
const PLANE_VERTICES: [RawVertex; 4] = [
    [ 0.5,  0.5, 0.0,  0.0, 0.0, -1.0,  1.0, 1.0],
    [ 0.5, -0.5, 0.0,  0.0, 0.0, -1.0,  1.0, 0.0],
    [-0.5, -0.5, 0.0,  0.0, 0.0, -1.0,  0.0, 0.0],
    [-0.5,  0.5, 0.0,  0.0, 0.0, -1.0,  0.0, 1.0],
];

const PLANE_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// A unit cube centered at the origin: 36 vertices, non-indexed
    /// (the index list is the trivial 0..36 sequence).
    pub fn unit_cube() -> Self {
        let vertices = CUBE_VERTICES.iter().map(unpack).collect();
        let indices = (0..CUBE_VERTICES.len() as u32).collect();
        Self::new(vertices, indices)
    }

    /// A unit quad in the XY plane: 4 vertices + 6 indices (two triangles).
    pub fn unit_plane() -> Self {
        let vertices = PLANE_VERTICES.iter().map(unpack).collect();
        Self::new(vertices, PLANE_INDICES.to_vec())
    }
}

fn unpack(raw: &RawVertex) -> Vertex {
    Vertex::new(
        Point3::new(raw[0], raw[1], raw[2]),
        Vector3::new(raw[3], raw[4], raw[5]),
        Vector2::new(raw[6], raw[7]),
    )
}
