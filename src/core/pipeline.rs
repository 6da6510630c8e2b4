use crate::core::geometry::Vertex;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Trait for types that can be linearly interpolated across a triangle's
/// surface.
///
/// Requirements:
/// - Copy + Clone: cheaply duplicable values for per-vertex storage.
/// - Add + Mul<f32>: support the linear combination (a + b * t) used by
///   barycentric interpolation.
/// - Send + Sync: safe to use from multiple threads during parallel
///   rasterization.
pub trait Interpolatable:
    Copy + Clone + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync
{
}

/// Shader represents the programmable stages of the pipeline.
///
/// Implementations must be thread-safe (Send + Sync) because shading may be
/// invoked concurrently across fragments. Any resources a shader needs
/// (matrices, textures, the shadow map) are plain fields on the
/// implementing struct, set once when the shader is built for a draw.
pub trait Shader: Send + Sync {
    /// Per-vertex varying data to be interpolated and provided to the
    /// fragment shader.
    type Varying: Interpolatable;

    /// Vertex shader stage.
    ///
    /// Transforms the given vertex into homogeneous clip space and returns
    /// the varying data associated with that vertex, which will be
    /// interpolated across the primitive.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Fragment shader stage.
    ///
    /// Computes the final linear RGB color for the current fragment from
    /// the interpolated varying. Depth-only shaders return an arbitrary
    /// color; the rasterizer has already written depth by the time this
    /// runs.
    fn fragment(&self, varying: Self::Varying) -> Vector3<f32>;
}
