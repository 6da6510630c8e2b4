use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Matrix4, Vector3, Vector4};
use std::ops::{Add, Mul};

/// Nothing needs to be interpolated for a depth-only draw.
#[derive(Clone, Copy, Debug)]
pub struct DepthVarying;

impl Add for DepthVarying {
    type Output = Self;
    fn add(self, _other: Self) -> Self {
        Self
    }
}

impl Mul<f32> for DepthVarying {
    type Output = Self;
    fn mul(self, _scalar: f32) -> Self {
        Self
    }
}

impl Interpolatable for DepthVarying {}

/// Shader for the shadow pass: projects geometry into the light's clip
/// space so only depth is produced.
pub struct DepthShader {
    mvp_matrix: Matrix4<f32>,
}

impl DepthShader {
    pub fn new(model: Matrix4<f32>, light_space: &Matrix4<f32>) -> Self {
        Self {
            mvp_matrix: light_space * model,
        }
    }
}

impl Shader for DepthShader {
    type Varying = DepthVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let clip_pos = self.mvp_matrix * vertex.position.to_homogeneous();
        (clip_pos, DepthVarying)
    }

    fn fragment(&self, _varying: Self::Varying) -> Vector3<f32> {
        // Color output is discarded; the rasterizer has already written depth.
        Vector3::zeros()
    }
}
