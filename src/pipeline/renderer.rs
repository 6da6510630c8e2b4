use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Mesh;
use crate::core::pipeline::Shader;
use crate::core::rasterizer;
use nalgebra::Vector3;

/// A render target plus the draw logic that feeds it. The demo owns two:
/// one at screen resolution for the color pass and one square depth-only
/// target for the shadow pass.
pub struct Renderer {
    pub framebuffer: FrameBuffer,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            framebuffer: FrameBuffer::new(width, height),
        }
    }

    /// Clears color and depth.
    pub fn clear(&mut self, color: Vector3<f32>) {
        self.framebuffer.clear(color);
    }

    /// Clears depth only; used by the depth-only shadow target.
    pub fn clear_depth(&mut self) {
        self.framebuffer.clear_depth();
    }

    /// Draws a mesh using the provided shader: assembles triangles from
    /// the index list, runs the vertex stage, and rasterizes.
    pub fn draw_mesh<S: Shader>(&mut self, mesh: &Mesh, shader: &S) {
        for chunk in mesh.indices.chunks(3) {
            if chunk.len() < 3 {
                break;
            }

            let v0 = &mesh.vertices[chunk[0] as usize];
            let v1 = &mesh.vertices[chunk[1] as usize];
            let v2 = &mesh.vertices[chunk[2] as usize];

            let (pos0, var0) = shader.vertex(v0);
            let (pos1, var1) = shader.vertex(v1);
            let (pos2, var2) = shader.vertex(v2);

            rasterizer::rasterize_triangle(
                &self.framebuffer,
                shader,
                &[pos0, pos1, pos2],
                &[var0, var1, var2],
            );
        }
    }
}
