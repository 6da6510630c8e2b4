use crate::core::color::linear_to_srgb;
use crate::core::framebuffer::FrameBuffer;
use crate::pipeline::renderer::Renderer;
use crate::pipeline::shaders::depth::DepthShader;
use crate::pipeline::shaders::phong::PhongShader;
use crate::scene::context::{DrawCall, RenderContext};
use crate::scene::texture::DepthMap;
use nalgebra::Matrix4;
use rayon::prelude::*;

/// Executes the shadow pass: renders every instance into the shadow
/// renderer's depth buffer from the light's viewpoint, then snapshots the
/// result into a `DepthMap` for the color pass to sample.
///
/// The shadow renderer's framebuffer never leaves this function, so the
/// screen target is untouched no matter how the draws go.
pub fn render_depth_pass(
    draws: &[DrawCall],
    light_space: &Matrix4<f32>,
    shadow_renderer: &mut Renderer,
) -> DepthMap {
    shadow_renderer.clear_depth();

    for call in draws {
        let shader = DepthShader::new(call.model, light_space);
        shadow_renderer.draw_mesh(&call.mesh, &shader);
    }

    DepthMap::new(
        shadow_renderer.framebuffer.depth_snapshot(),
        shadow_renderer.framebuffer.width,
    )
}

/// Executes the color pass: clears to the background color, then draws
/// every instance with Phong shading plus the shadow test.
///
/// `light_space` must be the exact value the depth pass rendered with this
/// frame; the frame loop computes it once and hands it to both passes.
pub fn render_color_pass(
    draws: &[DrawCall],
    context: &RenderContext,
    light_space: &Matrix4<f32>,
    shadow_map: &DepthMap,
    renderer: &mut Renderer,
) {
    renderer.clear(context.background);

    // One view matrix per frame, shared by every instance.
    let view = context.camera.view_matrix();
    let projection = crate::core::math::transform::scene_projection();

    for call in draws {
        let shader = PhongShader::new(
            call.model,
            view,
            projection,
            context.camera.position,
            &context.light,
            *light_space,
            context.texture.clone(),
            shadow_map.clone(),
            context.shadow_bias,
        );
        renderer.draw_mesh(&call.mesh, &shader);
    }
}

/// Gamma-corrects the framebuffer into a packed 0RGB `u32` buffer for
/// presentation.
pub fn post_process_to_buffer(framebuffer: &FrameBuffer, buffer: &mut [u32]) {
    buffer
        .par_chunks_mut(framebuffer.width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                if let Some(color) = framebuffer.get_pixel(x, y) {
                    let srgb = linear_to_srgb(color);

                    let r = (srgb.x.clamp(0.0, 1.0) * 255.0) as u32;
                    let g = (srgb.y.clamp(0.0, 1.0) * 255.0) as u32;
                    let b = (srgb.z.clamp(0.0, 1.0) * 255.0) as u32;

                    *pixel = (255 << 24) | (r << 16) | (g << 8) | b;
                } else {
                    *pixel = 0;
                }
            }
        });
}
