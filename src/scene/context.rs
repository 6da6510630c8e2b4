use crate::core::geometry::Mesh;
use crate::core::math::transform;
use crate::io::config::Config;
use crate::scene::camera::Camera;
use crate::scene::light::DirectionalLight;
use crate::scene::texture::Texture;
use nalgebra::{Matrix4, Point3, Vector3};
use std::f32::consts::PI;
use std::sync::Arc;

/// Color used for the cube when its texture cannot be decoded.
const FALLBACK_TINT: Vector3<f32> = Vector3::new(1.0, 0.95, 0.85);

/// Where the camera starts and which way it initially faces.
const CAMERA_START_POSITION: Point3<f32> = Point3::new(2.0, 0.0, 3.0);
const CAMERA_START_FORWARD: Vector3<f32> = Vector3::new(-0.7, 0.0, -0.7);

/// A non-animated scene instance: which mesh it draws and where it sits.
/// Orientation is Euler radians applied in X, Y, Z order.
pub struct StaticInstance {
    pub mesh: Arc<Mesh>,
    pub position: Vector3<f32>,
    pub orientation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

/// One resolved draw for the current frame. The same list feeds both
/// render passes so they agree on geometry and model matrices exactly.
pub struct DrawCall {
    pub mesh: Arc<Mesh>,
    pub model: Matrix4<f32>,
}

/// Holds all scene state required for rendering. Owned by the frame loop
/// and passed by reference into the passes; nothing rendering-related
/// lives in globals.
pub struct RenderContext {
    pub camera: Camera,
    pub light: DirectionalLight,
    pub texture: Arc<Texture>,
    pub background: Vector3<f32>,
    pub shadow_bias: f32,
    cube: Arc<Mesh>,
    statics: Vec<StaticInstance>,
}

impl RenderContext {
    pub fn new(config: &Config) -> Self {
        let camera = Camera::new(
            CAMERA_START_POSITION,
            CAMERA_START_FORWARD,
            config.camera.speed,
            config.camera.sensitivity,
        );

        let texture = Arc::new(Texture::load_or_fallback(
            &config.render.texture,
            FALLBACK_TINT,
        ));

        let plane = Arc::new(Mesh::unit_plane());
        let statics = vec![
            // Back wall
            StaticInstance {
                mesh: plane.clone(),
                position: Vector3::new(0.0, 1.5, -4.0),
                orientation: Vector3::new(PI, 0.0, 0.0),
                scale: Vector3::new(5.0, 5.0, 1.0),
            },
            // Side wall
            StaticInstance {
                mesh: plane.clone(),
                position: Vector3::new(-2.5, 1.5, -1.5),
                orientation: Vector3::new(PI, -0.5 * PI, 0.0),
                scale: Vector3::new(5.0, 5.0, 5.0),
            },
            // Floor
            StaticInstance {
                mesh: plane,
                position: Vector3::new(0.0, -1.0, -1.5),
                orientation: Vector3::new(0.5 * PI, 0.0, 0.0),
                scale: Vector3::new(5.0, 5.0, 5.0),
            },
        ];

        Self {
            camera,
            light: DirectionalLight::default(),
            texture,
            background: Vector3::from(config.render.background),
            shadow_bias: config.render.shadow_bias,
            cube: Arc::new(Mesh::unit_cube()),
            statics,
        }
    }

    /// Resolves the scene into draw calls for one frame. The cube's model
    /// matrix depends on the elapsed `time` (its spin is derived, never
    /// stored); the static instances always produce the same matrices.
    pub fn draw_list(&self, time: f32) -> Vec<DrawCall> {
        let mut draws = Vec::with_capacity(1 + self.statics.len());

        draws.push(DrawCall {
            mesh: self.cube.clone(),
            model: transform::cube_model(time),
        });

        for instance in &self.statics {
            draws.push(DrawCall {
                mesh: instance.mesh.clone(),
                model: transform::static_model(
                    &instance.position,
                    &instance.orientation,
                    &instance.scale,
                ),
            });
        }

        draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_is_cube_plus_three_planes() {
        let context = RenderContext::new(&Config::default());
        let draws = context.draw_list(0.0);
        assert_eq!(draws.len(), 4);
        assert_eq!(draws[0].mesh.vertices.len(), 36);
        for call in &draws[1..] {
            assert_eq!(call.mesh.vertices.len(), 4);
        }
    }

    #[test]
    fn static_models_do_not_depend_on_time() {
        let context = RenderContext::new(&Config::default());
        let at_zero = context.draw_list(0.0);
        let later = context.draw_list(42.5);

        // The cube spins...
        assert_ne!(at_zero[0].model, later[0].model);
        // ...the planes do not.
        for (a, b) in at_zero[1..].iter().zip(&later[1..]) {
            assert_eq!(a.model, b.model);
        }
    }
}
