use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

/// Extents of the light's orthographic shadow frustum.
#[derive(Debug, Clone, Copy)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

/// The scene's single shadow-casting directional light. Fixed after
/// startup; both render passes derive their light-space transform from it.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    pub position: Point3<f32>,
    pub color: Vector3<f32>,
    pub bounds: OrthoBounds,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            position: Point3::new(1.2, 1.0, 1.0),
            color: Vector3::new(1.0, 0.95, 0.85),
            bounds: OrthoBounds {
                left: -10.0,
                right: 10.0,
                bottom: -10.0,
                top: 10.0,
                near: 1.0,
                far: 7.5,
            },
        }
    }
}

impl DirectionalLight {
    /// Combined projection * view transform mapping world space into the
    /// light's shadow-map sampling space. The light never moves, so the
    /// result is the same every frame; the frame loop computes it once per
    /// iteration and hands the identical value to both passes.
    pub fn light_space_matrix(&self) -> Matrix4<f32> {
        let b = &self.bounds;
        let projection =
            TransformFactory::orthographic(b.left, b.right, b.bottom, b.top, b.near, b.far);
        let view = TransformFactory::view(&self.position, &Point3::origin(), &Vector3::y());
        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_space_matrix_is_bit_stable() {
        // Repeated computation must agree exactly, not just approximately:
        // the depth pass and the color pass rely on sharing one value.
        let light = DirectionalLight::default();
        assert_eq!(light.light_space_matrix(), light.light_space_matrix());
    }

    #[test]
    fn light_space_is_ortho_times_lookat() {
        let light = DirectionalLight::default();
        let expected = TransformFactory::orthographic(-10.0, 10.0, -10.0, 10.0, 1.0, 7.5)
            * TransformFactory::view(
                &Point3::new(1.2, 1.0, 1.0),
                &Point3::origin(),
                &Vector3::y(),
            );
        assert_eq!(light.light_space_matrix(), expected);
    }

    #[test]
    fn world_origin_projects_inside_the_shadow_frustum() {
        let light = DirectionalLight::default();
        let clip = light.light_space_matrix() * Point3::origin().to_homogeneous();
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() <= 1.0);
        assert!(ndc.y.abs() <= 1.0);
        assert!(ndc.z.abs() <= 1.0);
    }
}
