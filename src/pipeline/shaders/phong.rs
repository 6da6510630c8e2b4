use crate::core::geometry::Vertex;
use crate::core::pipeline::{Interpolatable, Shader};
use crate::scene::light::DirectionalLight;
use crate::scene::texture::{DepthMap, Texture};
use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};
use std::ops::{Add, Mul};
use std::sync::Arc;

const AMBIENT_STRENGTH: f32 = 0.15;
const SPECULAR_STRENGTH: f32 = 0.5;
const SHININESS: f32 = 64.0;

/// Slope-scaled bias ceiling; steep grazing angles get up to this much.
const MAX_SLOPE_BIAS: f32 = 0.05;

/// Data interpolated across the triangle surface, passed from the vertex
/// stage through the rasterizer to the fragment stage.
#[derive(Clone, Copy, Debug)]
pub struct PhongVarying {
    /// Normal vector in world space.
    pub normal: Vector3<f32>,
    /// Position in world space (needed for the view and light vectors and
    /// for the shadow lookup).
    pub world_pos: Point3<f32>,
    /// Texture coordinates (UV).
    pub uv: Vector2<f32>,
}

// Math operations required for barycentric interpolation. nalgebra's
// Point3 doesn't add directly, so it goes through coordinates.
impl Add for PhongVarying {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            normal: self.normal + other.normal,
            world_pos: Point3::from(self.world_pos.coords + other.world_pos.coords),
            uv: self.uv + other.uv,
        }
    }
}

impl Mul<f32> for PhongVarying {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            normal: self.normal * scalar,
            world_pos: Point3::from(self.world_pos.coords * scalar),
            uv: self.uv * scalar,
        }
    }
}

impl Interpolatable for PhongVarying {}

/// The color-pass shader: textured Phong lighting attenuated by the
/// shadow test against the depth map rendered earlier in the frame.
pub struct PhongShader {
    pub model_matrix: Matrix4<f32>,
    pub view_matrix: Matrix4<f32>,
    pub projection_matrix: Matrix4<f32>,
    normal_matrix: Matrix3<f32>,

    pub camera_pos: Point3<f32>,
    pub light_position: Point3<f32>,
    pub light_color: Vector3<f32>,

    /// Must be the same value the depth pass rendered with this frame;
    /// a diverging matrix misaligns every shadow lookup.
    pub light_space_matrix: Matrix4<f32>,

    pub texture: Arc<Texture>,
    pub shadow_map: DepthMap,
    pub shadow_bias: f32,
}

impl PhongShader {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        camera_pos: Point3<f32>,
        light: &DirectionalLight,
        light_space_matrix: Matrix4<f32>,
        texture: Arc<Texture>,
        shadow_map: DepthMap,
        shadow_bias: f32,
    ) -> Self {
        // Inverse-transpose keeps normals correct under the planes'
        // non-uniform scale.
        let model_3x3 = model.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = model_3x3.try_inverse().unwrap_or(model_3x3).transpose();

        Self {
            model_matrix: model,
            view_matrix: view,
            projection_matrix: projection,
            normal_matrix,
            camera_pos,
            light_position: light.position,
            light_color: light.color,
            light_space_matrix,
            texture,
            shadow_map,
            shadow_bias,
        }
    }

    /// Shadow test: 1.0 when the fragment is lit, 0.0 when occluded.
    ///
    /// The fragment's world position is carried into light space, remapped
    /// to [0, 1] UV + depth, and compared against the stored depth with a
    /// slope-scaled bias. Off-map lookups and fragments beyond the light's
    /// far plane always count as lit.
    fn shadow_visibility(&self, world_pos: &Point3<f32>, n_dot_l: f32) -> f32 {
        let light_space_pos = self.light_space_matrix * world_pos.to_homogeneous();
        let proj_coords = light_space_pos.xyz() / light_space_pos.w;

        let u = proj_coords.x * 0.5 + 0.5;
        let v = 1.0 - (proj_coords.y * 0.5 + 0.5); // Flip Y to match the raster orientation
        let current_depth = proj_coords.z * 0.5 + 0.5;

        if current_depth > 1.0 {
            return 1.0;
        }

        let bias = self.shadow_bias.max(MAX_SLOPE_BIAS * (1.0 - n_dot_l));

        // depth_at returns infinity off-map, so the comparison below can
        // never flag an off-map fragment as shadowed.
        let stored_depth = self.shadow_map.depth_at(u, v);
        if current_depth - bias > stored_depth {
            0.0
        } else {
            1.0
        }
    }
}

impl Shader for PhongShader {
    type Varying = PhongVarying;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        let world_pos_homo = self.model_matrix * vertex.position.to_homogeneous();
        let world_pos = Point3::from_homogeneous(world_pos_homo).unwrap();

        let world_normal = (self.normal_matrix * vertex.normal).normalize();

        let mvp = self.projection_matrix * self.view_matrix * self.model_matrix;
        let clip_pos = mvp * vertex.position.to_homogeneous();

        let varying = PhongVarying {
            normal: world_normal,
            world_pos,
            uv: vertex.texcoord,
        };

        (clip_pos, varying)
    }

    fn fragment(&self, varying: Self::Varying) -> Vector3<f32> {
        let tex_color = self.texture.sample(varying.uv.x, varying.uv.y);

        let normal = varying.normal.normalize();
        let light_dir = (self.light_position - varying.world_pos).normalize();
        let view_dir = (self.camera_pos - varying.world_pos).normalize();

        // Ambient
        let ambient = self.light_color * AMBIENT_STRENGTH;

        // Diffuse
        let diff = normal.dot(&light_dir).max(0.0);
        let diffuse = self.light_color * diff;

        // Specular
        let reflect_dir = (normal * (2.0 * normal.dot(&light_dir)) - light_dir).normalize();
        let spec = view_dir.dot(&reflect_dir).max(0.0).powf(SHININESS);
        let specular = self.light_color * (spec * SPECULAR_STRENGTH);

        // Only the direct terms are shadowed; ambient light leaks into
        // occluded regions so they stay readable.
        let visibility = self.shadow_visibility(&varying.world_pos, diff);
        let lit = ambient + (diffuse + specular) * visibility;

        let result = lit.component_mul(&tex_color);
        Vector3::new(result.x.min(1.0), result.y.min(1.0), result.z.min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::transform;
    use crate::scene::texture::DepthMap;

    fn test_shader(shadow_map: DepthMap) -> PhongShader {
        let light = DirectionalLight::default();
        let light_space = light.light_space_matrix();
        PhongShader::new(
            Matrix4::identity(),
            Matrix4::identity(),
            transform::scene_projection(),
            Point3::new(0.0, 0.0, 3.0),
            &light,
            light_space,
            Arc::new(Texture::flat(Vector3::new(1.0, 1.0, 1.0))),
            shadow_map,
            0.005,
        )
    }

    #[test]
    fn fragment_outside_shadow_frustum_is_lit() {
        // An all-near depth map would shadow everything it covers; a point
        // far outside the ortho bounds must still come back fully lit.
        let shader = test_shader(DepthMap::new(vec![0.0; 4], 2));
        let visibility = shader.shadow_visibility(&Point3::new(500.0, 0.0, 0.0), 1.0);
        assert_eq!(visibility, 1.0);
    }

    #[test]
    fn empty_depth_map_never_shadows() {
        let shader = test_shader(DepthMap::new(vec![f32::INFINITY; 4], 2));
        for p in [
            Point3::origin(),
            Point3::new(0.5, -0.5, -1.0),
            Point3::new(-2.0, 1.0, -3.0),
        ] {
            assert_eq!(shader.shadow_visibility(&p, 1.0), 1.0);
        }
    }

    #[test]
    fn near_depth_map_shadows_covered_fragments() {
        // Every texel claims something sits right at the light's near
        // plane, so any in-frustum fragment behind it is occluded.
        let shader = test_shader(DepthMap::new(vec![0.0; 4], 2));
        let visibility = shader.shadow_visibility(&Point3::origin(), 1.0);
        assert_eq!(visibility, 0.0);
    }

    #[test]
    fn varying_interpolation_is_linear() {
        let a = PhongVarying {
            normal: Vector3::x(),
            world_pos: Point3::new(0.0, 0.0, 0.0),
            uv: Vector2::new(0.0, 0.0),
        };
        let b = PhongVarying {
            normal: Vector3::y(),
            world_pos: Point3::new(2.0, 4.0, 6.0),
            uv: Vector2::new(1.0, 0.5),
        };
        let mid = a * 0.5 + b * 0.5;
        assert!((mid.world_pos.coords - Vector3::new(1.0, 2.0, 3.0)).norm() < 1e-6);
        assert!((mid.uv - Vector2::new(0.5, 0.25)).norm() < 1e-6);
        assert!((mid.normal - Vector3::new(0.5, 0.5, 0.0)).norm() < 1e-6);
    }
}
