use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

//=================================
// Transform Matrix Factory
//=================================

/// Factory for creating transformation matrices.
/// Manually implemented to keep full control over the coordinate system
/// (right-handed, camera looking down -Z).
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Creates a rotation matrix around an arbitrary axis using Rodrigues'
    /// rotation formula. The axis does not need to be normalized.
    pub fn rotation(axis: &Vector3<f32>, angle_rad: f32) -> Matrix4<f32> {
        let axis_unit = axis.normalize();
        let x = axis_unit.x;
        let y = axis_unit.y;
        let z = axis_unit.z;
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        let t = 1.0 - c;

        Matrix4::new(
            t * x * x + c,     t * x * y - z * s, t * x * z + y * s, 0.0,
            t * x * y + z * s, t * y * y + c,     t * y * z - x * s, 0.0,
            t * x * z - y * s, t * y * z + x * s, t * z * z + c,     0.0,
            0.0,               0.0,               0.0,               1.0,
        )
    }

    /// Creates a rotation matrix around the X-axis.
    pub fn rotation_x(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c,  -s,   0.0,
            0.0, s,   c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Y-axis.
    pub fn rotation_y(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,   0.0, s,   0.0,
            0.0, 1.0, 0.0, 0.0,
           -s,   0.0, c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a rotation matrix around the Z-axis.
    pub fn rotation_z(angle_rad: f32) -> Matrix4<f32> {
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        Matrix4::new(
            c,  -s,   0.0, 0.0,
            s,   c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a translation matrix.
    pub fn translation(translation: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, translation.x,
            0.0, 1.0, 0.0, translation.y,
            0.0, 0.0, 1.0, translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Creates a non-uniform scaling matrix.
    pub fn scaling_nonuniform(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            scale.x, 0.0,     0.0,     0.0,
            0.0,     scale.y, 0.0,     0.0,
            0.0,     0.0,     scale.z, 0.0,
            0.0,     0.0,     0.0,     1.0,
        )
    }

    /// Euler rotation composed in X, then Y, then Z order:
    /// R = Rx(x) * Ry(y) * Rz(z).
    pub fn euler_xyz(x_rad: f32, y_rad: f32, z_rad: f32) -> Matrix4<f32> {
        Self::rotation_x(x_rad) * Self::rotation_y(y_rad) * Self::rotation_z(z_rad)
    }

    /// Creates a View matrix (Look-At, Right-Handed).
    /// Transforms world space coordinates to camera/view space.
    pub fn view(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        // In RHS, camera looks down -Z
        let z_axis = (eye - target).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = z_axis.cross(&x_axis);

        // Rotation matrix from world to view
        let rotation = Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, 0.0,
            y_axis.x, y_axis.y, y_axis.z, 0.0,
            z_axis.x, z_axis.y, z_axis.z, 0.0,
            0.0,      0.0,      0.0,      1.0,
        );

        // Translation matrix to move camera to origin
        let translation = Self::translation(&-eye.coords);

        rotation * translation
    }

    /// Creates a Perspective Projection matrix (Right-Handed).
    /// Maps the view frustum to NDC [-1, 1].
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Matrix4<f32> {
        let f = 1.0 / (fov_y_rad / 2.0).tan();
        let nf = 1.0 / (near - far);

        Matrix4::new(
            f / aspect_ratio, 0.0, 0.0,               0.0,
            0.0,              f,   0.0,               0.0,
            0.0,              0.0, (far + near) * nf, 2.0 * far * near * nf,
            0.0,              0.0, -1.0,              0.0,
        )
    }

    /// Creates an Orthographic Projection matrix (Right-Handed).
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Matrix4<f32> {
        let rl = 1.0 / (right - left);
        let tb = 1.0 / (top - bottom);
        let nf = 1.0 / (near - far);

        Matrix4::new(
            2.0 * rl, 0.0,      0.0,      -(right + left) * rl,
            0.0,      2.0 * tb, 0.0,      -(top + bottom) * tb,
            0.0,      0.0,      2.0 * nf, (far + near) * nf,
            0.0,      0.0,      0.0,      1.0,
        )
    }
}

//=================================
// Scene transform builders
//=================================

/// Vertical field of view of the scene camera.
const FOV_Y_DEG: f32 = 45.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Where the cube sits and how it is posed before the animated spin.
const CUBE_POSITION: Vector3<f32> = Vector3::new(0.0, 0.0, -2.0);
const CUBE_BASE_ORIENTATION: Vector3<f32> = Vector3::new(0.6, -1.0, -0.8);
const CUBE_SPIN_AXIS: Vector3<f32> = Vector3::new(0.6, -0.3, 0.3);

/// The scene's perspective projection. Cheap enough to rebuild per call;
/// the aspect ratio is fixed because the window never resizes.
pub fn scene_projection() -> Matrix4<f32> {
    TransformFactory::perspective(
        SCREEN_WIDTH as f32 / SCREEN_HEIGHT as f32,
        FOV_Y_DEG.to_radians(),
        NEAR_PLANE,
        FAR_PLANE,
    )
}

/// Model matrix of the animated cube at `time` seconds.
///
/// The translation and the fixed base orientation compose first; the
/// time-driven spin is then right-multiplied, so the spin axis lives in the
/// cube's already-posed local frame rather than pivoting the translated
/// cube around the world origin.
pub fn cube_model(time: f32) -> Matrix4<f32> {
    let base = TransformFactory::translation(&CUBE_POSITION)
        * TransformFactory::euler_xyz(
            CUBE_BASE_ORIENTATION.x,
            CUBE_BASE_ORIENTATION.y,
            CUBE_BASE_ORIENTATION.z,
        );
    base * TransformFactory::rotation(&CUBE_SPIN_AXIS, time)
}

/// Model matrix of a static instance: T * S * R, with the scale applied
/// before the Euler rotation. Scaling therefore acts along the instance's
/// pre-rotation axes.
pub fn static_model(
    position: &Vector3<f32>,
    orientation: &Vector3<f32>,
    scale: &Vector3<f32>,
) -> Matrix4<f32> {
    TransformFactory::translation(position)
        * TransformFactory::scaling_nonuniform(scale)
        * TransformFactory::euler_xyz(orientation.x, orientation.y, orientation.z)
}

//=================================
// Core Transformation Functions
//=================================

/// Performs perspective division: Clip Space -> NDC.
#[inline]
pub fn apply_perspective_division(clip: &Vector4<f32>) -> Point3<f32> {
    let w = clip.w;
    if w.abs() > 1e-6 {
        Point3::new(clip.x / w, clip.y / w, clip.z / w)
    } else {
        Point3::origin()
    }
}

/// Converts NDC coordinates to screen coordinates (Viewport Transform).
/// Note: the Y-axis is flipped (NDC +Y is up, screen +Y is down).
#[inline]
pub fn ndc_to_screen(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> Point2<f32> {
    Point2::new(
        (ndc_x + 1.0) * 0.5 * width,
        (1.0 - (ndc_y + 1.0) * 0.5) * height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_mat_eq(a: &Matrix4<f32>, b: &Matrix4<f32>, tolerance: f32) {
        assert!(
            (a - b).norm() < tolerance,
            "matrices differ:\n{a}\nvs\n{b}"
        );
    }

    fn apply(m: &Matrix4<f32>, p: Point3<f32>) -> Point3<f32> {
        Point3::from_homogeneous(m * p.to_homogeneous()).unwrap()
    }

    #[test]
    fn euler_xyz_matches_axis_composition() {
        let euler = TransformFactory::euler_xyz(0.6, -1.0, -0.8);
        let composed = TransformFactory::rotation_x(0.6)
            * TransformFactory::rotation_y(-1.0)
            * TransformFactory::rotation_z(-0.8);
        assert_mat_eq(&euler, &composed, 1e-6);
    }

    #[test]
    fn static_model_is_translate_scale_rotate() {
        // Hand check for the back wall: with scale (5,5,1) and a half-turn
        // around X, the local corner (0.5, 0.5, 0) must land at
        // T(0,1.5,-4) * S(5,5,1) * Rx(pi) applied to it.
        let model = static_model(
            &Vector3::new(0.0, 1.5, -4.0),
            &Vector3::new(PI, 0.0, 0.0),
            &Vector3::new(5.0, 5.0, 1.0),
        );
        let corner = apply(&model, Point3::new(0.5, 0.5, 0.0));

        // Rx(pi): (0.5, -0.5, 0); scale: (2.5, -2.5, 0); translate: (2.5, -1.0, -4.0)
        assert!((corner - Point3::new(2.5, -1.0, -4.0)).norm() < 1e-4);
    }

    #[test]
    fn static_model_scale_precedes_rotation() {
        // With a non-uniform scale the T*S*R order is distinguishable from
        // T*R*S: a quarter turn around Z swaps which axis the scale acts on.
        let tsr = static_model(
            &Vector3::zeros(),
            &Vector3::new(0.0, 0.0, PI / 2.0),
            &Vector3::new(2.0, 1.0, 1.0),
        );
        // Local +X rotates onto +Y first, then the scale stretches X.
        let p = apply(&tsr, Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-5);

        let q = apply(&tsr, Point3::new(0.0, -1.0, 0.0));
        assert!((q - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn cube_model_spin_is_right_multiplied() {
        let base = cube_model(0.0);
        let expected_base = TransformFactory::translation(&Vector3::new(0.0, 0.0, -2.0))
            * TransformFactory::euler_xyz(0.6, -1.0, -0.8);
        assert_mat_eq(&base, &expected_base, 1e-5);

        let spun = cube_model(1.3);
        let expected_spun =
            expected_base * TransformFactory::rotation(&Vector3::new(0.6, -0.3, 0.3), 1.3);
        assert_mat_eq(&spun, &expected_spun, 1e-5);
    }

    #[test]
    fn view_maps_eye_to_origin_and_target_to_negative_z() {
        let eye = Point3::new(2.0, 0.0, 3.0);
        let target = Point3::new(1.0, 0.0, 2.0);
        let view = TransformFactory::view(&eye, &target, &Vector3::y());

        assert!(apply(&view, eye).coords.norm() < 1e-5);

        let t = apply(&view, target);
        assert!(t.x.abs() < 1e-5);
        assert!(t.y.abs() < 1e-5);
        assert!(t.z < 0.0);
    }

    #[test]
    fn orthographic_maps_bounds_to_ndc_cube() {
        let ortho = TransformFactory::orthographic(-10.0, 10.0, -10.0, 10.0, 1.0, 7.5);

        let near_corner = apply(&ortho, Point3::new(-10.0, -10.0, -1.0));
        assert!((near_corner - Point3::new(-1.0, -1.0, -1.0)).norm() < 1e-5);

        let far_corner = apply(&ortho, Point3::new(10.0, 10.0, -7.5));
        assert!((far_corner - Point3::new(1.0, 1.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn projection_is_reproducible() {
        // Two independent computations must agree exactly; the frame loop
        // relies on recomputed matrices being interchangeable.
        assert_eq!(scene_projection(), scene_projection());
    }
}
