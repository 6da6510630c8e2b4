use nalgebra::Vector3;

/// Converts linear RGB to sRGB (gamma correction), applied when the frame
/// is packed for presentation.
pub fn linear_to_srgb(color: Vector3<f32>) -> Vector3<f32> {
    let gamma = 1.0 / 2.2;
    Vector3::new(
        color.x.powf(gamma),
        color.y.powf(gamma),
        color.z.powf(gamma),
    )
}
