use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};
use log::{info, warn};
use nalgebra::Vector3;
use std::path::Path;
use std::sync::Arc;

/// Represents a 2D color texture.
#[derive(Debug, Clone)]
pub struct Texture {
    pub image: Arc<DynamicImage>,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path_ref = path.as_ref();
        let img = image::open(path_ref).map_err(|e| format!("Failed to load texture: {}", e))?;

        let width = img.width();
        let height = img.height();

        info!("Loaded texture: {:?} ({}x{})", path_ref, width, height);

        Ok(Self {
            width,
            height,
            image: Arc::new(img),
        })
    }

    /// A 1x1 texture of a single linear-space color. Serves as the defined
    /// fallback when an image fails to decode.
    pub fn flat(color: Vector3<f32>) -> Self {
        let encode = |c: f32| (c.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8;
        let pixel = Rgb([encode(color.x), encode(color.y), encode(color.z)]);
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, pixel));
        Self {
            image: Arc::new(image),
            width: 1,
            height: 1,
        }
    }

    /// Loads `path`, falling back to a flat `fallback`-colored texture on
    /// decode failure. The failure is logged and rendering continues.
    pub fn load_or_fallback<P: AsRef<Path>>(path: P, fallback: Vector3<f32>) -> Self {
        match Self::load(&path) {
            Ok(texture) => texture,
            Err(e) => {
                warn!(
                    "{} - using a flat {:.2}/{:.2}/{:.2} fallback",
                    e, fallback.x, fallback.y, fallback.z
                );
                Self::flat(fallback)
            }
        }
    }

    /// Samples the texture using bilinear interpolation.
    /// UV coordinates outside [0, 1] wrap (repeat mode).
    pub fn sample(&self, u: f32, v: f32) -> Vector3<f32> {
        // 1. Wrap via fract(); handles u=1.5 -> 0.5 and u=-0.5 -> 0.5
        let u = u.fract();
        let v = v.fract();
        let u = if u < 0.0 { 1.0 + u } else { u };
        let v = if v < 0.0 { 1.0 + v } else { v };

        // 2. Map to pixel coordinates; -0.5 because pixel centers sit at 0.5
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5; // Flip V for standard UV

        // 3. The 2x2 pixel block around the sample point
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let x1 = x0 + 1;
        let y1 = y0 + 1;

        let wx = x - x.floor();
        let wy = y - y.floor();

        let c00 = self.get_pixel_wrapped(x0, y0);
        let c10 = self.get_pixel_wrapped(x1, y0);
        let c01 = self.get_pixel_wrapped(x0, y1);
        let c11 = self.get_pixel_wrapped(x1, y1);

        let top = c00 * (1.0 - wx) + c10 * wx;
        let bottom = c01 * (1.0 - wx) + c11 * wx;
        let final_color = top * (1.0 - wy) + bottom * wy;

        // sRGB to linear before any lighting math (approximated as pow 2.2).
        Vector3::new(
            final_color.x.powf(2.2),
            final_color.y.powf(2.2),
            final_color.z.powf(2.2),
        )
    }

    /// Pixel fetch with repeat wrapping.
    fn get_pixel_wrapped(&self, x: i32, y: i32) -> Vector3<f32> {
        let w = self.width as i32;
        let h = self.height as i32;

        // Euclidean modulo so negative coordinates wrap upward.
        let x_wrapped = ((x % w) + w) % w;
        let y_wrapped = ((y % h) + h) % h;

        let pixel = self.image.get_pixel(x_wrapped as u32, y_wrapped as u32);

        Vector3::new(
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        )
    }
}

/// The depth map produced by the shadow pass and consumed by the color
/// pass. Cloning shares the underlying snapshot.
///
/// Lookups outside [0, 1] return `f32::INFINITY`, the same value an
/// untouched depth texel holds - so any depth comparison against an
/// off-map sample concludes "not in shadow".
#[derive(Debug, Clone)]
pub struct DepthMap {
    data: Arc<Vec<f32>>,
    size: usize,
}

impl DepthMap {
    pub fn new(data: Vec<f32>, size: usize) -> Self {
        debug_assert_eq!(data.len(), size * size);
        Self {
            data: Arc::new(data),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest-texel depth lookup in [0, 1] UV space.
    pub fn depth_at(&self, u: f32, v: f32) -> f32 {
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return f32::INFINITY;
        }
        let max = (self.size - 1) as f32;
        let x = (u * max).clamp(0.0, max) as usize;
        let y = (v * max).clamp(0.0, max) as usize;
        self.data[y * self.size + x]
    }
}
