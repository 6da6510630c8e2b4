use crate::core::framebuffer::FrameBuffer;
use crate::core::math::transform::{apply_perspective_division, ndc_to_screen};
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Point2, Vector3, Vector4};
use rayon::prelude::*;

const EPSILON: f32 = 1e-5;

/// Rasterize a single triangle given clip-space coordinates and the
/// corresponding varyings.
///
/// Performs Sutherland–Hodgman clipping against the canonical view frustum
/// (W-normalization planes) in homogeneous clip space, then shades the
/// surviving fan of triangles. Faces are never culled; the scene's planes
/// are visible from both sides.
pub fn rasterize_triangle<S: Shader>(
    framebuffer: &FrameBuffer,
    shader: &S,
    clip_coords: &[Vector4<f32>; 3],
    varyings: &[S::Varying; 3],
) {
    // Double-buffered vertex lists keep the multi-stage clipping loop free
    // of per-stage allocations. A triangle clipped by all six planes has at
    // most 9 vertices; 16 leaves headroom.
    let mut current_poly: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);
    let mut clip_buffer: Vec<(Vector4<f32>, S::Varying)> = Vec::with_capacity(16);

    for i in 0..3 {
        current_poly.push((clip_coords[i], varyings[i]));
    }

    // Clip planes as (axis index, sign); plane equation: sign * P[axis] <= P.w
    let planes = [
        (0, 1.0),  // right:  +X <= W
        (0, -1.0), // left:   -X <= W
        (1, 1.0),  // top:    +Y <= W
        (1, -1.0), // bottom: -Y <= W
        (2, 1.0),  // far:    +Z <= W
        (2, -1.0), // near:   -Z <= W
    ];

    for &(axis, sign) in &planes {
        if current_poly.is_empty() {
            return;
        }
        clip_polygon_against_plane::<S>(&current_poly, &mut clip_buffer, axis, sign);
        std::mem::swap(&mut current_poly, &mut clip_buffer);
    }

    // The result is a convex polygon; triangulate as a fan centered at v0.
    if current_poly.len() < 3 {
        return;
    }

    let v0 = current_poly[0];
    for i in 1..(current_poly.len() - 1) {
        let v1 = current_poly[i];
        let v2 = current_poly[i + 1];
        rasterize_clipped_triangle(
            framebuffer,
            shader,
            &[v0.0, v1.0, v2.0],
            &[v0.1, v1.1, v2.1],
        );
    }
}

/// Clips a polygon against one frustum plane, writing into `output`
/// (cleared first).
fn clip_polygon_against_plane<S: Shader>(
    input: &[(Vector4<f32>, S::Varying)],
    output: &mut Vec<(Vector4<f32>, S::Varying)>,
    axis: usize,
    sign: f32,
) {
    output.clear();

    if input.is_empty() {
        return;
    }

    let mut prev = input[input.len() - 1];
    // Inside test with a small tolerance for floating point robustness.
    let is_inside = |p: &Vector4<f32>| sign * p[axis] <= p.w + 1e-6;

    let mut prev_inside = is_inside(&prev.0);

    for curr in input {
        let curr_inside = is_inside(&curr.0);

        if curr_inside {
            if !prev_inside {
                // OUT -> IN: intersection point, then the current point
                if let Some(inter) = intersect_edge_plane::<S>(prev, *curr, axis, sign) {
                    output.push(inter);
                }
            }
            output.push(*curr);
        } else if prev_inside {
            // IN -> OUT: intersection point only
            if let Some(inter) = intersect_edge_plane::<S>(prev, *curr, axis, sign) {
                output.push(inter);
            }
        }

        prev = *curr;
        prev_inside = curr_inside;
    }
}

/// Intersection of an edge with a clip plane; linearly interpolates both
/// the position and the varying.
#[inline(always)]
fn intersect_edge_plane<S: Shader>(
    a: (Vector4<f32>, S::Varying),
    b: (Vector4<f32>, S::Varying),
    axis: usize,
    sign: f32,
) -> Option<(Vector4<f32>, S::Varying)> {
    let ac = a.0[axis];
    let bc = b.0[axis];
    let aw = a.0.w;
    let bw = b.0.w;

    // Signed distance difference relative to the W plane.
    let denom = sign * (bc - ac) - (bw - aw);
    if denom.abs() < 1e-9 {
        return None;
    }

    let t = (aw - sign * ac) / denom;
    if !t.is_finite() {
        return None;
    }

    let pos = a.0 + (b.0 - a.0) * t;
    let vary = a.1 * (1.0 - t) + b.1 * t;
    Some((pos, vary))
}

/// Rasterizes a triangle that is guaranteed to lie inside the frustum:
/// perspective division, viewport transform, then the shaded pixel loop.
fn rasterize_clipped_triangle<S: Shader>(
    framebuffer: &FrameBuffer,
    shader: &S,
    clip_coords: &[Vector4<f32>; 3],
    varyings: &[S::Varying; 3],
) {
    let width = framebuffer.width as f32;
    let height = framebuffer.height as f32;

    // 1. Perspective division & viewport transform
    let mut screen_coords = [Point2::origin(); 3];
    let mut w_values = [0.0; 3];

    for i in 0..3 {
        // Clipping keeps w away from zero; guard anyway.
        if clip_coords[i].w.abs() < 1e-6 {
            return;
        }

        let ndc = apply_perspective_division(&clip_coords[i]);
        w_values[i] = clip_coords[i].w;
        screen_coords[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
    }

    // 2. Bounding box + scissor
    let (min_x, min_y, max_x, max_y) = bounding_box(&screen_coords);

    if max_x < 0 || max_y < 0 || min_x >= framebuffer.width as i32 || min_y >= framebuffer.height as i32
    {
        return;
    }

    let start_x = min_x.max(0) as usize;
    let end_x = (max_x.min(framebuffer.width as i32 - 1)) as usize;
    let start_y = min_y.max(0) as usize;
    let end_y = (max_y.min(framebuffer.height as i32 - 1)) as usize;

    // 3. Pixel loop. Row-parallel; work-stealing is effective since row
    // workloads vary across the bounding box.
    (start_y..=end_y).into_par_iter().for_each(|y| {
        for x in start_x..=end_x {
            let pixel_center = Point2::new(x as f32 + 0.5, y as f32 + 0.5);

            let Some(bary) = barycentric_coordinates(
                pixel_center,
                screen_coords[0],
                screen_coords[1],
                screen_coords[2],
            ) else {
                continue;
            };
            if !is_inside_triangle(bary) {
                continue;
            }

            // Perspective-correct barycentrics computed once and reused for
            // depth and all vertex attributes.
            let Some(corrected) =
                perspective_correct_barycentric(bary, w_values[0], w_values[1], w_values[2])
            else {
                continue;
            };

            let z_ndc = corrected.x * clip_coords[0].z
                + corrected.y * clip_coords[1].z
                + corrected.z * clip_coords[2].z;
            // Map NDC z to the [0, 1] depth range.
            let depth = z_ndc * 0.5 + 0.5;

            // Early depth test
            if framebuffer.depth_test_and_update(x, y, depth) {
                let interpolated = varyings[0] * corrected.x
                    + varyings[1] * corrected.y
                    + varyings[2] * corrected.z;

                let color = shader.fragment(interpolated);
                framebuffer.set_pixel_safe(x, y, color);
            }
        }
    });
}

fn bounding_box(points: &[Point2<f32>; 3]) -> (i32, i32, i32, i32) {
    let min_x = points[0].x.min(points[1].x).min(points[2].x).floor() as i32;
    let min_y = points[0].y.min(points[1].y).min(points[2].y).floor() as i32;
    let max_x = points[0].x.max(points[1].x).max(points[2].x).ceil() as i32;
    let max_y = points[0].y.max(points[1].y).max(points[2].y).ceil() as i32;
    (min_x, min_y, max_x, max_y)
}

/// Barycentric coordinates (alpha, beta, gamma) of point p with respect to
/// triangle (v1, v2, v3). Returns `None` for degenerate triangles.
fn barycentric_coordinates(
    p: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    v3: Point2<f32>,
) -> Option<Vector3<f32>> {
    let e1 = v2 - v1;
    let e2 = v3 - v1;
    let p_v1 = p - v1;

    // Determinant = 2x the triangle area
    let total_area_x2 = e1.x * e2.y - e1.y * e2.x;
    if total_area_x2.abs() < EPSILON {
        return None;
    }

    let inv_total_area_x2 = 1.0 / total_area_x2;
    let beta = (p_v1.x * e2.y - p_v1.y * e2.x) * inv_total_area_x2;
    let gamma = (e1.x * p_v1.y - e1.y * p_v1.x) * inv_total_area_x2;
    let alpha = 1.0 - beta - gamma;

    Some(Vector3::new(alpha, beta, gamma))
}

#[inline(always)]
fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Perspective-correct barycentric coordinates:
///   alpha' = (alpha / w1) / sum, etc.
/// Returns `None` when the weight sum is numerically unstable.
fn perspective_correct_barycentric(
    bary: Vector3<f32>,
    w1: f32,
    w2: f32,
    w3: f32,
) -> Option<Vector3<f32>> {
    let inv_w1 = if w1.abs() > EPSILON { 1.0 / w1 } else { 1.0 };
    let inv_w2 = if w2.abs() > EPSILON { 1.0 / w2 } else { 1.0 };
    let inv_w3 = if w3.abs() > EPSILON { 1.0 / w3 } else { 1.0 };

    let wa = bary.x * inv_w1;
    let wb = bary.y * inv_w2;
    let wc = bary.z * inv_w3;

    let sum = wa + wb + wc;
    if sum.abs() < EPSILON {
        return None;
    }
    let inv_sum = 1.0 / sum;
    Some(Vector3::new(wa * inv_sum, wb * inv_sum, wc * inv_sum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use std::ops::{Add, Mul};

    #[derive(Clone, Copy)]
    struct NoVarying;

    impl Add for NoVarying {
        type Output = Self;
        fn add(self, _other: Self) -> Self {
            Self
        }
    }

    impl Mul<f32> for NoVarying {
        type Output = Self;
        fn mul(self, _scalar: f32) -> Self {
            Self
        }
    }

    impl Interpolatable for NoVarying {}

    struct FlatShader {
        color: Vector3<f32>,
        depth: f32,
    }

    impl Shader for FlatShader {
        type Varying = NoVarying;

        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, NoVarying) {
            let p = vertex.position;
            (Vector4::new(p.x, p.y, self.depth, 1.0), NoVarying)
        }

        fn fragment(&self, _varying: NoVarying) -> Vector3<f32> {
            self.color
        }
    }

    fn clip_triangle(shader: &FlatShader) -> ([Vector4<f32>; 3], [NoVarying; 3]) {
        // Covers the whole NDC square, so every pixel gets shaded.
        let verts = [
            Vertex::new(
                nalgebra::Point3::new(-3.0, -3.0, 0.0),
                Vector3::z(),
                nalgebra::Vector2::zeros(),
            ),
            Vertex::new(
                nalgebra::Point3::new(3.0, -3.0, 0.0),
                Vector3::z(),
                nalgebra::Vector2::zeros(),
            ),
            Vertex::new(
                nalgebra::Point3::new(0.0, 3.0, 0.0),
                Vector3::z(),
                nalgebra::Vector2::zeros(),
            ),
        ];
        let mut coords = [Vector4::zeros(); 3];
        let mut varyings = [NoVarying; 3];
        for (i, v) in verts.iter().enumerate() {
            let (c, var) = shader.vertex(v);
            coords[i] = c;
            varyings[i] = var;
        }
        (coords, varyings)
    }

    #[test]
    fn covering_triangle_fills_buffer() {
        let fb = FrameBuffer::new(8, 8);
        let shader = FlatShader {
            color: Vector3::new(1.0, 0.0, 0.0),
            depth: 0.0,
        };
        let (coords, varyings) = clip_triangle(&shader);
        rasterize_triangle(&fb, &shader, &coords, &varyings);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(fb.get_pixel(x, y), Some(Vector3::new(1.0, 0.0, 0.0)));
                assert!(fb.depth_at(x, y).unwrap() < f32::INFINITY);
            }
        }
    }

    #[test]
    fn nearer_triangle_wins_depth_test() {
        let fb = FrameBuffer::new(8, 8);

        let far = FlatShader {
            color: Vector3::new(0.0, 1.0, 0.0),
            depth: 0.5,
        };
        let (coords, varyings) = clip_triangle(&far);
        rasterize_triangle(&fb, &far, &coords, &varyings);

        let near = FlatShader {
            color: Vector3::new(0.0, 0.0, 1.0),
            depth: -0.5,
        };
        let (coords, varyings) = clip_triangle(&near);
        rasterize_triangle(&fb, &near, &coords, &varyings);

        // Drawing the far one again must not overwrite the near result.
        let (coords, varyings) = clip_triangle(&far);
        rasterize_triangle(&fb, &far, &coords, &varyings);

        assert_eq!(fb.get_pixel(4, 4), Some(Vector3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn triangle_behind_near_plane_is_clipped_away() {
        let fb = FrameBuffer::new(8, 8);
        let shader = FlatShader {
            color: Vector3::new(1.0, 1.0, 1.0),
            depth: -5.0, // -z > w for every vertex: fully outside
        };
        let (coords, varyings) = clip_triangle(&shader);
        rasterize_triangle(&fb, &shader, &coords, &varyings);

        assert_eq!(fb.get_pixel(4, 4), Some(Vector3::zeros()));
    }
}
