use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

const PITCH_LIMIT_DEG: f32 = 89.0;
const DEGENERATE_EPS: f32 = 1e-6;

/// One frame's worth of input, as delivered by the windowing layer.
/// `mouse_dy` is positive when the cursor moved down the screen.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSample {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    /// Seconds since the previous sample. Negative values (clock rollback)
    /// are treated as zero.
    pub dt: f32,
}

/// First-person camera.
///
/// The look direction is split in two: `aim_forward` is the full 3D
/// direction driving the view matrix, while `movement_forward` is its
/// projection onto the horizontal plane, used for walk-style WASD
/// translation so that looking up does not lift the camera off the ground.
pub struct Camera {
    pub position: Point3<f32>,
    /// Unit look direction.
    pub aim_forward: Vector3<f32>,
    /// Unit horizontal walk direction (y = 0), or zero when the aim is
    /// vertical enough that no horizontal component remains.
    pub movement_forward: Vector3<f32>,
    /// Degrees; -90 looks down -Z.
    pub yaw: f32,
    /// Degrees, clamped to [-89, 89].
    pub pitch: f32,
    /// Walk speed in units per second.
    pub speed: f32,
    /// Mouse sensitivity in degrees per pixel of cursor travel.
    pub sensitivity: f32,

    initial_forward: Vector3<f32>,
}

impl Camera {
    pub fn new(
        position: Point3<f32>,
        initial_forward: Vector3<f32>,
        speed: f32,
        sensitivity: f32,
    ) -> Self {
        let aim_forward = initial_forward.normalize();
        Self {
            position,
            aim_forward,
            movement_forward: movement_from_aim(&aim_forward),
            yaw: -90.0,
            pitch: 0.0,
            speed,
            sensitivity,
            initial_forward,
        }
    }

    /// Applies one frame of input: mouse-look first, then WASD translation
    /// along the horizontal walk vectors. The camera is the sole writer of
    /// its own state and is updated exactly once per frame.
    pub fn update(&mut self, input: &InputSample) {
        let dt = input.dt.max(0.0);

        // The orientation only changes when the cursor actually moved, so
        // an untouched mouse leaves the startup aim in place.
        if input.mouse_dx != 0.0 || input.mouse_dy != 0.0 {
            self.yaw += input.mouse_dx * self.sensitivity;
            self.pitch = (self.pitch - input.mouse_dy * self.sensitivity)
                .clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);

            let yaw = self.yaw.to_radians();
            let pitch = self.pitch.to_radians();
            let front = Vector3::new(
                yaw.cos() * pitch.cos(),
                pitch.sin(),
                yaw.sin() * pitch.cos(),
            )
            .normalize();

            // The effective look direction blends the fresh front vector
            // with the startup forward instead of replacing it, keeping the
            // view biased toward the initial orientation.
            self.aim_forward = (front + self.initial_forward).normalize();
            self.movement_forward = movement_from_aim(&self.aim_forward);
        }

        let step = self.speed * dt;
        if input.forward {
            self.position += self.movement_forward * step;
        }
        if input.backward {
            self.position -= self.movement_forward * step;
        }

        let strafe = self.movement_forward.cross(&Vector3::y());
        if strafe.norm_squared() > DEGENERATE_EPS {
            let strafe = strafe.normalize();
            if input.left {
                self.position -= strafe * step;
            }
            if input.right {
                self.position += strafe * step;
            }
        }
    }

    /// View matrix for the current pose; computed once per frame by the
    /// color pass and shared by every instance.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        TransformFactory::view(
            &self.position,
            &(self.position + self.aim_forward),
            &Vector3::y(),
        )
    }
}

/// Horizontal walk direction derived from the aim: the vertical component
/// is dropped and the remainder renormalized. A (near-)vertical aim has no
/// horizontal remainder and yields the zero vector.
fn movement_from_aim(aim: &Vector3<f32>) -> Vector3<f32> {
    let horizontal = Vector3::new(aim.x, 0.0, aim.z);
    if horizontal.norm_squared() > DEGENERATE_EPS {
        horizontal.normalize()
    } else {
        Vector3::zeros()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_POSITION: Point3<f32> = Point3::new(2.0, 0.0, 3.0);
    const START_FORWARD: Vector3<f32> = Vector3::new(-0.7, 0.0, -0.7);

    fn test_camera() -> Camera {
        Camera::new(START_POSITION, START_FORWARD, 2.5, 0.1)
    }

    fn look(camera: &mut Camera, dx: f32, dy: f32) {
        camera.update(&InputSample {
            mouse_dx: dx,
            mouse_dy: dy,
            ..InputSample::default()
        });
    }

    #[test]
    fn aim_stays_unit_length_across_arbitrary_look_input() {
        let mut camera = test_camera();
        let deltas = [
            (5.0, -3.0),
            (123.0, 40.0),
            (-800.0, -500.0),
            (0.1, 2000.0),
            (10000.0, -1.0),
        ];
        for (dx, dy) in deltas {
            look(&mut camera, dx, dy);
            assert!((camera.aim_forward.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn pitch_clamps_at_89_degrees_both_ways() {
        let mut camera = test_camera();
        for _ in 0..100 {
            look(&mut camera, 0.0, -50.0); // mouse up
            assert!(camera.pitch <= 89.0);
        }
        assert_eq!(camera.pitch, 89.0);

        for _ in 0..100 {
            look(&mut camera, 0.0, 50.0); // mouse down
            assert!(camera.pitch >= -89.0);
        }
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn movement_forward_is_always_horizontal() {
        let mut camera = test_camera();
        for (dx, dy) in [(30.0, -400.0), (-90.0, 900.0), (45.0, -123.0)] {
            look(&mut camera, dx, dy);
            assert_eq!(camera.movement_forward.y, 0.0);
            let norm = camera.movement_forward.norm();
            assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn vertical_aim_yields_zero_movement_vector() {
        assert_eq!(movement_from_aim(&Vector3::y()), Vector3::zeros());
        assert_eq!(movement_from_aim(&-Vector3::y()), Vector3::zeros());
    }

    #[test]
    fn holding_forward_for_one_second_walks_along_start_direction() {
        let mut camera = test_camera();
        camera.update(&InputSample {
            forward: true,
            dt: 1.0,
            ..InputSample::default()
        });

        let expected = START_POSITION + START_FORWARD.normalize() * 2.5;
        assert!((camera.position - expected).norm() < 1e-5);
    }

    #[test]
    fn negative_dt_is_treated_as_no_movement() {
        let mut camera = test_camera();
        camera.update(&InputSample {
            forward: true,
            dt: -0.5,
            ..InputSample::default()
        });
        assert_eq!(camera.position, START_POSITION);
    }

    #[test]
    fn strafing_is_perpendicular_to_walk_direction() {
        let mut camera = test_camera();
        camera.update(&InputSample {
            right: true,
            dt: 1.0,
            ..InputSample::default()
        });
        let offset = camera.position - START_POSITION;
        assert!(offset.dot(&camera.movement_forward).abs() < 1e-5);
        assert!((offset.norm() - 2.5).abs() < 1e-5);
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn look_direction_stays_biased_toward_start() {
        // After swinging the yaw a half turn, a pure yaw/pitch front would
        // point away from the start direction (negative dot product). The
        // blended aim still leans toward it.
        let mut camera = test_camera();
        look(&mut camera, 1800.0, 0.0); // 180 degrees at 0.1 sensitivity
        assert!(camera.aim_forward.dot(&START_FORWARD.normalize()) > 0.0);
        assert!((camera.aim_forward.norm() - 1.0).abs() < 1e-5);
    }
}
