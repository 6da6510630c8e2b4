use crate::scene::camera::InputSample;
use minifb::{Key, MouseButton, MouseMode, Window};

/// Turns minifb's polled state into one `InputSample` per frame.
///
/// The window reports absolute cursor positions, so the collector tracks
/// the previous position to derive deltas. Look input is only active while
/// the left mouse button is held; releasing it resets the tracked position
/// so the cursor can be repositioned without snapping the view.
pub struct InputCollector {
    last_mouse_pos: Option<(f32, f32)>,
}

impl InputCollector {
    pub fn new() -> Self {
        Self {
            last_mouse_pos: None,
        }
    }

    pub fn sample(&mut self, window: &Window, dt: f32) -> InputSample {
        let (mouse_dx, mouse_dy) = self.mouse_delta(window);

        InputSample {
            forward: window.is_key_down(Key::W),
            backward: window.is_key_down(Key::S),
            left: window.is_key_down(Key::A),
            right: window.is_key_down(Key::D),
            mouse_dx,
            mouse_dy,
            dt,
        }
    }

    /// Cursor delta since the last sample, in screen pixels (dy grows
    /// downward). Zero while the look button is up.
    fn mouse_delta(&mut self, window: &Window) -> (f32, f32) {
        if !window.get_mouse_down(MouseButton::Left) {
            self.last_mouse_pos = None;
            return (0.0, 0.0);
        }

        let Some((x, y)) = window.get_mouse_pos(MouseMode::Pass) else {
            return (0.0, 0.0);
        };

        let delta = match self.last_mouse_pos {
            Some((last_x, last_y)) => (x - last_x, y - last_y),
            None => (0.0, 0.0),
        };
        self.last_mouse_pos = Some((x, y));
        delta
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}
