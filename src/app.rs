use crate::io::config::Config;
use crate::pipeline::passes::{post_process_to_buffer, render_color_pass, render_depth_pass};
use crate::pipeline::renderer::Renderer;
use crate::scene::context::RenderContext;
use crate::ui::input::InputCollector;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH, SHADOW_MAP_SIZE};
use log::info;
use minifb::{Key, Window, WindowOptions};
use std::time::Instant;

/// Wall-clock state for the frame loop: the delta feeds camera movement,
/// the elapsed total drives the cube's spin.
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
        }
    }

    /// Advances the clock. Returns `(dt, elapsed)` in seconds.
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        (dt, (now - self.start).as_secs_f32())
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the demo: opens the window, then loops
/// clock -> input -> camera -> shadow pass -> color pass -> present
/// until the window closes or Escape is pressed.
pub fn run_gui(config: Config) {
    info!(
        "Starting ({}x{}, shadow map {}x{})...",
        SCREEN_WIDTH, SCREEN_HEIGHT, SHADOW_MAP_SIZE, SHADOW_MAP_SIZE
    );
    info!("Controls: WASD=Move, hold LeftMouse=Look, Esc=Quit");

    let mut window = Window::new(
        "Shadow Cube",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            resize: false,
            ..WindowOptions::default()
        },
    )
    .unwrap_or_else(|e| panic!("Failed to create window: {}", e));

    window.set_target_fps(60);

    let mut context = RenderContext::new(&config);
    let mut renderer = Renderer::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut shadow_renderer = Renderer::new(SHADOW_MAP_SIZE, SHADOW_MAP_SIZE);
    let mut input = InputCollector::new();
    let mut clock = FrameClock::new();

    let mut buffer = vec![0u32; SCREEN_WIDTH * SCREEN_HEIGHT];

    let mut frame_count = 0;
    let mut last_fps_update = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let (dt, elapsed) = clock.tick();

        // --- Input ---
        let sample = input.sample(&window, dt);
        context.camera.update(&sample);

        // --- Render ---
        // Both passes consume the same draw list and the same light-space
        // matrix; the depth map flows from the first pass into the second.
        let draws = context.draw_list(elapsed);
        let light_space = context.light.light_space_matrix();

        let shadow_map = render_depth_pass(&draws, &light_space, &mut shadow_renderer);
        render_color_pass(&draws, &context, &light_space, &shadow_map, &mut renderer);

        // --- Display ---
        post_process_to_buffer(&renderer.framebuffer, &mut buffer);
        window
            .update_with_buffer(&buffer, SCREEN_WIDTH, SCREEN_HEIGHT)
            .unwrap();

        frame_count += 1;
        if last_fps_update.elapsed().as_secs_f32() >= 2.0 {
            info!(
                "Average FPS: {:.1}",
                frame_count as f32 / last_fps_update.elapsed().as_secs_f32()
            );
            frame_count = 0;
            last_fps_update = Instant::now();
        }
    }
}
