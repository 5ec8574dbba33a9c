use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::config::{self, Tuning, MAX_PIXEL_RATIO};
use crate::engine::Engine;

/// Host shell: owns the window and the engine handle, and translates window
/// events (resize, pointer, preference toggle) into engine calls.
pub struct App {
    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    reduced_motion: bool,
    fps_counter: FpsCounter,
}

impl App {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            window: None,
            engine: None,
            reduced_motion,
            fps_counter: FpsCounter::new(),
        }
    }

    fn update_title(&self, fps: Option<f64>) {
        let Some(window) = &self.window else { return };
        let mut title = String::from("Halftone Backdrop");
        if let Some(fps) = fps {
            title.push_str(&format!(" - {:.0} FPS", fps));
        }
        if self.reduced_motion {
            title.push_str(" - reduced motion");
        }
        if self.engine.as_ref().is_some_and(Engine::is_fallback) {
            title.push_str(" - static fallback");
        }
        window.set_title(&title);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Halftone Backdrop")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        // Honor device pixel ratio only up to the cap: beyond it the pitch
        // grows so the per-frame display cost stops scaling with density
        let sf = window.scale_factor();
        let mut tuning = Tuning::default();
        tuning.pitch_px = config::PITCH_PX * (sf / sf.min(MAX_PIXEL_RATIO)) as f32;

        log::info!("Installing procedural backdrop...");
        let engine = Engine::install(window.clone(), self.reduced_motion, tuning);
        if engine.is_fallback() {
            log::warn!("running with static fallback backdrop");
        }

        log::info!("Controls:");
        log::info!("  M: Toggle reduced-motion preference");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.engine = Some(engine);
        self.update_title(None);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        PhysicalKey::Code(KeyCode::KeyM) => {
                            self.reduced_motion = !self.reduced_motion;
                            if let Some(engine) = &mut self.engine {
                                engine.set_reduced_motion(self.reduced_motion);
                            }
                            self.update_title(None);
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::CursorEntered { .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.pointer_entered();
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.pointer_left();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.pointer_moved(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(engine) = &mut self.engine {
                    engine.frame();
                }
                if let Some(fps) = self.fps_counter.tick() {
                    self.update_title(Some(fps));
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Same teardown path as an abrupt shutdown
        if let Some(engine) = &mut self.engine {
            engine.dispose();
        }
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
