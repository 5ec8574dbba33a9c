mod app;
mod config;
mod engine;
mod gpu;
mod interaction;
mod sim;

use winit::event_loop::{ControlFlow, EventLoop};

use app::App;

fn main() {
    env_logger::init();

    // Stand-in for the host's reduced-motion media preference; also
    // toggleable at runtime with M
    let reduced_motion = std::env::var_os("BACKDROP_REDUCED_MOTION").is_some();

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(reduced_motion);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {err}");
    }
}
