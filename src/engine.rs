use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use winit::window::Window;

use crate::config::{
    Tuning, ALPHA_ACTIVATING, ALPHA_FADING, HOVER_OPACITY_LIFT, LATTICE_DRIFT_X, LATTICE_DRIFT_Y,
    MASK_BAND_SPEED,
};
use crate::gpu::{DisplayParams, DisplayPipeline, GpuContext, GridBuffers, SimParams, SimPipeline};
use crate::interaction::InteractionState;
use crate::sim::{grid, GridDims, MaskField, StepClock};

/// The GPU half of a live engine: context, the current epoch's buffers, and
/// both pipelines. Absent in fallback mode and after disposal.
struct ActiveEngine {
    gpu: GpuContext,
    buffers: GridBuffers,
    sim_pass: SimPipeline,
    display_pass: DisplayPipeline,
    clock: StepClock,
    mask: MaskField,
    lattice_phase: (f32, f32),
    salt: u32,
    dims: GridDims,
    viewport: (u32, u32),
    last_frame: Instant,
}

/// Owned handle to one installed backdrop. All mutable state lives here;
/// the host keeps the handle and calls `dispose` (or just drops it).
pub struct Engine {
    tuning: Tuning,
    interaction: InteractionState,
    active: Option<Box<ActiveEngine>>,
    fallback: bool,
    disposed: bool,
}

impl Engine {
    /// Probe for an accelerated context and install the engine on the
    /// window. On probe failure the engine comes up in fallback mode: a
    /// valid handle whose frame/resize/dispose are no-ops, with the
    /// fallback marker set so the host can present a static backdrop.
    pub fn install(window: Arc<Window>, reduced_motion: bool, tuning: Tuning) -> Self {
        let gpu = match pollster::block_on(GpuContext::new(window.clone())) {
            Ok(gpu) => gpu,
            Err(err) => {
                log::warn!("accelerated context unavailable, using static fallback: {err}");
                return Self::fallback(reduced_motion, tuning);
            }
        };

        let size = window.inner_size();
        let viewport = (size.width.max(1), size.height.max(1));
        let dims = GridDims::derive(viewport.0, viewport.1, &tuning);

        // Per-install salt; every per-step draw is a pure hash of
        // (cell, step, salt), so a fixed salt replays exactly
        let salt = rand::thread_rng().gen();

        let seed = grid::seed_cells(dims.sim_width, dims.sim_height, salt, tuning.seed_prob);
        let buffers = GridBuffers::new(&gpu.device, &gpu.queue, dims, &seed);
        let sim_pass = SimPipeline::new(&gpu.device);
        let display_pass = DisplayPipeline::new(&gpu.device, gpu.format());
        let clock = StepClock::new(
            tuning.sim_rate_for(reduced_motion),
            tuning.max_steps_per_frame,
            tuning.max_frame_dt,
        );

        log::info!(
            "backdrop installed: viewport {}x{} px, sim grid {}x{}, display grid {}x{}",
            viewport.0,
            viewport.1,
            dims.sim_width,
            dims.sim_height,
            dims.disp_width,
            dims.disp_height
        );

        Self {
            tuning,
            interaction: InteractionState::new(reduced_motion),
            active: Some(Box::new(ActiveEngine {
                gpu,
                buffers,
                sim_pass,
                display_pass,
                clock,
                mask: MaskField::new(salt),
                lattice_phase: (0.0, 0.0),
                salt,
                dims,
                viewport,
                last_frame: Instant::now(),
            })),
            fallback: false,
            disposed: false,
        }
    }

    /// A handle with no GPU half: every operation is a harmless no-op and
    /// `is_fallback` reports true
    pub fn fallback(reduced_motion: bool, tuning: Tuning) -> Self {
        Self {
            tuning,
            interaction: InteractionState::new(reduced_motion),
            active: None,
            fallback: true,
            disposed: false,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn reduced_motion(&self) -> bool {
        self.interaction.reduced_motion()
    }

    /// Advance and draw one display frame: bank elapsed wall-clock time,
    /// consume whole simulation steps (capped; remainder carries over), then
    /// draw the latest generation regardless of whether any step ran.
    pub fn frame(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(active.last_frame).as_secs_f32();
        active.last_frame = now;

        let reduced = self.interaction.reduced_motion();
        let motion = if reduced {
            self.tuning.reduced_rate_scale
        } else {
            1.0
        };

        let steps = active.clock.advance(dt);
        for _ in 0..steps {
            run_step(active, &self.interaction, &self.tuning, reduced);
        }

        // Lattice drift is display-time, independent of the step rate
        let dt_c = dt.clamp(0.0, self.tuning.max_frame_dt);
        let span_x = self.tuning.pitch_px * active.dims.disp_width as f32;
        let span_y = self.tuning.pitch_px * active.dims.disp_height as f32;
        active.lattice_phase.0 = (active.lattice_phase.0
            + dt_c * motion * LATTICE_DRIFT_X * self.tuning.pitch_px)
            .rem_euclid(span_x);
        active.lattice_phase.1 = (active.lattice_phase.1
            + dt_c * motion * LATTICE_DRIFT_Y * self.tuning.pitch_px)
            .rem_euclid(span_y);

        if !present(active, &self.interaction, &self.tuning) {
            // Allocation failure mid-run is treated like a failed probe:
            // drop the GPU half and latch the fallback marker
            log::error!("render target allocation failed, switching to static fallback");
            if let Some(active) = self.active.take() {
                active.buffers.destroy();
            }
            self.fallback = true;
        }
    }

    /// Begin a new viewport-size epoch. The previous buffer pair is torn
    /// down wholesale and a freshly seeded pair takes its place; grid
    /// dimensions never change in place. A resize observed in fallback mode
    /// or after disposal is a no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }

        active.gpu.resize(width, height);
        active.viewport = (width, height);

        let dims = GridDims::derive(width, height, &self.tuning);
        if dims != active.dims {
            let seed =
                grid::seed_cells(dims.sim_width, dims.sim_height, active.salt, self.tuning.seed_prob);
            let buffers = GridBuffers::new(&active.gpu.device, &active.gpu.queue, dims, &seed);
            let old = std::mem::replace(&mut active.buffers, buffers);
            old.destroy();
            active.dims = dims;
            log::info!(
                "viewport epoch {}x{} px: sim grid {}x{}",
                width,
                height,
                dims.sim_width,
                dims.sim_height
            );
        }
    }

    pub fn pointer_entered(&mut self) {
        self.interaction.pointer_entered();
    }

    pub fn pointer_left(&mut self) {
        self.interaction.pointer_left();
    }

    pub fn pointer_moved(&mut self, px: f32, py: f32) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        self.interaction
            .pointer_moved(px, py, active.viewport, active.dims, &self.tuning);
    }

    /// Retune reseed probability, drift speed, and step rate for the new
    /// preference. Takes effect on the next step; grid contents are kept.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if self.interaction.set_reduced_motion(reduced) {
            if let Some(active) = self.active.as_mut() {
                active.clock.set_rate(self.tuning.sim_rate_for(reduced));
            }
            log::info!(
                "reduced motion {}",
                if reduced { "enabled" } else { "disabled" }
            );
        }
    }

    /// Idempotent teardown: releases the buffer pair and the GPU context.
    /// Wired to both explicit host shutdown and `Drop`.
    pub fn dispose(&mut self) {
        if let Some(active) = self.active.take() {
            active.buffers.destroy();
            log::info!("backdrop engine disposed");
        }
        self.disposed = true;
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Consume one simulation step: advance the mask, write this step's
/// parameters, dispatch the automaton pass over the previous generation,
/// then swap the pair. One submit per step so each dispatch sees its own
/// uniform write.
fn run_step(active: &mut ActiveEngine, interaction: &InteractionState, tuning: &Tuning, reduced: bool) {
    let motion = if reduced { tuning.reduced_rate_scale } else { 1.0 };
    let step_dt = active.clock.step_dt();

    active.mask.offset.0 += tuning.mask_drift.0 * motion * step_dt;
    active.mask.offset.1 += tuning.mask_drift.1 * motion * step_dt;
    active.mask.band_phase =
        (active.mask.band_phase + MASK_BAND_SPEED * motion * step_dt).rem_euclid(TAU);

    let step = active.clock.next_step_index();
    let (cursor_x, cursor_y) = interaction.cursor_cell();

    let params = SimParams {
        sim_width: active.dims.sim_width,
        sim_height: active.dims.sim_height,
        step,
        seed: active.salt,
        reseed_prob: tuning.reseed_prob_for(reduced),
        hover: if interaction.hovering() { 1.0 } else { 0.0 },
        cursor_x,
        cursor_y,
        hover_radius: InteractionState::hover_radius_cells(active.dims, tuning),
        mask_offset_x: active.mask.offset.0,
        mask_offset_y: active.mask.offset.1,
        band_phase: active.mask.band_phase,
        mask_threshold: tuning.mask_threshold,
        _padding: [0.0; 3],
    };
    active.buffers.update_sim_params(&active.gpu.queue, &params);

    let (input, output) = active.buffers.io_buffers();
    let bind_group = active.sim_pass.create_bind_group(
        &active.gpu.device,
        input,
        output,
        &active.buffers.sim_params_buffer,
    );

    let mut encoder = active
        .gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("step-encoder"),
        });
    active
        .sim_pass
        .dispatch(&mut encoder, &bind_group, active.dims.sim_width, active.dims.sim_height);
    active.gpu.queue.submit(std::iter::once(encoder.finish()));

    active.buffers.swap();
}

/// Draw the latest generation to the surface. Returns false only on an
/// unrecoverable allocation failure; transient surface loss reconfigures
/// and skips the frame.
fn present(active: &mut ActiveEngine, interaction: &InteractionState, tuning: &Tuning) -> bool {
    let params = DisplayParams {
        sim_width: active.dims.sim_width,
        sim_height: active.dims.sim_height,
        disp_width: active.dims.disp_width,
        disp_height: active.dims.disp_height,
        pitch: tuning.pitch_px,
        opacity: if interaction.hovering() {
            HOVER_OPACITY_LIFT
        } else {
            1.0
        },
        alpha_activating: ALPHA_ACTIVATING,
        alpha_fading: ALPHA_FADING,
        phase_x: active.lattice_phase.0,
        phase_y: active.lattice_phase.1,
        viewport_w: active.viewport.0 as f32,
        viewport_h: active.viewport.1 as f32,
    };
    active.buffers.update_display_params(&active.gpu.queue, &params);

    let output = match active.gpu.surface.get_current_texture() {
        Ok(texture) => texture,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            active.gpu.surface.configure(&active.gpu.device, &active.gpu.config);
            return true;
        }
        Err(wgpu::SurfaceError::OutOfMemory) => {
            return false;
        }
        Err(err) => {
            log::error!("surface error: {err:?}");
            return true;
        }
    };

    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let bind_group = active.display_pass.create_bind_group(
        &active.gpu.device,
        active.buffers.readable_buffer(),
        &active.buffers.display_params_buffer,
    );

    let mut encoder = active
        .gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("display-encoder"),
        });
    active.display_pass.draw(&mut encoder, &view, &bind_group);
    active.gpu.queue.submit(std::iter::once(encoder.finish()));
    output.present();

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;

    #[test]
    fn test_fallback_dispose_is_idempotent_noop() {
        let mut engine = Engine::fallback(false, Tuning::default());
        assert!(engine.is_fallback());
        engine.dispose();
        engine.dispose();
        assert!(engine.is_disposed());
        assert!(engine.is_fallback());
    }

    #[test]
    fn test_fallback_operations_are_noops() {
        let mut engine = Engine::fallback(false, Tuning::default());
        engine.frame();
        engine.resize(1280, 800);
        engine.pointer_entered();
        engine.pointer_moved(100.0, 50.0);
        engine.pointer_left();
        engine.frame();
        assert!(engine.is_fallback());
    }

    #[test]
    fn test_resize_after_dispose_is_noop() {
        let mut engine = Engine::fallback(false, Tuning::default());
        engine.dispose();
        engine.resize(640, 480);
        engine.frame();
        assert!(engine.is_disposed());
    }

    #[test]
    fn test_reduced_motion_tracked_without_gpu() {
        let mut engine = Engine::fallback(false, Tuning::default());
        engine.set_reduced_motion(true);
        assert!(engine.reduced_motion());
        engine.set_reduced_motion(false);
        assert!(!engine.reduced_motion());
    }
}
