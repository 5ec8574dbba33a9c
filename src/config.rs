/// Size of one display cell in device pixels
pub const PITCH_PX: f32 = 9.0;

/// Simulation grid width bounds (cells); the grid is resolution-independent
/// and clamped so step cost stays flat across viewport sizes
pub const SIM_WIDTH_MIN: u32 = 360;
pub const SIM_WIDTH_MAX: u32 = 480;

/// Compute shader workgroup size
pub const WORKGROUP_SIZE: u32 = 16;

/// Target simulation rate (automaton steps per second)
pub const SIM_RATE_HZ: f32 = 45.0;

/// Rate multiplier while the reduced-motion preference is active
pub const REDUCED_RATE_SCALE: f32 = 0.3;

/// Hard cap on catch-up steps consumed within one display frame
pub const MAX_STEPS_PER_FRAME: u32 = 8;

/// Frame deltas are clamped to this before feeding the accumulator, so a
/// stalled frame or backgrounded window cannot demand unbounded catch-up
pub const MAX_FRAME_DT: f32 = 0.05;

/// Per-cell per-step stochastic reseed probability
pub const RESEED_PROB: f32 = 0.0008;
pub const RESEED_PROB_REDUCED: f32 = 0.0003;

/// Probability a cell starts ACTIVATING in the one-shot seeding pass
pub const SEED_PROB: f32 = 0.02;

/// Cursor influence radius in display pixels
pub const HOVER_RADIUS_PX: f32 = 220.0;

/// Reseed probability multiplier at the cursor center (falls off with distance)
pub const HOVER_RESEED_BOOST: f32 = 6.0;

/// Pattern alpha per cell state (DORMANT is invisible)
pub const ALPHA_ACTIVATING: f32 = 0.18;
pub const ALPHA_FADING: f32 = 0.08;

/// Global opacity lift while the pointer is inside the window
pub const HOVER_OPACITY_LIFT: f32 = 1.12;

/// Display lattice drift, in pitches per second
pub const LATTICE_DRIFT_X: f32 = 0.55;
pub const LATTICE_DRIFT_Y: f32 = 0.32;

// ============================================
// Procedural birth mask
// ============================================

/// Noise lattice scale (noise cells per sim cell)
pub const MASK_NOISE_SCALE: f32 = 0.035;

/// Sinusoidal band frequency across the sim grid (radians per cell)
pub const MASK_BAND_FREQ_X: f32 = 0.019;
pub const MASK_BAND_FREQ_Y: f32 = 0.011;

/// Blend weight of the band against the noise field
pub const MASK_BAND_BLEND: f32 = 0.4;

/// Cells with a mask value at or below this cannot birth
pub const MASK_THRESHOLD: f32 = 0.35;

/// Mask advection velocity in sim cells per second
pub const MASK_DRIFT_X: f32 = 0.55;
pub const MASK_DRIFT_Y: f32 = 0.32;

/// Band phase advance in radians per second
pub const MASK_BAND_SPEED: f32 = 0.35;

/// Parked cursor position when the pointer is absent or out of bounds,
/// far enough that no cell ever falls inside the influence radius
pub const CURSOR_FAR: (f32, f32) = (-9999.0, -9999.0);

/// Device pixel ratios above this are not honored (display cost cap)
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Tuning knobs the engine reads at runtime. Defaults mirror the constants
/// above; tests inject overrides instead of mutating globals.
#[derive(Clone, Copy, Debug)]
pub struct Tuning {
    pub pitch_px: f32,
    pub sim_width_min: u32,
    pub sim_width_max: u32,
    pub sim_rate_hz: f32,
    pub reduced_rate_scale: f32,
    pub max_steps_per_frame: u32,
    pub max_frame_dt: f32,
    pub reseed_prob: f32,
    pub reseed_prob_reduced: f32,
    pub seed_prob: f32,
    pub hover_radius_px: f32,
    pub mask_threshold: f32,
    pub mask_drift: (f32, f32),
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            pitch_px: PITCH_PX,
            sim_width_min: SIM_WIDTH_MIN,
            sim_width_max: SIM_WIDTH_MAX,
            sim_rate_hz: SIM_RATE_HZ,
            reduced_rate_scale: REDUCED_RATE_SCALE,
            max_steps_per_frame: MAX_STEPS_PER_FRAME,
            max_frame_dt: MAX_FRAME_DT,
            reseed_prob: RESEED_PROB,
            reseed_prob_reduced: RESEED_PROB_REDUCED,
            seed_prob: SEED_PROB,
            hover_radius_px: HOVER_RADIUS_PX,
            mask_threshold: MASK_THRESHOLD,
            mask_drift: (MASK_DRIFT_X, MASK_DRIFT_Y),
        }
    }
}

impl Tuning {
    /// Reseed probability for the current reduced-motion setting
    pub fn reseed_prob_for(&self, reduced_motion: bool) -> f32 {
        if reduced_motion {
            self.reseed_prob_reduced
        } else {
            self.reseed_prob
        }
    }

    /// Step rate for the current reduced-motion setting
    pub fn sim_rate_for(&self, reduced_motion: bool) -> f32 {
        if reduced_motion {
            self.sim_rate_hz * self.reduced_rate_scale
        } else {
            self.sim_rate_hz
        }
    }
}
