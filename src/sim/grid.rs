use crate::config::Tuning;
use crate::sim::rule::{self, CellState, MaskField};

/// Simulation- and display-grid dimensions for one viewport-size epoch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    pub sim_width: u32,
    pub sim_height: u32,
    pub disp_width: u32,
    pub disp_height: u32,
}

impl GridDims {
    /// Derive both grids from the viewport in device pixels.
    ///
    /// The display grid matches the pixel lattice (one cell per pitch); the
    /// simulation grid is resolution-independent, clamped in width so the
    /// per-step cost is bounded, with height following the viewport aspect.
    pub fn derive(width_px: u32, height_px: u32, tuning: &Tuning) -> Self {
        let width_px = width_px.max(1);
        let height_px = height_px.max(1);

        let disp_width = (width_px as f32 / tuning.pitch_px).ceil().max(1.0) as u32;
        let disp_height = (height_px as f32 / tuning.pitch_px).ceil().max(1.0) as u32;

        let sim_width = disp_width.clamp(tuning.sim_width_min, tuning.sim_width_max);
        let sim_height = (sim_width as f32 * height_px as f32 / width_px as f32)
            .round()
            .max(1.0) as u32;

        Self {
            sim_width,
            sim_height,
            disp_width,
            disp_height,
        }
    }

    pub fn cell_count(&self) -> usize {
        (self.sim_width * self.sim_height) as usize
    }

    /// Display-cell to simulation-cell scale factors
    pub fn sim_scale(&self) -> (f32, f32) {
        (
            self.sim_width as f32 / self.disp_width as f32,
            self.sim_height as f32 / self.disp_height as f32,
        )
    }
}

/// One-shot stochastic seed: each cell independently starts ACTIVATING with
/// `seed_prob`, drawn from the pure hash at step 0 so a given salt always
/// produces the same initial generation.
pub fn seed_cells(width: u32, height: u32, salt: u32, seed_prob: f32) -> Vec<u32> {
    let mut cells = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let draw = rule::cell_rand(x, y, 0, salt);
            let state = if draw < seed_prob {
                CellState::Activating
            } else {
                CellState::Dormant
            };
            cells.push(state as u32);
        }
    }
    cells
}

/// Per-step inputs shared by every cell evaluation
#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub step: u32,
    pub salt: u32,
    pub reseed_prob: f32,
    pub mask: MaskField,
    pub mask_threshold: f32,
    pub cursor: (f32, f32),
    pub hovering: bool,
    pub hover_radius_cells: f32,
}

/// CPU reference grid. The GPU pass in shaders/sim.wgsl is a transcription
/// of `step` below; tests exercise the rule here without a device.
pub struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<u32>,
    scratch: Vec<u32>,
}

impl CellGrid {
    pub fn seeded(width: u32, height: u32, salt: u32, seed_prob: f32) -> Self {
        let cells = seed_cells(width, height, salt, seed_prob);
        let scratch = vec![0u32; cells.len()];
        Self {
            width,
            height,
            cells,
            scratch,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> CellState {
        CellState::from_u32(self.cells[(y * self.width + x) as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, state: CellState) {
        self.cells[(y * self.width + x) as usize] = state as u32;
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells
            .iter()
            .filter(|&&c| CellState::from_u32(c) == state)
            .count()
    }

    fn activating_neighbors(&self, x: u32, y: u32) -> u8 {
        let w = self.width as i64;
        let h = self.height as i64;
        let mut count = 0u8;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (x as i64 + dx).rem_euclid(w) as u32;
                let ny = (y as i64 + dy).rem_euclid(h) as u32;
                if self.cells[(ny * self.width + nx) as usize] == CellState::Activating as u32 {
                    count += 1;
                }
            }
        }
        count
    }

    /// Advance one generation. Every cell reads only the previous generation
    /// (writes go to the scratch buffer, swapped in at the end), mirroring
    /// the ping-pong discipline of the GPU path.
    pub fn step(&mut self, params: &StepParams) {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = (y * self.width + x) as usize;
                let current = CellState::from_u32(self.cells[idx]);
                let neighbors = self.activating_neighbors(x, y);
                let fx = x as f32;
                let fy = y as f32;
                let mask_active = params.mask.active(fx, fy, params.mask_threshold);
                let hover = rule::hover_influence(
                    fx,
                    fy,
                    params.cursor,
                    params.hover_radius_cells,
                    params.hovering,
                );
                let draw = rule::cell_rand(x, y, params.step, params.salt);
                self.scratch[idx] =
                    rule::next_state(current, neighbors, mask_active, hover, draw, params.reseed_prob)
                        as u32;
            }
        }
        std::mem::swap(&mut self.cells, &mut self.scratch);
    }
}
