use crate::config::{
    HOVER_RESEED_BOOST, MASK_BAND_BLEND, MASK_BAND_FREQ_X, MASK_BAND_FREQ_Y, MASK_NOISE_SCALE,
};

/// Per-cell automaton state. The numeric values are the storage-buffer
/// encoding shared with the WGSL passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum CellState {
    Dormant = 0,
    Activating = 1,
    Fading = 2,
}

impl CellState {
    pub fn from_u32(raw: u32) -> Self {
        match raw {
            1 => CellState::Activating,
            2 => CellState::Fading,
            _ => CellState::Dormant,
        }
    }
}

/// PCG hash for deterministic per-cell randomness
pub fn pcg_hash(input: u32) -> u32 {
    let state = input.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28).wrapping_add(4))) ^ state).wrapping_mul(277803737);
    (word >> 22) ^ word
}

/// Combined hash of (cell coordinates, step counter, install salt).
/// A pure function of its inputs: the same cell at the same step always
/// draws the same value, which is what makes the automaton reproducible.
pub fn cell_hash(x: u32, y: u32, step: u32, salt: u32) -> u32 {
    pcg_hash(x ^ pcg_hash(y ^ pcg_hash(step ^ salt)))
}

/// Uniform draw in [0, 1) from the cell hash
pub fn cell_rand(x: u32, y: u32, step: u32, salt: u32) -> f32 {
    (cell_hash(x, y, step, salt) >> 8) as f32 / 16_777_216.0
}

fn lattice_rand(ix: i32, iy: i32, salt: u32) -> f32 {
    let h = pcg_hash(ix as u32 ^ pcg_hash(iy as u32 ^ pcg_hash(salt ^ 0x9e37_79b9)));
    (h >> 8) as f32 / 16_777_216.0
}

fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Hash-lattice value noise in [0, 1), bilinear with smoothstep fade
pub fn value_noise(x: f32, y: f32, salt: u32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let ix = x0 as i32;
    let iy = y0 as i32;

    let n00 = lattice_rand(ix, iy, salt);
    let n10 = lattice_rand(ix + 1, iy, salt);
    let n01 = lattice_rand(ix, iy + 1, salt);
    let n11 = lattice_rand(ix + 1, iy + 1, salt);

    let sx = smooth(fx);
    let sy = smooth(fy);
    let a = n00 + (n10 - n00) * sx;
    let b = n01 + (n11 - n01) * sx;
    a + (b - a) * sy
}

/// Drifting birth mask: advected value noise blended with a sinusoidal band.
/// `offset` and `band_phase` advance each simulation step.
#[derive(Clone, Copy, Debug)]
pub struct MaskField {
    pub offset: (f32, f32),
    pub band_phase: f32,
    pub salt: u32,
}

impl MaskField {
    pub fn new(salt: u32) -> Self {
        Self {
            offset: (0.0, 0.0),
            band_phase: 0.0,
            salt,
        }
    }

    /// Mask value in [0, 1] at a simulation cell
    pub fn value(&self, cell_x: f32, cell_y: f32) -> f32 {
        let nx = cell_x * MASK_NOISE_SCALE + self.offset.0;
        let ny = cell_y * MASK_NOISE_SCALE + self.offset.1;
        let noise = value_noise(nx, ny, self.salt);
        let band = 0.5
            + 0.5
                * (cell_x * MASK_BAND_FREQ_X + cell_y * MASK_BAND_FREQ_Y + self.band_phase).sin();
        noise * (1.0 - MASK_BAND_BLEND) + band * MASK_BAND_BLEND
    }

    pub fn active(&self, cell_x: f32, cell_y: f32, threshold: f32) -> bool {
        self.value(cell_x, cell_y) > threshold
    }
}

/// Cursor influence at a simulation cell: 1 at the cursor, falling to 0 at
/// the influence radius. Zero whenever the pointer is absent; the parked
/// far-away sentinel also lands here through the distance check.
pub fn hover_influence(
    cell_x: f32,
    cell_y: f32,
    cursor: (f32, f32),
    radius_cells: f32,
    hovering: bool,
) -> f32 {
    if !hovering || radius_cells <= 0.0 {
        return 0.0;
    }
    let dx = cell_x - cursor.0;
    let dy = cell_y - cursor.1;
    let d = (dx * dx + dy * dy).sqrt();
    let t = (1.0 - d / radius_cells).clamp(0.0, 1.0);
    smooth(t)
}

/// One cell's transition, evaluated against the previous generation only.
///
/// ACTIVATING and FADING decay unconditionally; a DORMANT cell births on
/// exactly 2 activating neighbors (or exactly 1 anywhere inside the cursor's
/// influence radius), or by stochastic reseed, and only inside the mask's
/// active region either way.
pub fn next_state(
    current: CellState,
    activating_neighbors: u8,
    mask_active: bool,
    hover: f32,
    reseed_draw: f32,
    reseed_prob: f32,
) -> CellState {
    match current {
        CellState::Activating => CellState::Fading,
        CellState::Fading => CellState::Dormant,
        CellState::Dormant => {
            if !mask_active {
                return CellState::Dormant;
            }
            let birth =
                activating_neighbors == 2 || (hover > 0.0 && activating_neighbors == 1);
            if birth {
                return CellState::Activating;
            }
            let p = reseed_prob * (1.0 + HOVER_RESEED_BOOST * hover);
            if reseed_draw < p {
                CellState::Activating
            } else {
                CellState::Dormant
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_hash_is_pure() {
        for (x, y, step) in [(0, 0, 0), (17, 230, 4821), (479, 359, u32::MAX)] {
            assert_eq!(cell_hash(x, y, step, 7), cell_hash(x, y, step, 7));
            assert_eq!(cell_rand(x, y, step, 7), cell_rand(x, y, step, 7));
        }
    }

    #[test]
    fn test_cell_rand_range() {
        for step in 0..1000 {
            let r = cell_rand(123, 45, step, 99);
            assert!((0.0..1.0).contains(&r), "draw out of range: {}", r);
        }
    }

    #[test]
    fn test_draws_vary_across_steps() {
        // Not a statistical test, just that the step counter actually feeds
        // the hash.
        let a = cell_rand(10, 10, 1, 0);
        let b = cell_rand(10, 10, 2, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_terminal_decay_is_unconditional() {
        for neighbors in 0..=8u8 {
            for mask in [false, true] {
                assert_eq!(
                    next_state(CellState::Activating, neighbors, mask, 1.0, 0.0, 1.0),
                    CellState::Fading
                );
                assert_eq!(
                    next_state(CellState::Fading, neighbors, mask, 1.0, 0.0, 1.0),
                    CellState::Dormant
                );
            }
        }
    }

    #[test]
    fn test_birth_on_exactly_two_neighbors() {
        for neighbors in 0..=8u8 {
            let next = next_state(CellState::Dormant, neighbors, true, 0.0, 0.9, 0.0008);
            if neighbors == 2 {
                assert_eq!(next, CellState::Activating);
            } else {
                assert_eq!(next, CellState::Dormant);
            }
        }
    }

    #[test]
    fn test_mask_gates_all_births() {
        // Outside the mask nothing births: not neighbor-driven, not hover-
        // driven, not even a guaranteed reseed draw.
        assert_eq!(
            next_state(CellState::Dormant, 2, false, 1.0, 0.0, 1.0),
            CellState::Dormant
        );
    }

    #[test]
    fn test_hover_relaxes_birth_to_one_neighbor() {
        // Any non-zero influence relaxes the birth rule to 1 neighbor
        for influence in [1.0, 0.5, 0.2, 0.01] {
            let next = next_state(CellState::Dormant, 1, true, influence, 0.9, 0.0008);
            assert_eq!(next, CellState::Activating, "influence {}", influence);
        }
        // No influence keeps the 2-neighbor requirement
        let out = next_state(CellState::Dormant, 1, true, 0.0, 0.9, 0.0008);
        assert_eq!(out, CellState::Dormant);
    }

    #[test]
    fn test_one_neighbor_birth_covers_full_influence_radius() {
        // A cell in the outer half of the radius still sees a non-zero
        // influence, which must be enough to relax the birth rule
        let cursor = (100.0, 100.0);
        let radius = 24.0;
        let hover = hover_influence(100.0 + radius * 0.7, 100.0, cursor, radius, true);
        assert!(hover > 0.0 && hover < 0.5, "falloff value {}", hover);
        assert_eq!(
            next_state(CellState::Dormant, 1, true, hover, 0.9, 0.0008),
            CellState::Activating
        );
        // Just outside the radius the relaxation no longer applies
        let outside = hover_influence(100.0 + radius * 1.01, 100.0, cursor, radius, true);
        assert_eq!(outside, 0.0);
        assert_eq!(
            next_state(CellState::Dormant, 1, true, outside, 0.9, 0.0008),
            CellState::Dormant
        );
    }

    #[test]
    fn test_reseed_threshold() {
        let p = 0.0008;
        assert_eq!(
            next_state(CellState::Dormant, 0, true, 0.0, p * 0.5, p),
            CellState::Activating
        );
        assert_eq!(
            next_state(CellState::Dormant, 0, true, 0.0, p * 2.0, p),
            CellState::Dormant
        );
    }

    #[test]
    fn test_hover_boosts_reseed() {
        let p = 0.0008;
        let draw = p * 3.0; // above baseline, below boosted
        assert_eq!(
            next_state(CellState::Dormant, 0, true, 0.0, draw, p),
            CellState::Dormant
        );
        assert_eq!(
            next_state(CellState::Dormant, 0, true, 1.0, draw, p),
            CellState::Activating
        );
    }

    #[test]
    fn test_value_noise_range_and_continuity() {
        let salt = 42;
        for i in 0..200 {
            let x = i as f32 * 0.173;
            let y = i as f32 * 0.091;
            let v = value_noise(x, y, salt);
            assert!((0.0..1.0).contains(&v));
            // Small input change, small output change
            let v2 = value_noise(x + 1e-3, y, salt);
            assert!((v - v2).abs() < 0.05);
        }
    }

    #[test]
    fn test_hover_influence_falloff() {
        let cursor = (100.0, 100.0);
        assert_eq!(hover_influence(100.0, 100.0, cursor, 24.0, true), 1.0);
        assert_eq!(hover_influence(200.0, 100.0, cursor, 24.0, true), 0.0);
        assert_eq!(hover_influence(100.0, 100.0, cursor, 24.0, false), 0.0);
        let mid = hover_influence(112.0, 100.0, cursor, 24.0, true);
        assert!(mid > 0.0 && mid < 1.0);
        // Parked sentinel never influences anything
        let parked = hover_influence(0.0, 0.0, crate::config::CURSOR_FAR, 24.0, true);
        assert_eq!(parked, 0.0);
    }

    #[test]
    fn test_mask_drift_changes_field() {
        let salt = 7;
        let still = MaskField::new(salt);
        let mut drifted = MaskField::new(salt);
        drifted.offset = (3.7, 1.9);
        let mut moved = 0;
        for i in 0..64 {
            let x = (i % 8) as f32 * 13.0;
            let y = (i / 8) as f32 * 13.0;
            if (still.value(x, y) - drifted.value(x, y)).abs() > 1e-3 {
                moved += 1;
            }
        }
        assert!(moved > 0, "advection should move the field");
    }

    #[test]
    fn test_state_encoding_roundtrip() {
        for state in [CellState::Dormant, CellState::Activating, CellState::Fading] {
            assert_eq!(CellState::from_u32(state as u32), state);
        }
        // Unknown encodings degrade to DORMANT rather than panicking
        assert_eq!(CellState::from_u32(97), CellState::Dormant);
    }
}
