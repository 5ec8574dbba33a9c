use crate::config::{Tuning, CURSOR_FAR};
use crate::sim::GridDims;

/// Shared parameters written by the host's pointer and preference events and
/// read by the simulation at its next step. Single-threaded: last write
/// before the step is what the step sees.
pub struct InteractionState {
    hovering: bool,
    cursor_cell: (f32, f32),
    reduced_motion: bool,
}

impl InteractionState {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            hovering: false,
            cursor_cell: CURSOR_FAR,
            reduced_motion,
        }
    }

    pub fn hovering(&self) -> bool {
        self.hovering
    }

    pub fn cursor_cell(&self) -> (f32, f32) {
        self.cursor_cell
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn pointer_entered(&mut self) {
        self.hovering = true;
    }

    pub fn pointer_left(&mut self) {
        self.hovering = false;
        self.cursor_cell = CURSOR_FAR;
    }

    /// Record a pointer position in device pixels, converted to simulation-
    /// cell coordinates. Out-of-bounds positions park the cursor far away so
    /// no cell is spuriously influenced.
    pub fn pointer_moved(
        &mut self,
        px: f32,
        py: f32,
        viewport_px: (u32, u32),
        dims: GridDims,
        tuning: &Tuning,
    ) {
        if px < 0.0 || py < 0.0 || px > viewport_px.0 as f32 || py > viewport_px.1 as f32 {
            self.cursor_cell = CURSOR_FAR;
            return;
        }
        let (sx, sy) = dims.sim_scale();
        self.cursor_cell = (px / tuning.pitch_px * sx, py / tuning.pitch_px * sy);
    }

    /// Flip the reduced-motion preference; returns whether it changed so the
    /// caller can retune the step clock
    pub fn set_reduced_motion(&mut self, reduced: bool) -> bool {
        let changed = self.reduced_motion != reduced;
        self.reduced_motion = reduced;
        changed
    }

    /// Cursor influence radius in simulation cells for the current epoch
    pub fn hover_radius_cells(dims: GridDims, tuning: &Tuning) -> f32 {
        let (sx, _) = dims.sim_scale();
        tuning.hover_radius_px / tuning.pitch_px * sx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch_dims() -> GridDims {
        GridDims {
            sim_width: 360,
            sim_height: 225,
            disp_width: 142,
            disp_height: 89,
        }
    }

    #[test]
    fn test_pointer_to_sim_cell_mapping() {
        let tuning = Tuning::default();
        let mut state = InteractionState::new(false);
        state.pointer_entered();
        state.pointer_moved(100.0, 50.0, (1280, 800), epoch_dims(), &tuning);
        let (cx, cy) = state.cursor_cell();
        assert!((cx - 28.2).abs() < 0.1, "cursor x {}", cx);
        assert!((cy - 14.0).abs() < 0.1, "cursor y {}", cy);
    }

    #[test]
    fn test_out_of_bounds_parks_cursor() {
        let tuning = Tuning::default();
        let mut state = InteractionState::new(false);
        state.pointer_entered();
        state.pointer_moved(100.0, 50.0, (1280, 800), epoch_dims(), &tuning);
        state.pointer_moved(-5.0, 50.0, (1280, 800), epoch_dims(), &tuning);
        assert_eq!(state.cursor_cell(), CURSOR_FAR);
        state.pointer_moved(100.0, 900.0, (1280, 800), epoch_dims(), &tuning);
        assert_eq!(state.cursor_cell(), CURSOR_FAR);
    }

    #[test]
    fn test_pointer_leave_clears_hover_and_parks() {
        let tuning = Tuning::default();
        let mut state = InteractionState::new(false);
        state.pointer_entered();
        assert!(state.hovering());
        state.pointer_moved(640.0, 400.0, (1280, 800), epoch_dims(), &tuning);
        state.pointer_left();
        assert!(!state.hovering());
        assert_eq!(state.cursor_cell(), CURSOR_FAR);
    }

    #[test]
    fn test_reduced_motion_change_detection() {
        let mut state = InteractionState::new(false);
        assert!(state.set_reduced_motion(true));
        assert!(state.reduced_motion());
        assert!(!state.set_reduced_motion(true));
        assert!(state.set_reduced_motion(false));
    }

    #[test]
    fn test_hover_radius_in_cells() {
        let tuning = Tuning::default();
        let r = InteractionState::hover_radius_cells(epoch_dims(), &tuning);
        // 220 px / 9 px-per-cell * (360/142) ≈ 62 sim cells
        assert!((r - 61.97).abs() < 0.5, "radius {}", r);
    }
}
