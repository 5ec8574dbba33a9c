/// Fixed-timestep accumulator decoupling the automaton rate from the display
/// refresh rate. Elapsed wall-clock time is banked and consumed in whole
/// steps; at most `max_steps` per frame, with the remainder carried over so
/// no time is ever discarded.
pub struct StepClock {
    step_dt: f32,
    accumulator: f32,
    step_counter: u32,
    max_steps: u32,
    max_frame_dt: f32,
}

impl StepClock {
    pub fn new(rate_hz: f32, max_steps: u32, max_frame_dt: f32) -> Self {
        Self {
            step_dt: 1.0 / rate_hz,
            accumulator: 0.0,
            step_counter: 0,
            max_steps,
            max_frame_dt,
        }
    }

    /// Retune the step rate in place. Banked time and the step counter are
    /// preserved, so a reduced-motion flip takes effect on the next step
    /// without restarting the simulation.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.step_dt = 1.0 / rate_hz;
    }

    pub fn step_dt(&self) -> f32 {
        self.step_dt
    }

    /// Bank a frame's elapsed time and return how many steps to consume now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, self.max_frame_dt);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= self.step_dt && steps < self.max_steps {
            self.accumulator -= self.step_dt;
            steps += 1;
        }
        steps
    }

    /// Monotonic step index, used as the per-step hash seed
    pub fn next_step_index(&mut self) -> u32 {
        self.step_counter = self.step_counter.wrapping_add(1);
        self.step_counter
    }

    pub fn step_counter(&self) -> u32 {
        self.step_counter
    }

    #[cfg(test)]
    fn banked(&self) -> f32 {
        self.accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumes_whole_steps() {
        let mut clock = StepClock::new(45.0, 8, 0.05);
        // One 60 Hz frame banks less than one 45 Hz step
        assert_eq!(clock.advance(1.0 / 60.0), 0);
        // The second frame crosses the step boundary
        assert_eq!(clock.advance(1.0 / 60.0), 1);
    }

    #[test]
    fn test_catch_up_is_capped_and_remainder_carries() {
        let mut clock = StepClock::new(1000.0, 8, 0.05);
        // 20 ms at 1 kHz is 20 steps' worth; only 8 run, 12 ms stays banked
        assert_eq!(clock.advance(0.020), 8);
        assert!((clock.banked() - 0.012).abs() < 1e-6);
        // The carried time is consumed on the next frame
        assert_eq!(clock.advance(0.0), 8);
        assert_eq!(clock.advance(0.0), 4);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut clock = StepClock::new(45.0, 8, 0.05);
        // A 10-second stall banks at most 50 ms (2 steps at 45 Hz)
        assert_eq!(clock.advance(10.0), 2);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_negative_delta_is_ignored() {
        let mut clock = StepClock::new(45.0, 8, 0.05);
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.banked(), 0.0);
    }

    #[test]
    fn test_rate_retune_keeps_banked_time_and_counter() {
        let mut clock = StepClock::new(45.0, 8, 0.05);
        clock.advance(0.015);
        clock.next_step_index();
        let banked = clock.banked();
        let counter = clock.step_counter();

        clock.set_rate(45.0 * 0.3);
        assert_eq!(clock.banked(), banked);
        assert_eq!(clock.step_counter(), counter);
        assert!((clock.step_dt() - 1.0 / 13.5).abs() < 1e-6);
    }

    #[test]
    fn test_step_index_is_monotonic() {
        let mut clock = StepClock::new(45.0, 8, 0.05);
        let a = clock.next_step_index();
        let b = clock.next_step_index();
        let c = clock.next_step_index();
        assert!(a < b && b < c);
    }
}
