//! Fixed-timestep clock fed by an external refresh callback.
//!
//! The host (display refresh, replay driver, test) hands in the wall-clock delta
//! of each rendered frame. The accumulator converts it into whole simulation
//! steps of `fixed_dt_us`, so gameplay advances identically whatever the
//! display rate. All bookkeeping is integer microseconds.

/// One simulation step at 60 Hz.
pub const FIXED_DT_US: u64 = 16_667;

pub struct TimeState {
    pub fixed_dt_us: u64,
    pub max_frame_us: u64,
    accumulator_us: u64,
    pub total_us: u64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt_us: u64,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_step(FIXED_DT_US)
    }

    pub fn with_step(fixed_dt_us: u64) -> Self {
        Self {
            fixed_dt_us: fixed_dt_us.max(1),
            max_frame_us: 250_000,
            accumulator_us: 0,
            total_us: 0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt_us: 0,
            interpolation_alpha: 0.0,
        }
    }

    pub fn begin_frame(&mut self, real_dt_us: u64) {
        self.real_dt_us = real_dt_us;

        // Spiral-of-death cap
        if self.real_dt_us > self.max_frame_us {
            log::warn!(
                "Frame took {:.1}ms -- capping accumulator to {}ms",
                self.real_dt_us as f64 / 1000.0,
                self.max_frame_us / 1000
            );
            self.real_dt_us = self.max_frame_us;
        }

        self.accumulator_us += self.real_dt_us;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator_us >= self.fixed_dt_us {
            self.accumulator_us -= self.fixed_dt_us;
            self.total_us += self.fixed_dt_us;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator_us as f64 / self.fixed_dt_us as f64;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
