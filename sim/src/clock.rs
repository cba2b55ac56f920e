//! Fixed-timestep accumulator.
//!
//! Converts variable caller deltas into a whole number of constant-size
//! sub-steps. The clock only counts; the engine runs the sub-steps.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    fixed_timestep_ms: f64,
    accumulator_ms: f64,
    tick: u64,
}

impl SimulationClock {
    pub fn new(fixed_timestep_ms: f64) -> Self {
        Self {
            fixed_timestep_ms,
            accumulator_ms: 0.0,
            tick: 0,
        }
    }

    /// Restore a clock from serialized values.
    pub fn restore(fixed_timestep_ms: f64, accumulator_ms: f64, tick: u64) -> Self {
        Self {
            fixed_timestep_ms,
            accumulator_ms,
            tick,
        }
    }

    pub fn fixed_timestep_ms(&self) -> f64 {
        self.fixed_timestep_ms
    }

    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Add caller time. Negative or non-finite deltas are ignored.
    pub fn accumulate(&mut self, delta_ms: f64) -> bool {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            warn!(delta_ms, "ignoring invalid step delta");
            return false;
        }
        self.accumulator_ms += delta_ms;
        true
    }

    /// Take one timestep out of the accumulator if enough time is banked.
    pub fn consume_sub_step(&mut self) -> bool {
        if self.accumulator_ms >= self.fixed_timestep_ms {
            self.accumulator_ms -= self.fixed_timestep_ms;
            true
        } else {
            false
        }
    }

    /// Record that a sub-step has run.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FIXED_TIMESTEP_MS)
    }
}
