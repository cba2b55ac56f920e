//! Engine configuration.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default fixed sub-step size in milliseconds (~60 Hz).
pub const DEFAULT_FIXED_TIMESTEP_MS: f64 = 16.67;

/// Default gravitational constant in simulation units.
pub const DEFAULT_GRAVITATIONAL_CONSTANT: f64 = 0.001;

/// Configuration for a `PhysicsEngine` instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed sub-step size in milliseconds.
    pub fixed_timestep_ms: f64,
    /// Gravitational constant `G`.
    pub gravitational_constant: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_timestep_ms: DEFAULT_FIXED_TIMESTEP_MS,
            gravitational_constant: DEFAULT_GRAVITATIONAL_CONSTANT,
        }
    }
}

impl EngineConfig {
    pub fn new(fixed_timestep_ms: f64, gravitational_constant: f64) -> Self {
        Self {
            fixed_timestep_ms,
            gravitational_constant,
        }
    }

    /// Replace values the clock cannot run with.
    ///
    /// A non-positive timestep would make the accumulator loop forever, so it
    /// falls back to the default instead.
    pub fn sanitized(self) -> Self {
        let mut config = self;
        if !(config.fixed_timestep_ms.is_finite() && config.fixed_timestep_ms > 0.0) {
            warn!(
                timestep = config.fixed_timestep_ms,
                "invalid fixed timestep, using default"
            );
            config.fixed_timestep_ms = DEFAULT_FIXED_TIMESTEP_MS;
        }
        if !config.gravitational_constant.is_finite() {
            warn!("non-finite gravitational constant, using default");
            config.gravitational_constant = DEFAULT_GRAVITATIONAL_CONSTANT;
        }
        config
    }
}
