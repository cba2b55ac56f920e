//! Force application shared by every force source.
//!
//! Physical forces are converted into the per-step domain the integrator
//! expects before they are accumulated. Gravity and the other forces use
//! different conversions; both end in [`apply_scaled_force`].

use crate::celestial::CelestialRegistry;
use crate::components::*;
use bevy_ecs::prelude::*;
use glam::DVec2;

/// Ceiling on the magnitude of a single scaled force application.
pub const MAX_SCALED_FORCE: f64 = 50.0;

/// Per-sub-step inputs to the force systems.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ForceContext {
    pub gravitational_constant: f64,
    pub timestep_ms: f64,
    pub sources: CelestialRegistry,
}

impl ForceContext {
    /// Convert a true gravitational force to the integrator's domain.
    #[inline]
    pub fn scale_gravity(&self, force: DVec2) -> DVec2 {
        force / (self.timestep_ms * 1000.0)
    }

    /// Convert any other true force to the integrator's domain.
    #[inline]
    pub fn scale_force(&self, force: DVec2) -> DVec2 {
        force / self.timestep_ms
    }
}

/// Clamp a scaled force and accumulate it at a world point.
pub fn apply_scaled_force(
    kinematics: &Kinematics,
    applied: &mut AppliedForce,
    point: DVec2,
    scaled: DVec2,
) {
    let magnitude = scaled.length();
    let scaled = if magnitude > MAX_SCALED_FORCE {
        scaled * (MAX_SCALED_FORCE / magnitude)
    } else {
        scaled
    };
    applied.force += scaled;
    let offset = point - kinematics.position;
    applied.torque += offset.perp_dot(scaled);
}
