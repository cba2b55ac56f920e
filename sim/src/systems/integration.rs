//! Integration system - advances bodies by one step.
//!
//! Velocities are stored per step. When the step size changes between
//! calls, the stored velocity is rescaled by the ratio of the new to the old
//! step so that speeds stay consistent.

use crate::components::*;
use bevy_ecs::prelude::*;

/// Step size air friction coefficients are calibrated against (60 Hz).
pub const BASE_DELTA_MS: f64 = 1000.0 / 60.0;

/// Resource containing the step size in milliseconds.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StepDelta(pub f64);

/// System that integrates dynamic bodies and clears every body's forces.
pub fn integration_system(
    delta: Res<StepDelta>,
    mut query: Query<(
        &mut Kinematics,
        &mut AppliedForce,
        &MassProperties,
        &Material,
        &BodyFlags,
    )>,
) {
    let delta_ms = delta.0;
    for (mut kinematics, mut applied, mass, material, flags) in query.iter_mut() {
        if flags.is_dynamic() {
            integrate(&mut kinematics, &applied, mass, material, delta_ms);
        }
        applied.clear();
    }
}

/// Advance one body by `delta_ms`.
pub fn integrate(
    kinematics: &mut Kinematics,
    applied: &AppliedForce,
    mass: &MassProperties,
    material: &Material,
    delta_ms: f64,
) {
    let delta_sq = delta_ms * delta_ms;
    let friction_air = 1.0 - material.friction_air * delta_ms / BASE_DELTA_MS;
    let correction = if kinematics.last_delta_ms > 0.0 {
        delta_ms / kinematics.last_delta_ms
    } else {
        1.0
    };

    let acceleration = if mass.mass > 0.0 {
        applied.force / mass.mass
    } else {
        glam::DVec2::ZERO
    };
    kinematics.velocity = kinematics.velocity * correction * friction_air + acceleration * delta_sq;

    let angular_acceleration = if mass.inertia > 0.0 {
        applied.torque / mass.inertia
    } else {
        0.0
    };
    kinematics.angular_velocity =
        kinematics.angular_velocity * correction * friction_air + angular_acceleration * delta_sq;

    kinematics.position += kinematics.velocity;
    kinematics.angle += kinematics.angular_velocity;
    kinematics.last_delta_ms = delta_ms;
}
