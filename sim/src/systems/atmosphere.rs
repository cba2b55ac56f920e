//! Atmosphere system - drag and re-entry heating.
//!
//! Only the first atmosphere-bearing source is consulted. Heating is
//! informational: it is written to `AeroProfile::current_heat_flux` and never
//! feeds back into motion.

use super::forces::{apply_scaled_force, ForceContext};
use crate::components::*;
use bevy_ecs::prelude::*;
use glam::DVec2;

/// Drag area used when a body does not specify one.
pub const DEFAULT_DRAG_COEFFICIENT_AREA: f64 = 0.5;

/// Empirical constant of the stagnation-point heating correlation.
pub const HEATING_COEFFICIENT: f64 = 1.83e-4;

/// Speeds at or below this are treated as rest.
const REST_SPEED: f64 = 1e-12;

/// System that applies drag and refreshes heat flux for every body.
pub fn atmosphere_system(
    ctx: Res<ForceContext>,
    mut query: Query<(&Kinematics, &mut AppliedForce, &BodyFlags, &mut AeroProfile)>,
) {
    for (kinematics, mut applied, flags, mut aero) in query.iter_mut() {
        let air = if flags.is_dynamic() {
            ctx.sources.sample_air(kinematics.position)
        } else {
            None
        };

        let Some(air) = air else {
            aero.current_heat_flux = 0.0;
            continue;
        };

        aero.current_heat_flux =
            heat_flux(air.density, aero.effective_nose_radius, kinematics.speed());

        let drag = drag_force(air.density, kinematics.velocity, aero.drag_coefficient_area);
        if let Some(drag) = drag {
            let scaled = ctx.scale_force(drag);
            apply_scaled_force(kinematics, &mut applied, kinematics.position, scaled);
        }
    }
}

/// True drag force opposing `velocity`, or `None` at rest.
pub fn drag_force(
    density: f64,
    velocity: DVec2,
    drag_coefficient_area: Option<f64>,
) -> Option<DVec2> {
    let speed = velocity.length();
    if speed <= REST_SPEED {
        return None;
    }
    let area = drag_coefficient_area.unwrap_or(DEFAULT_DRAG_COEFFICIENT_AREA);
    let magnitude = 0.5 * density * velocity.length_squared() * area;
    let direction = -(velocity / speed);
    Some(direction * magnitude)
}

/// Heat flux for a body, zero without a positive nose radius or at rest.
pub fn heat_flux(density: f64, effective_nose_radius: Option<f64>, speed: f64) -> f64 {
    match effective_nose_radius {
        Some(nose_radius) if nose_radius > 0.0 && speed > REST_SPEED => {
            HEATING_COEFFICIENT * (density / nose_radius).sqrt() * speed * speed * speed
        }
        _ => 0.0,
    }
}
