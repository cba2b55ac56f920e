//! Gravity system - pulls dynamic bodies toward celestial sources.
//!
//! ## Gather / Apply
//!
//! Forces are computed in a gather phase that only reads body data, then
//! applied sequentially. Each body's forces depend only on that body and the
//! source list, so the gather phase can run in parallel without changing
//! results.
//!
//! When compiled with `--features parallel`, the gather phase uses rayon.

use super::forces::{apply_scaled_force, ForceContext};
use crate::components::*;
use bevy_ecs::prelude::*;
use glam::DVec2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Floor on squared distance, avoiding the singularity at zero separation.
pub const MIN_DISTANCE_SQ: f64 = 1.0;

/// Downward field used when no celestial source is configured.
pub const FALLBACK_GRAVITY_SCALE: f64 = 0.001;
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Body data needed by the gather phase.
struct GravityTarget {
    entity: Entity,
    position: DVec2,
    mass: f64,
}

/// System that applies gravity from every source in range.
pub fn gravity_system(
    ctx: Res<ForceContext>,
    mut query: Query<(Entity, &Kinematics, &mut AppliedForce, &MassProperties, &BodyFlags)>,
) {
    let ctx: &ForceContext = &ctx;

    // GATHER PHASE
    let targets: Vec<GravityTarget> = query
        .iter()
        .filter(|(_, _, _, _, flags)| flags.is_dynamic())
        .map(|(entity, kinematics, _, mass, _)| GravityTarget {
            entity,
            position: kinematics.position,
            mass: mass.mass,
        })
        .collect();

    #[cfg(feature = "parallel")]
    let intents: Vec<(Entity, Vec<DVec2>)> = targets
        .par_iter()
        .map(|t| (t.entity, gravity_forces(ctx, t.position, t.mass)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let intents: Vec<(Entity, Vec<DVec2>)> = targets
        .iter()
        .map(|t| (t.entity, gravity_forces(ctx, t.position, t.mass)))
        .collect();

    // APPLY PHASE
    for (entity, forces) in intents {
        if let Ok((_, kinematics, mut applied, _, _)) = query.get_mut(entity) {
            for scaled in forces {
                apply_scaled_force(kinematics, &mut applied, kinematics.position, scaled);
            }
        }
    }
}

/// Scaled gravity forces on a body, one per contributing source.
///
/// With no sources configured, a uniform downward force stands in.
pub fn gravity_forces(ctx: &ForceContext, position: DVec2, mass: f64) -> Vec<DVec2> {
    if ctx.sources.is_empty() {
        let fallback = DVec2::new(0.0, mass * FALLBACK_GRAVITY_SCALE * STANDARD_GRAVITY);
        return vec![ctx.scale_gravity(fallback)];
    }

    let mut forces = Vec::new();
    for source in ctx.sources.sources() {
        let delta = source.position - position;
        let distance_sq = delta.length_squared();
        let distance = distance_sq.sqrt();
        if distance > source.gravity_radius || distance == 0.0 {
            continue;
        }
        let magnitude =
            ctx.gravitational_constant * source.mass * mass / distance_sq.max(MIN_DISTANCE_SQ);
        let direction = delta / distance;
        forces.push(ctx.scale_gravity(direction * magnitude));
    }
    forces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celestial::{CelestialRegistry, CelestialSource};

    fn context(sources: Vec<CelestialSource>) -> ForceContext {
        ForceContext {
            gravitational_constant: 0.5,
            timestep_ms: 1.0,
            sources: CelestialRegistry::new(sources),
        }
    }

    #[test]
    fn test_fallback_points_down() {
        let ctx = context(vec![]);
        let forces = gravity_forces(&ctx, DVec2::ZERO, 2.0);
        assert_eq!(forces.len(), 1);
        assert_eq!(forces[0].x, 0.0);
        assert!((forces[0].y - 2.0 * 0.001 * 9.81 / 1000.0).abs() < 1e-15);
    }

    #[test]
    fn test_inverse_square_toward_source() {
        let ctx = context(vec![CelestialSource::new("sun", 1000.0, DVec2::new(10.0, 0.0), 100.0)]);
        let forces = gravity_forces(&ctx, DVec2::ZERO, 2.0);
        // 0.5 * 1000 * 2 / 100 = 10, scaled by 1/1000
        assert!((forces[0].x - 0.01).abs() < 1e-15);
        assert_eq!(forces[0].y, 0.0);
    }

    #[test]
    fn test_radius_cutoff() {
        let ctx = context(vec![CelestialSource::new("far", 1000.0, DVec2::new(200.0, 0.0), 100.0)]);
        assert!(gravity_forces(&ctx, DVec2::ZERO, 1.0).is_empty());
    }

    #[test]
    fn test_distance_floor() {
        let ctx = context(vec![CelestialSource::new("near", 1.0, DVec2::new(0.5, 0.0), 10.0)]);
        let forces = gravity_forces(&ctx, DVec2::ZERO, 1.0);
        // Squared distance 0.25 is floored to 1.
        assert!((forces[0].x - 0.5 / 1000.0).abs() < 1e-15);

        let ctx = context(vec![CelestialSource::new("inside", 1.0, DVec2::ZERO, 10.0)]);
        assert!(gravity_forces(&ctx, DVec2::ZERO, 1.0).is_empty());
    }

    #[test]
    fn test_system_skips_static_and_sleeping() {
        let mut world = World::new();
        world.insert_resource(context(vec![CelestialSource::new(
            "sun",
            1000.0,
            DVec2::new(10.0, 0.0),
            100.0,
        )]));

        let spawn = |world: &mut World, flags: BodyFlags| {
            world
                .spawn((
                    Kinematics::at(DVec2::ZERO, 0.0),
                    AppliedForce::default(),
                    MassProperties::new(2.0, 1.0, 1.0, 1.0),
                    flags,
                ))
                .id()
        };
        let dynamic = spawn(&mut world, BodyFlags::default());
        let fixed = spawn(&mut world, BodyFlags { is_static: true, ..Default::default() });
        let asleep = spawn(&mut world, BodyFlags { is_sleeping: true, ..Default::default() });

        let mut schedule = Schedule::default();
        schedule.add_systems(gravity_system);
        schedule.run(&mut world);

        assert!(world.get::<AppliedForce>(dynamic).unwrap().force.x > 0.0);
        assert_eq!(world.get::<AppliedForce>(fixed).unwrap().force, DVec2::ZERO);
        assert_eq!(world.get::<AppliedForce>(asleep).unwrap().force, DVec2::ZERO);
    }
}
