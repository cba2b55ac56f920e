//! Serialization value tree.
//!
//! `EngineState` is the wire format of the whole engine. Each body is
//! copied out of the ECS world into a `BodyState`; nothing aliases the live
//! world. Optional values are written as explicit `null`.

use crate::celestial::CelestialSource;
use crate::components::*;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Version written into every state. States with another version are
/// rejected on load.
pub const STATE_FORMAT_VERSION: u32 = 1;

/// Full state of one body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub id: u32,
    pub label: String,
    /// Shape data used to rebuild the body. Bodies without it are dropped
    /// on load.
    pub creation: Option<CreationDescriptor>,
    pub kinematics: Kinematics,
    pub force: AppliedForce,
    pub mass: MassProperties,
    pub material: Material,
    pub flags: BodyFlags,
    pub collision_filter: CollisionFilter,
    pub render: RenderDescriptor,
    pub aero: AeroProfile,
}

/// Complete engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub format_version: u32,
    /// Sub-steps executed so far.
    pub tick: u64,
    pub fixed_timestep_ms: f64,
    /// Time banked by `fixed_step` but not yet consumed.
    pub accumulator_ms: f64,
    pub gravitational_constant: f64,
    /// Id the factory hands out next.
    pub next_body_id: u32,
    pub celestial_sources: Vec<CelestialSource>,
    /// Bodies in ascending id order.
    pub bodies: Vec<BodyState>,
}

impl BodyState {
    /// Copy one body out of the ECS world.
    pub fn from_entity(world: &World, entity: Entity) -> Option<BodyState> {
        Some(BodyState {
            id: world.get::<BodyId>(entity)?.0,
            label: world.get::<BodyLabel>(entity)?.0.clone(),
            creation: world.get::<CreationDescriptor>(entity).cloned(),
            kinematics: *world.get::<Kinematics>(entity)?,
            force: *world.get::<AppliedForce>(entity)?,
            mass: *world.get::<MassProperties>(entity)?,
            material: *world.get::<Material>(entity)?,
            flags: *world.get::<BodyFlags>(entity)?,
            collision_filter: *world.get::<CollisionFilter>(entity)?,
            render: world.get::<RenderDescriptor>(entity)?.clone(),
            aero: *world.get::<AeroProfile>(entity)?,
        })
    }
}

impl EngineState {
    /// Look up a body by label.
    pub fn body(&self, label: &str) -> Option<&BodyState> {
        self.bodies.iter().find(|b| b.label == label)
    }
}
