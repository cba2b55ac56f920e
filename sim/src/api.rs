//! Public API for the physics core.
//!
//! `PhysicsEngine` is the single entry point a driver talks to: it owns the
//! celestial sources, the body factory, the clock and (usually) the backend
//! world.
//!
//! ## Fixed Timestep
//!
//! `fixed_step(delta_ms)` banks caller time and runs one sub-step per whole
//! timestep banked. `update(delta_seconds)` runs exactly one sub-step of the
//! given size. Every sub-step applies forces, integrates, then increments the
//! tick, so the same inputs always produce the same trajectory.
//!
//! ## Shared Backends
//!
//! The backend world may be shared between engines through
//! [`PhysicsEngine::with_shared_backend`]. Only the owning engine clears the
//! world; other engines only remove the bodies they created.

use crate::backend::{RigidBodyWorld, SharedBackend};
use crate::celestial::{CelestialRegistry, CelestialSource};
use crate::clock::SimulationClock;
use crate::components::*;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{EngineEvent, EventLog};
use crate::factory::{BodyFactory, BodyOptions};
use crate::geometry;
use crate::render::{RenderOptions, RenderOverride};
use crate::systems::serialization::{
    state_from_json, state_from_json_string, state_to_json, state_to_json_pretty,
    state_to_json_string,
};
use crate::systems::{apply_scaled_force, atmosphere_system, gravity_system, ForceContext};
use crate::world::{BodyState, EngineState, STATE_FORMAT_VERSION};
use bevy_ecs::prelude::*;
use glam::DVec2;
use tracing::{debug, warn};

pub struct PhysicsEngine {
    backend: SharedBackend,
    owns_backend: bool,
    forces: Schedule,
    config: EngineConfig,
    clock: SimulationClock,
    registry: CelestialRegistry,
    factory: BodyFactory,
    events: EventLog,
}

impl PhysicsEngine {
    /// Create an engine with its own backend world.
    pub fn new(fixed_timestep_ms: f64, gravitational_constant: f64) -> Self {
        Self::with_config(EngineConfig::new(fixed_timestep_ms, gravitational_constant))
    }

    /// Create an engine with its own backend world from a full config.
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_shared_backend(config, RigidBodyWorld::shared(), true)
    }

    /// Create an engine on an externally supplied backend world.
    ///
    /// When `owns_backend` is false this engine never clears the world.
    pub fn with_shared_backend(
        config: EngineConfig,
        backend: SharedBackend,
        owns_backend: bool,
    ) -> Self {
        let config = config.sanitized();

        let mut forces = Schedule::default();
        forces.add_systems((gravity_system, atmosphere_system).chain());

        Self {
            backend,
            owns_backend,
            forces,
            config,
            clock: SimulationClock::new(config.fixed_timestep_ms),
            registry: CelestialRegistry::default(),
            factory: BodyFactory::new(),
            events: EventLog::new(),
        }
    }

    /// Handle to the backend world, for sharing with another engine.
    pub fn backend(&self) -> SharedBackend {
        SharedBackend::clone(&self.backend)
    }

    /// Whether this engine clears the backend world on load and drop.
    pub fn owns_backend(&self) -> bool {
        self.owns_backend
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    /// Replace the celestial source list. May be called again mid-run.
    pub fn init(&mut self, sources: Vec<CelestialSource>) {
        debug!(sources = sources.len(), "celestial sources replaced");
        self.registry.replace(sources);
    }

    /// Create a rectangle centred on `(x, y)`.
    pub fn create_box(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        options: &BodyOptions,
    ) -> Entity {
        let mut backend = self.backend.borrow_mut();
        let position = DVec2::new(x, y);
        self.factory
            .create_box(&mut backend, &mut self.events, position, width, height, options)
    }

    /// Create a circle, approximated by a regular polygon.
    pub fn create_circle(&mut self, x: f64, y: f64, radius: f64, options: &BodyOptions) -> Entity {
        let mut backend = self.backend.borrow_mut();
        self.factory
            .create_circle(&mut backend, &mut self.events, DVec2::new(x, y), radius, options)
    }

    /// Create the fuselage, nose and engine rocket composite. Falls back to a
    /// single placeholder box if the parts cannot be assembled.
    pub fn create_rocket(&mut self, x: f64, y: f64, options: &BodyOptions) -> Entity {
        let mut backend = self.backend.borrow_mut();
        self.factory
            .create_rocket(&mut backend, &mut self.events, DVec2::new(x, y), options)
    }

    /// Create a body from one convex vertex set centred on `(x, y)`.
    pub fn create_polygon(
        &mut self,
        x: f64,
        y: f64,
        vertices: &[DVec2],
        options: &BodyOptions,
    ) -> Result<Entity, EngineError> {
        let mut backend = self.backend.borrow_mut();
        let entity = self.factory.create_polygon(
            &mut backend,
            &mut self.events,
            DVec2::new(x, y),
            vertices,
            options,
        )?;
        Ok(entity)
    }

    // ========================================================================
    // STEPPING
    // ========================================================================

    /// Bank `delta_ms` and run every whole sub-step it covers.
    ///
    /// Returns the number of sub-steps run.
    pub fn fixed_step(&mut self, delta_ms: f64) -> u32 {
        if !self.clock.accumulate(delta_ms) {
            return 0;
        }
        let mut steps = 0;
        while self.clock.consume_sub_step() {
            self.sub_step(self.config.fixed_timestep_ms);
            steps += 1;
        }
        steps
    }

    /// Run exactly one sub-step of `delta_seconds`, bypassing the
    /// accumulator.
    pub fn update(&mut self, delta_seconds: f64) {
        let delta_ms = delta_seconds * 1000.0;
        if !(delta_ms.is_finite() && delta_ms > 0.0) {
            warn!(delta_seconds, "ignoring invalid update delta");
            return;
        }
        self.sub_step(delta_ms);
    }

    /// Forces, then integration, then the tick.
    fn sub_step(&mut self, delta_ms: f64) {
        let ctx = self.force_context();
        {
            let mut backend = self.backend.borrow_mut();
            backend.world_mut().insert_resource(ctx);
            self.forces.run(backend.world_mut());
            backend.step(delta_ms);
        }
        self.clock.advance_tick();
    }

    fn force_context(&self) -> ForceContext {
        ForceContext {
            gravitational_constant: self.config.gravitational_constant,
            timestep_ms: self.config.fixed_timestep_ms,
            sources: self.registry.clone(),
        }
    }

    /// Apply a true force at a world point. Accumulated until the next
    /// sub-step integrates.
    pub fn apply_force_at(
        &mut self,
        body: Entity,
        point: DVec2,
        force: DVec2,
    ) -> Result<(), EngineError> {
        let scaled = self.force_context().scale_force(force);
        let mut backend = self.backend.borrow_mut();
        let world = backend.world_mut();
        let kinematics = *world
            .get::<Kinematics>(body)
            .ok_or(EngineError::UnknownBody(body))?;
        let mut applied = world
            .get_mut::<AppliedForce>(body)
            .ok_or(EngineError::UnknownBody(body))?;
        apply_scaled_force(&kinematics, &mut applied, point, scaled);
        Ok(())
    }

    // ========================================================================
    // SERIALIZATION
    // ========================================================================

    /// Copy the full engine state.
    pub fn to_state(&self) -> EngineState {
        let backend = self.backend.borrow();
        let mut bodies: Vec<BodyState> = self
            .factory
            .spawned()
            .iter()
            .filter_map(|entity| BodyState::from_entity(backend.world(), *entity))
            .collect();
        bodies.sort_by_key(|b| b.id);

        EngineState {
            format_version: STATE_FORMAT_VERSION,
            tick: self.clock.tick(),
            fixed_timestep_ms: self.config.fixed_timestep_ms,
            accumulator_ms: self.clock.accumulator_ms(),
            gravitational_constant: self.config.gravitational_constant,
            next_body_id: self.factory.next_id(),
            celestial_sources: self.registry.sources().to_vec(),
            bodies,
        }
    }

    /// Replace the whole engine state.
    ///
    /// Bodies whose shape cannot be rebuilt are skipped and reported through
    /// the event log; the rest of the state is still restored.
    pub fn from_state(&mut self, state: &EngineState) -> Result<(), EngineError> {
        if state.format_version != STATE_FORMAT_VERSION {
            return Err(EngineError::UnsupportedFormat(state.format_version));
        }

        self.clear_bodies();
        self.config =
            EngineConfig::new(state.fixed_timestep_ms, state.gravitational_constant).sanitized();
        self.clock = SimulationClock::restore(
            self.config.fixed_timestep_ms,
            state.accumulator_ms,
            state.tick,
        );
        self.registry.replace(state.celestial_sources.clone());
        self.factory.reset_id_counter();

        let mut restored = 0;
        {
            let mut backend = self.backend.borrow_mut();
            for body in &state.bodies {
                let Some(descriptor) = &body.creation else {
                    self.events.record(EngineEvent::BodySkipped {
                        id: body.id,
                        label: body.label.clone(),
                        reason: "missing creation descriptor".to_string(),
                    });
                    continue;
                };

                let options = rebuild_options(body);
                let entity = match self.factory.rebuild(
                    &mut backend,
                    &mut self.events,
                    descriptor,
                    body.kinematics.position,
                    &options,
                    body.id,
                ) {
                    Ok(entity) => entity,
                    Err(reason) => {
                        self.events.record(EngineEvent::BodySkipped {
                            id: body.id,
                            label: body.label.clone(),
                            reason,
                        });
                        continue;
                    }
                };

                // Overwrite factory defaults with the captured values.
                backend.world_mut().entity_mut(entity).insert((
                    body.kinematics,
                    body.force,
                    body.mass,
                    body.material,
                    body.flags,
                    body.collision_filter,
                    body.render.clone(),
                    body.aero,
                ));
                restored += 1;
            }
        }

        self.factory
            .set_next_id(self.factory.next_id().max(state.next_body_id));
        self.events.record(EngineEvent::StateRestored {
            tick: state.tick,
            bodies: restored,
        });
        Ok(())
    }

    /// Save the engine state as a JSON string.
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(state_to_json_string(&self.to_state())?)
    }

    /// Save the engine state as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        Ok(state_to_json_pretty(&self.to_state())?)
    }

    /// Save the engine state as JSON bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, EngineError> {
        Ok(state_to_json(&self.to_state())?)
    }

    /// Restore from a JSON string written by [`PhysicsEngine::to_json`].
    pub fn from_json(&mut self, json: &str) -> Result<(), EngineError> {
        let state = state_from_json_string(json)?;
        self.from_state(&state)
    }

    /// Restore from JSON bytes written by [`PhysicsEngine::to_json_bytes`].
    pub fn from_json_bytes(&mut self, data: &[u8]) -> Result<(), EngineError> {
        let state = state_from_json(data)?;
        self.from_state(&state)
    }

    /// Remove this engine's bodies. The owner clears the whole world.
    fn clear_bodies(&mut self) {
        let mut backend = self.backend.borrow_mut();
        if self.owns_backend {
            backend.clear();
        } else {
            for entity in self.factory.spawned() {
                backend.remove_body(*entity);
            }
        }
        self.factory.clear();
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Sub-steps executed so far.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Time banked by `fixed_step` that has not run yet.
    pub fn accumulator_ms(&self) -> f64 {
        self.clock.accumulator_ms()
    }

    /// Active (sanitized) configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current celestial sources, in the order given to `init`.
    pub fn celestial_sources(&self) -> &[CelestialSource] {
        self.registry.sources()
    }

    /// Number of live bodies created by this engine.
    pub fn body_count(&self) -> usize {
        let backend = self.backend.borrow();
        self.factory
            .spawned()
            .iter()
            .filter(|entity| backend.contains(**entity))
            .count()
    }

    /// Live body most recently created under `label`.
    pub fn find_body(&self, label: &str) -> Option<Entity> {
        let entity = self.factory.find(label)?;
        self.backend.borrow().contains(entity).then_some(entity)
    }

    /// Snapshot of one body, or `None` if it no longer exists.
    pub fn body_state(&self, body: Entity) -> Option<BodyState> {
        BodyState::from_entity(self.backend.borrow().world(), body)
    }

    /// World-space outline of every part of a body.
    pub fn body_vertices(&self, body: Entity) -> Option<Vec<Vec<DVec2>>> {
        let backend = self.backend.borrow();
        let world = backend.world();
        let kinematics = world.get::<Kinematics>(body)?;
        let shape = world.get::<Shape>(body)?;
        Some(
            shape
                .parts
                .iter()
                .map(|part| {
                    part.iter()
                        .map(|v| geometry::to_world(*v, kinematics.position, kinematics.angle))
                        .collect()
                })
                .collect(),
        )
    }

    /// Heat flux computed on the last sub-step.
    pub fn heat_flux(&self, body: Entity) -> Option<f64> {
        let backend = self.backend.borrow();
        backend.world().get::<AeroProfile>(body).map(|a| a.current_heat_flux)
    }

    /// Set the per-step velocity of a body.
    pub fn set_velocity(&mut self, body: Entity, velocity: DVec2) -> Result<(), EngineError> {
        self.modify::<Kinematics>(body, |k| k.velocity = velocity)
    }

    /// Set the per-step angular velocity of a body.
    pub fn set_angular_velocity(
        &mut self,
        body: Entity,
        angular_velocity: f64,
    ) -> Result<(), EngineError> {
        self.modify::<Kinematics>(body, |k| k.angular_velocity = angular_velocity)
    }

    /// Teleport a body. Velocity is left unchanged.
    pub fn set_position(&mut self, body: Entity, position: DVec2) -> Result<(), EngineError> {
        self.modify::<Kinematics>(body, |k| k.position = position)
    }

    /// Sleeping bodies receive no forces and do not move.
    pub fn set_sleeping(&mut self, body: Entity, sleeping: bool) -> Result<(), EngineError> {
        self.modify::<BodyFlags>(body, |f| f.is_sleeping = sleeping)
    }

    fn modify<T: Component>(
        &mut self,
        body: Entity,
        f: impl FnOnce(&mut T),
    ) -> Result<(), EngineError> {
        let mut backend = self.backend.borrow_mut();
        let mut component = backend
            .world_mut()
            .get_mut::<T>(body)
            .ok_or(EngineError::UnknownBody(body))?;
        f(&mut *component);
        Ok(())
    }

    /// Record an event raised on this engine's behalf, such as a skipped
    /// scenario item.
    pub fn record_event(&mut self, event: EngineEvent) {
        self.events.record(event);
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    /// Restart body id allocation at 1.
    pub fn reset_id_counter(&mut self) {
        self.factory.reset_id_counter();
    }
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::with_config(EngineConfig::default())
    }
}

impl Drop for PhysicsEngine {
    fn drop(&mut self) {
        if !self.owns_backend {
            return;
        }
        if let Ok(mut backend) = self.backend.try_borrow_mut() {
            backend.clear();
        }
    }
}

/// Options that make the factory rebuild a body as it was captured.
fn rebuild_options(body: &BodyState) -> BodyOptions {
    BodyOptions {
        label: Some(body.label.clone()),
        render: RenderOptions::Custom(RenderOverride::from(body.render.clone())),
        density: Some(body.mass.density),
        friction: Some(body.material.friction),
        friction_air: Some(body.material.friction_air),
        friction_static: Some(body.material.friction_static),
        restitution: Some(body.material.restitution),
        slop: Some(body.material.slop),
        mass: None,
        collision_filter: Some(body.collision_filter),
        aero: Some(body.aero),
        is_static: body.flags.is_static,
        is_sensor: body.flags.is_sensor,
        angle: body.kinematics.angle,
    }
}
