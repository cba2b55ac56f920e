//! Rigid-body backend.
//!
//! Stores bodies as ECS entities and advances them with the integration
//! schedule. Contact detection and resolution are not performed here; this
//! world only adds bodies, removes them and moves them through time.

use crate::components::*;
use crate::systems::integration::{integration_system, StepDelta};
use bevy_ecs::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Handle for a backend world shared between engine instances.
pub type SharedBackend = Rc<RefCell<RigidBodyWorld>>;

pub struct RigidBodyWorld {
    world: World,
    integrator: Schedule,
}

impl RigidBodyWorld {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(StepDelta(0.0));

        let mut integrator = Schedule::default();
        integrator.add_systems(integration_system);

        Self { world, integrator }
    }

    /// Create a world wrapped for sharing.
    pub fn shared() -> SharedBackend {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn add_body(&mut self, body: BodyBundle) -> Entity {
        self.world.spawn(body).id()
    }

    pub fn remove_body(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity)
    }

    /// Remove every body. Bodies are despawned one by one so that stale
    /// handles never match a body spawned later.
    pub fn clear(&mut self) {
        let mut query = self.world.query_filtered::<Entity, With<BodyId>>();
        let bodies: Vec<Entity> = query.iter(&self.world).collect();
        for entity in bodies {
            self.world.despawn(entity);
        }
    }

    /// Integrate every body over `delta_ms` and clear accumulated forces.
    pub fn step(&mut self, delta_ms: f64) {
        self.world.insert_resource(StepDelta(delta_ms));
        self.integrator.run(&mut self.world);
    }

    pub fn body_count(&mut self) -> usize {
        let mut query = self.world.query::<&BodyId>();
        query.iter(&self.world).count()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.get::<BodyId>(entity).is_some()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for RigidBodyWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn bundle(id: u32) -> BodyBundle {
        BodyBundle {
            id: BodyId(id),
            label: BodyLabel(format!("body-{}", id)),
            kinematics: Kinematics::at(DVec2::ZERO, 0.0),
            force: AppliedForce::default(),
            mass: MassProperties::new(1.0, 1.0, 0.001, 1000.0),
            material: Material::default(),
            flags: BodyFlags::default(),
            filter: CollisionFilter::default(),
            render: RenderDescriptor::default(),
            creation: CreationDescriptor::Circle { radius: 1.0 },
            aero: AeroProfile::default(),
            shape: Shape { parts: vec![] },
        }
    }

    #[test]
    fn test_add_and_remove() {
        let mut backend = RigidBodyWorld::new();
        let a = backend.add_body(bundle(1));
        let b = backend.add_body(bundle(2));
        assert_eq!(backend.body_count(), 2);

        assert!(backend.remove_body(a));
        assert!(!backend.contains(a));
        assert!(backend.contains(b));
        assert_eq!(backend.body_count(), 1);
    }

    #[test]
    fn test_clear_invalidates_old_handles() {
        let mut backend = RigidBodyWorld::new();
        let old = backend.add_body(bundle(1));
        backend.clear();
        assert_eq!(backend.body_count(), 0);

        let new = backend.add_body(bundle(2));
        assert_ne!(old, new);
        assert!(!backend.contains(old));
    }

    #[test]
    fn test_step_moves_and_clears_forces() {
        let mut backend = RigidBodyWorld::new();
        let body = backend.add_body(bundle(1));
        backend.world_mut().get_mut::<AppliedForce>(body).unwrap().force = DVec2::new(0.001, 0.0);

        backend.step(10.0);

        let world = backend.world();
        assert!(world.get::<Kinematics>(body).unwrap().position.x > 0.0);
        assert_eq!(world.get::<AppliedForce>(body).unwrap().force, DVec2::ZERO);
    }
}
