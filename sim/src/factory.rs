//! Body construction.
//!
//! Every body is tagged with the [`CreationDescriptor`] that produced it so
//! it can be rebuilt from a serialized state. The factory owns the id counter
//! and the label index for its engine.

use crate::backend::RigidBodyWorld;
use crate::components::*;
use crate::error::GeometryError;
use crate::events::{EngineEvent, EventLog};
use crate::geometry::{self, MassSummary};
use crate::render::{merge_render_options, RenderOptions};
use bevy_ecs::entity::Entity;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Density used when a body does not specify one.
pub const DEFAULT_DENSITY: f64 = 0.001;

/// Rocket dimensions, nose pointing toward -y.
pub const ROCKET_WIDTH: f64 = 20.0;
pub const ROCKET_FUSELAGE_HEIGHT: f64 = 60.0;
pub const ROCKET_NOSE_HEIGHT: f64 = 20.0;
pub const ROCKET_ENGINE_HEIGHT: f64 = 12.0;
pub const ROCKET_HEIGHT: f64 = ROCKET_FUSELAGE_HEIGHT + ROCKET_NOSE_HEIGHT + ROCKET_ENGINE_HEIGHT;

/// Caller options shared by every `create_*` method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyOptions {
    pub label: Option<String>,
    pub render: RenderOptions,
    pub density: Option<f64>,
    pub friction: Option<f64>,
    pub friction_air: Option<f64>,
    pub friction_static: Option<f64>,
    pub restitution: Option<f64>,
    pub slop: Option<f64>,
    /// Overrides the mass computed from geometry; inertia scales with it.
    pub mass: Option<f64>,
    pub collision_filter: Option<CollisionFilter>,
    pub aero: Option<AeroProfile>,
    pub is_static: bool,
    pub is_sensor: bool,
    pub angle: f64,
}

impl BodyOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn with_aero(
        mut self,
        drag_coefficient_area: Option<f64>,
        effective_nose_radius: Option<f64>,
    ) -> Self {
        self.aero = Some(AeroProfile::new(drag_coefficient_area, effective_nose_radius));
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self
    }

    fn material(&self) -> Material {
        let defaults = Material::default();
        Material {
            restitution: self.restitution.unwrap_or(defaults.restitution),
            friction: self.friction.unwrap_or(defaults.friction),
            friction_air: self.friction_air.unwrap_or(defaults.friction_air),
            friction_static: self.friction_static.unwrap_or(defaults.friction_static),
            slop: self.slop.unwrap_or(defaults.slop),
        }
    }
}

/// The three convex parts of a rocket in rocket-local coordinates:
/// fuselage, nose cone and engine block.
pub fn rocket_parts() -> Vec<Vec<DVec2>> {
    let hw = ROCKET_WIDTH * 0.5;
    let top = -ROCKET_FUSELAGE_HEIGHT * 0.5;
    let bottom = ROCKET_FUSELAGE_HEIGHT * 0.5;
    let fuselage = geometry::rectangle(ROCKET_WIDTH, ROCKET_FUSELAGE_HEIGHT);
    let nose = vec![
        DVec2::new(-hw, top),
        DVec2::new(0.0, top - ROCKET_NOSE_HEIGHT),
        DVec2::new(hw, top),
    ];
    let engine = vec![
        DVec2::new(-hw * 0.8, bottom),
        DVec2::new(hw * 0.8, bottom),
        DVec2::new(hw * 1.2, bottom + ROCKET_ENGINE_HEIGHT),
        DVec2::new(-hw * 1.2, bottom + ROCKET_ENGINE_HEIGHT),
    ];
    vec![fuselage, nose, engine]
}

fn default_render(descriptor: &CreationDescriptor) -> RenderDescriptor {
    match descriptor {
        CreationDescriptor::Box { .. } => RenderDescriptor::solid("#4a6fa5", "#2e4a73"),
        CreationDescriptor::Circle { .. } => RenderDescriptor::solid("#d98c3f", "#9c5f24"),
        CreationDescriptor::Rocket {} => RenderDescriptor::solid("#e6e6e6", "#9a9a9a"),
        CreationDescriptor::Polygon { .. } => RenderDescriptor::solid("#6aa86a", "#3f6e3f"),
        CreationDescriptor::Unknown => RenderDescriptor::default(),
    }
}

/// Resolved outline and mass for a new body.
struct Geometry {
    parts: Vec<Vec<DVec2>>,
    mass: MassSummary,
}

#[derive(Debug, Default)]
pub struct BodyFactory {
    next_id: u32,
    labels: HashMap<String, Entity>,
    spawned: Vec<Entity>,
}

impl BodyFactory {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            labels: HashMap::new(),
            spawned: Vec::new(),
        }
    }

    pub fn create_box(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        position: DVec2,
        width: f64,
        height: f64,
        options: &BodyOptions,
    ) -> Entity {
        let density = options.density.unwrap_or(DEFAULT_DENSITY);
        let vertices = geometry::rectangle(width, height);
        let geometry = Geometry {
            mass: geometry::polygon_mass(&vertices, density),
            parts: vec![vertices],
        };
        self.spawn(
            backend,
            events,
            CreationDescriptor::Box { width, height },
            geometry,
            position,
            options,
            None,
        )
    }

    pub fn create_circle(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        position: DVec2,
        radius: f64,
        options: &BodyOptions,
    ) -> Entity {
        let density = options.density.unwrap_or(DEFAULT_DENSITY);
        let vertices = geometry::circle(radius);
        let geometry = Geometry {
            mass: geometry::polygon_mass(&vertices, density),
            parts: vec![vertices],
        };
        self.spawn(
            backend,
            events,
            CreationDescriptor::Circle { radius },
            geometry,
            position,
            options,
            None,
        )
    }

    pub fn create_rocket(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        position: DVec2,
        options: &BodyOptions,
    ) -> Entity {
        self.create_rocket_from_parts(backend, events, position, &rocket_parts(), options, None)
    }

    /// Assemble a rocket from explicit parts, falling back to a box when
    /// the parts are unusable.
    pub(crate) fn create_rocket_from_parts(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        position: DVec2,
        parts: &[Vec<DVec2>],
        options: &BodyOptions,
        id: Option<u32>,
    ) -> Entity {
        let density = options.density.unwrap_or(DEFAULT_DENSITY);
        let geometry = match geometry::assemble(parts, density) {
            Ok(composite) => Geometry {
                parts: composite.parts,
                mass: composite.mass,
            },
            Err(error) => {
                let label = options.label.clone().unwrap_or_else(|| "rocket".to_string());
                events.record(EngineEvent::PlaceholderBody {
                    label,
                    reason: error.to_string(),
                });
                let vertices = geometry::rectangle(ROCKET_WIDTH, ROCKET_HEIGHT);
                Geometry {
                    mass: geometry::polygon_mass(&vertices, density),
                    parts: vec![vertices],
                }
            }
        };
        self.spawn(
            backend,
            events,
            CreationDescriptor::Rocket {},
            geometry,
            position,
            options,
            id,
        )
    }

    /// Create a body from one convex vertex set. The polygon's centroid is
    /// placed at `position`.
    pub fn create_polygon(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        position: DVec2,
        vertices: &[DVec2],
        options: &BodyOptions,
    ) -> Result<Entity, GeometryError> {
        self.create_polygon_with_id(backend, events, position, vertices, options, None)
    }

    fn create_polygon_with_id(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        position: DVec2,
        vertices: &[DVec2],
        options: &BodyOptions,
        id: Option<u32>,
    ) -> Result<Entity, GeometryError> {
        geometry::validate_convex(vertices)?;
        let density = options.density.unwrap_or(DEFAULT_DENSITY);
        let (_, local) = geometry::recentre(vertices);
        let geometry = Geometry {
            mass: geometry::polygon_mass(&local, density),
            parts: vec![local],
        };
        Ok(self.spawn(
            backend,
            events,
            CreationDescriptor::Polygon {
                vertices: vertices.to_vec(),
            },
            geometry,
            position,
            options,
            id,
        ))
    }

    /// Replay a creation descriptor, keeping the original body id.
    pub fn rebuild(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        descriptor: &CreationDescriptor,
        position: DVec2,
        options: &BodyOptions,
        id: u32,
    ) -> Result<Entity, String> {
        let density = options.density.unwrap_or(DEFAULT_DENSITY);
        match descriptor {
            CreationDescriptor::Box { width, height } => {
                let vertices = geometry::rectangle(*width, *height);
                let geometry = Geometry {
                    mass: geometry::polygon_mass(&vertices, density),
                    parts: vec![vertices],
                };
                Ok(self.spawn(
                    backend,
                    events,
                    descriptor.clone(),
                    geometry,
                    position,
                    options,
                    Some(id),
                ))
            }
            CreationDescriptor::Circle { radius } => {
                let vertices = geometry::circle(*radius);
                let geometry = Geometry {
                    mass: geometry::polygon_mass(&vertices, density),
                    parts: vec![vertices],
                };
                Ok(self.spawn(
                    backend,
                    events,
                    descriptor.clone(),
                    geometry,
                    position,
                    options,
                    Some(id),
                ))
            }
            CreationDescriptor::Rocket {} => Ok(self.create_rocket_from_parts(
                backend,
                events,
                position,
                &rocket_parts(),
                options,
                Some(id),
            )),
            CreationDescriptor::Polygon { vertices } => self
                .create_polygon_with_id(backend, events, position, vertices, options, Some(id))
                .map_err(|e| e.to_string()),
            CreationDescriptor::Unknown => Err("unrecognized creation descriptor".to_string()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn(
        &mut self,
        backend: &mut RigidBodyWorld,
        events: &mut EventLog,
        descriptor: CreationDescriptor,
        geometry: Geometry,
        position: DVec2,
        options: &BodyOptions,
        id: Option<u32>,
    ) -> Entity {
        let id = self.allocate_id(id);
        let label = options
            .label
            .clone()
            .unwrap_or_else(|| format!("{}-{}", descriptor.kind(), id));

        let density = options.density.unwrap_or(DEFAULT_DENSITY);
        let mut mass = MassProperties::new(
            geometry.mass.mass,
            geometry.mass.inertia,
            density,
            geometry.mass.area,
        );
        if let Some(override_mass) = options.mass {
            mass = mass.with_mass(override_mass);
        }
        if options.is_static {
            mass = mass.immovable();
        }

        let filter = options.collision_filter.unwrap_or_else(|| match descriptor {
            CreationDescriptor::Rocket {} => CollisionFilter::rocket(),
            _ => CollisionFilter::default(),
        });
        let render = merge_render_options(&default_render(&descriptor), &options.render);

        let entity = backend.add_body(BodyBundle {
            id: BodyId(id),
            label: BodyLabel(label.clone()),
            kinematics: Kinematics::at(position, options.angle),
            force: AppliedForce::default(),
            mass,
            material: options.material(),
            flags: BodyFlags {
                is_static: options.is_static,
                is_sensor: options.is_sensor,
                is_sleeping: false,
            },
            filter,
            render,
            creation: descriptor,
            aero: options.aero.unwrap_or_default(),
            shape: Shape {
                parts: geometry.parts,
            },
        });

        if let Some(previous) = self.labels.insert(label.clone(), entity) {
            if backend.contains(previous) {
                events.record(EngineEvent::DuplicateLabel { label });
            }
        }
        self.spawned.push(entity);
        entity
    }

    fn allocate_id(&mut self, requested: Option<u32>) -> u32 {
        match requested {
            Some(id) => {
                self.next_id = self.next_id.max(id.saturating_add(1));
                id
            }
            None => {
                let id = self.next_id;
                self.next_id = self.next_id.saturating_add(1);
                id
            }
        }
    }

    pub fn find(&self, label: &str) -> Option<Entity> {
        self.labels.get(label).copied()
    }

    /// Entities created by this factory, oldest first.
    pub fn spawned(&self) -> &[Entity] {
        &self.spawned
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn set_next_id(&mut self, next_id: u32) {
        self.next_id = next_id;
    }

    /// Restart id allocation, for harnesses that compare separate runs.
    pub fn reset_id_counter(&mut self) {
        self.next_id = 1;
    }

    /// Forget every indexed body.
    pub fn clear(&mut self) {
        self.labels.clear();
        self.spawned.clear();
    }
}
