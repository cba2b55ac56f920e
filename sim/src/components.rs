//! ECS components that make up a rigid body.
//!
//! Components are pure data containers attached to body entities.
//! Forces and integration live in systems that query these components.

use bevy_ecs::prelude::*;
use glam::DVec2;
use serde::{Deserialize, Serialize};

pub use crate::render::RenderDescriptor;

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Stable numeric body id, preserved across serialization.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BodyId(pub u32);

/// Unique human-readable label.
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyLabel(pub String);

/// Minimal shape data needed to rebuild a body's geometry.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CreationDescriptor {
    Box { width: f64, height: f64 },
    Circle { radius: f64 },
    Rocket {},
    Polygon { vertices: Vec<DVec2> },
    /// Any tag this build does not recognize. Never produced by the factory.
    #[serde(other)]
    Unknown,
}

impl CreationDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            CreationDescriptor::Box { .. } => "box",
            CreationDescriptor::Circle { .. } => "circle",
            CreationDescriptor::Rocket {} => "rocket",
            CreationDescriptor::Polygon { .. } => "polygon",
            CreationDescriptor::Unknown => "unknown",
        }
    }
}

// ============================================================================
// KINEMATIC COMPONENTS
// ============================================================================

/// Kinematic state. Velocities are expressed per sub-step, as the
/// integrator stores them.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub position: DVec2,
    pub angle: f64,
    pub velocity: DVec2,
    pub angular_velocity: f64,
    /// Size of the last sub-step this body was integrated with, in ms.
    /// Zero until the first step.
    pub last_delta_ms: f64,
}

impl Kinematics {
    pub fn at(position: DVec2, angle: f64) -> Self {
        Self {
            position,
            angle,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            last_delta_ms: 0.0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }
}

/// Force and torque accumulated for the next integration step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AppliedForce {
    pub force: DVec2,
    pub torque: f64,
}

impl AppliedForce {
    pub fn clear(&mut self) {
        self.force = DVec2::ZERO;
        self.torque = 0.0;
    }
}

// ============================================================================
// DYNAMIC COMPONENTS
// ============================================================================

/// Mass properties. Static bodies keep a finite mass but zero inverses.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f64,
    pub inverse_mass: f64,
    pub inertia: f64,
    pub inverse_inertia: f64,
    pub density: f64,
    pub area: f64,
}

impl MassProperties {
    pub fn new(mass: f64, inertia: f64, density: f64, area: f64) -> Self {
        Self {
            mass,
            inverse_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            inertia,
            inverse_inertia: if inertia > 0.0 { 1.0 / inertia } else { 0.0 },
            density,
            area,
        }
    }

    /// Change the mass, scaling inertia to match.
    pub fn with_mass(self, mass: f64) -> Self {
        let inertia = if self.mass > 0.0 {
            self.inertia * (mass / self.mass)
        } else {
            self.inertia
        };
        let density = if self.area > 0.0 { mass / self.area } else { self.density };
        Self::new(mass, inertia, density, self.area)
    }

    pub fn immovable(self) -> Self {
        Self {
            inverse_mass: 0.0,
            inverse_inertia: 0.0,
            ..self
        }
    }
}

/// Surface and air-friction coefficients.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub restitution: f64,
    pub friction: f64,
    pub friction_air: f64,
    pub friction_static: f64,
    pub slop: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.1,
            friction_air: 0.01,
            friction_static: 0.5,
            slop: 0.05,
        }
    }
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyFlags {
    pub is_static: bool,
    pub is_sensor: bool,
    pub is_sleeping: bool,
}

impl BodyFlags {
    /// Whether forces and integration apply to this body.
    pub fn is_dynamic(&self) -> bool {
        !self.is_static && !self.is_sleeping
    }
}

// ============================================================================
// COLLISION COMPONENTS
// ============================================================================

/// Category bit for ordinary bodies.
pub const DEFAULT_CATEGORY: u32 = 0x0001;
/// Category bit reserved for rockets.
pub const ROCKET_CATEGORY: u32 = 0x0002;
/// Rockets collide with ordinary bodies but not with each other.
pub const ROCKET_MASK: u32 = DEFAULT_CATEGORY;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
    pub group: i32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY,
            mask: u32::MAX,
            group: 0,
        }
    }
}

impl CollisionFilter {
    pub fn rocket() -> Self {
        Self {
            category: ROCKET_CATEGORY,
            mask: ROCKET_MASK,
            group: 0,
        }
    }

    /// Whether two filters allow contact.
    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        if self.group == other.group && self.group != 0 {
            return self.group > 0;
        }
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

// ============================================================================
// SHAPE & AERODYNAMICS
// ============================================================================

/// Convex part outlines relative to the centre of mass, unrotated.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Shape {
    pub parts: Vec<Vec<DVec2>>,
}

/// Aerodynamic inputs and the heating output for a body.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroProfile {
    /// Drag coefficient times reference area. Falls back to a default.
    pub drag_coefficient_area: Option<f64>,
    /// Effective nose radius; heating is only computed when positive.
    pub effective_nose_radius: Option<f64>,
    /// Heat flux computed on the last sub-step.
    pub current_heat_flux: f64,
}

impl AeroProfile {
    pub fn new(drag_coefficient_area: Option<f64>, effective_nose_radius: Option<f64>) -> Self {
        Self {
            drag_coefficient_area,
            effective_nose_radius,
            current_heat_flux: 0.0,
        }
    }
}

// ============================================================================
// BUNDLES
// ============================================================================

/// Everything a body entity carries.
#[derive(Bundle)]
pub struct BodyBundle {
    pub id: BodyId,
    pub label: BodyLabel,
    pub kinematics: Kinematics,
    pub force: AppliedForce,
    pub mass: MassProperties,
    pub material: Material,
    pub flags: BodyFlags,
    pub filter: CollisionFilter,
    pub render: RenderDescriptor,
    pub creation: CreationDescriptor,
    pub aero: AeroProfile,
    pub shape: Shape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_override_scales_inertia() {
        let props = MassProperties::new(2.0, 8.0, 0.02, 100.0);
        let heavier = props.with_mass(4.0);
        assert_eq!(heavier.mass, 4.0);
        assert_eq!(heavier.inertia, 16.0);
        assert_eq!(heavier.inverse_mass, 0.25);
        assert_eq!(heavier.density, 0.04);
    }

    #[test]
    fn test_immovable_keeps_finite_mass() {
        let props = MassProperties::new(2.0, 8.0, 0.02, 100.0).immovable();
        assert_eq!(props.mass, 2.0);
        assert_eq!(props.inverse_mass, 0.0);
        assert_eq!(props.inverse_inertia, 0.0);
    }

    #[test]
    fn test_rocket_filter() {
        let rocket = CollisionFilter::rocket();
        let other_rocket = CollisionFilter::rocket();
        let crate_body = CollisionFilter::default();
        assert!(rocket.can_collide(&crate_body));
        assert!(!rocket.can_collide(&other_rocket));
    }

    #[test]
    fn test_descriptor_tags() {
        let descriptor = CreationDescriptor::Box {
            width: 1.0,
            height: 2.0,
        };
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains(r#""type":"Box""#));

        let rocket: CreationDescriptor = serde_json::from_str(r#"{"type":"Rocket"}"#).unwrap();
        assert_eq!(rocket, CreationDescriptor::Rocket {});

        let unknown: CreationDescriptor =
            serde_json::from_str(r#"{"type":"Hexapod","legs":6}"#).unwrap();
        assert_eq!(unknown, CreationDescriptor::Unknown);
    }

    #[test]
    fn test_flags_dynamic() {
        assert!(BodyFlags::default().is_dynamic());
        let sleeping = BodyFlags { is_sleeping: true, ..Default::default() };
        assert!(!sleeping.is_dynamic());
    }
}
