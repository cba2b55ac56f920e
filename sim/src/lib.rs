//! Orbit Sim - Physics Core
//!
//! A deterministic, fixed-timestep 2D physics core for orbital games:
//! multi-source gravity, atmospheric drag, re-entry heating and a state
//! format that resumes bit-for-bit. Uses `bevy_ecs` for the
//! entity-component-system architecture.

pub mod api;
pub mod backend;
pub mod celestial;
pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod factory;
pub mod geometry;
pub mod render;
pub mod scenario;
pub mod systems;
pub mod world;

pub use api::PhysicsEngine;
pub use backend::{RigidBodyWorld, SharedBackend};
pub use celestial::{Atmosphere, CelestialRegistry, CelestialSource};
pub use clock::SimulationClock;
pub use components::*;
pub use config::EngineConfig;
pub use error::{EngineError, GeometryError};
pub use events::{EngineEvent, EventLog};
pub use factory::{BodyFactory, BodyOptions};
pub use render::{merge_render_options, RenderOptions, RenderOverride, SpriteRef};
pub use scenario::{Scenario, ScenarioRunner};
pub use world::{BodyState, EngineState};
