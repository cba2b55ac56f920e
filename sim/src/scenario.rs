//! Scripted scenarios.
//!
//! A scenario is a source list, an initial body list, timed actions and a
//! step count. `ScenarioRunner` feeds it into an engine one sub-step at a
//! time, applying each step's actions before the clock runs.
//!
//! Built-in scenarios are listed in [`registry`].

use crate::api::PhysicsEngine;
use crate::celestial::{Atmosphere, CelestialSource};
use crate::components::CreationDescriptor;
use crate::config::EngineConfig;
use crate::events::EngineEvent;
use crate::factory::BodyOptions;
use bevy_ecs::entity::Entity;
use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBody {
    pub shape: CreationDescriptor,
    pub x: f64,
    pub y: f64,
    /// Initial velocity, per sub-step.
    #[serde(default)]
    pub velocity: DVec2,
    #[serde(default)]
    pub angular_velocity: f64,
    #[serde(default)]
    pub options: BodyOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    ApplyForce,
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAction {
    pub step: u64,
    pub target_body_label: String,
    pub action_type: ActionType,
    pub force: DVec2,
    /// World point the force acts at. Defaults to the body position.
    #[serde(default)]
    pub application_point: Option<DVec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(default)]
    pub celestial_sources: Vec<CelestialSource>,
    pub bodies: Vec<ScenarioBody>,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
    pub steps: u64,
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: u64) -> Self {
        Self {
            name: name.into(),
            config: EngineConfig::default(),
            celestial_sources: Vec::new(),
            bodies: Vec::new(),
            actions: Vec::new(),
            steps,
        }
    }
}

/// Drives one scenario through an engine.
pub struct ScenarioRunner {
    scenario: Scenario,
    engine: PhysicsEngine,
    step: u64,
}

impl ScenarioRunner {
    /// Build a fresh engine for the scenario and populate it.
    pub fn new(scenario: Scenario) -> Self {
        let mut engine = PhysicsEngine::with_config(scenario.config);
        Self::setup(&mut engine, &scenario);
        Self {
            scenario,
            engine,
            step: 0,
        }
    }

    /// Continue a scenario on an engine restored from a saved state.
    pub fn resume(scenario: Scenario, engine: PhysicsEngine, step: u64) -> Self {
        Self {
            scenario,
            engine,
            step,
        }
    }

    /// Install the scenario's sources and bodies. Bodies with unsupported
    /// shapes are skipped.
    pub fn setup(engine: &mut PhysicsEngine, scenario: &Scenario) {
        engine.init(scenario.celestial_sources.clone());
        for (index, body) in scenario.bodies.iter().enumerate() {
            let placed = Self::spawn(engine, body).and_then(|entity| {
                engine
                    .set_velocity(entity, body.velocity)
                    .and_then(|_| engine.set_angular_velocity(entity, body.angular_velocity))
                    .map_err(|e| e.to_string())
            });
            if let Err(reason) = placed {
                engine.record_event(EngineEvent::ScenarioItemSkipped {
                    step: 0,
                    reason: format!("body {}: {}", index, reason),
                });
            }
        }
    }

    fn spawn(engine: &mut PhysicsEngine, body: &ScenarioBody) -> Result<Entity, String> {
        let options = &body.options;
        match &body.shape {
            CreationDescriptor::Box { width, height } => {
                Ok(engine.create_box(body.x, body.y, *width, *height, options))
            }
            CreationDescriptor::Circle { radius } => {
                Ok(engine.create_circle(body.x, body.y, *radius, options))
            }
            CreationDescriptor::Rocket {} => Ok(engine.create_rocket(body.x, body.y, options)),
            CreationDescriptor::Polygon { vertices } => engine
                .create_polygon(body.x, body.y, vertices, options)
                .map_err(|e| e.to_string()),
            CreationDescriptor::Unknown => Err("unsupported body type".to_string()),
        }
    }

    /// Apply this step's actions, then run one sub-step.
    pub fn step_once(&mut self) {
        for action in self.scenario.actions.iter().filter(|a| a.step == self.step) {
            if let Err(reason) = apply_action(&mut self.engine, action) {
                self.engine.record_event(EngineEvent::ScenarioItemSkipped {
                    step: action.step,
                    reason,
                });
            }
        }
        let timestep = self.engine.config().fixed_timestep_ms;
        self.engine.fixed_step(timestep);
        self.step += 1;
    }

    /// Run until the scenario's step count is reached.
    pub fn run(&mut self) {
        self.run_to(self.scenario.steps);
    }

    /// Run until `step` sub-steps have been executed in total.
    pub fn run_to(&mut self, step: u64) {
        while self.step < step {
            self.step_once();
        }
    }

    pub fn current_step(&self) -> u64 {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.scenario.steps
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn engine(&self) -> &PhysicsEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PhysicsEngine {
        &mut self.engine
    }

    pub fn into_engine(self) -> PhysicsEngine {
        self.engine
    }
}

fn apply_action(engine: &mut PhysicsEngine, action: &ScenarioAction) -> Result<(), String> {
    match action.action_type {
        ActionType::ApplyForce => {
            let body = engine
                .find_body(&action.target_body_label)
                .ok_or_else(|| format!("no body labelled {:?}", action.target_body_label))?;
            let point = match action.application_point {
                Some(point) => point,
                None => engine
                    .body_state(body)
                    .map(|b| b.kinematics.position)
                    .ok_or_else(|| format!("no body labelled {:?}", action.target_body_label))?,
            };
            engine
                .apply_force_at(body, point, action.force)
                .map_err(|e| e.to_string())
        }
        ActionType::Unsupported => Err("unsupported action type".to_string()),
    }
}

// ============================================================================
// BUILT-IN SCENARIOS
// ============================================================================

/// A named scenario constructor.
pub struct ScenarioEntry {
    pub name: &'static str,
    pub build: fn() -> Scenario,
}

const REGISTRY: &[ScenarioEntry] = &[
    ScenarioEntry {
        name: "boxed-force",
        build: boxed_force,
    },
    ScenarioEntry {
        name: "rocket-lift",
        build: rocket_lift,
    },
    ScenarioEntry {
        name: "low-orbit",
        build: low_orbit,
    },
    ScenarioEntry {
        name: "reentry",
        build: reentry,
    },
];

/// Every built-in scenario, in declaration order.
pub fn registry() -> &'static [ScenarioEntry] {
    REGISTRY
}

pub fn find(name: &str) -> Option<Scenario> {
    REGISTRY.iter().find(|e| e.name == name).map(|e| (e.build)())
}

fn push_force(scenario: &mut Scenario, label: &str, force: DVec2) {
    scenario.actions.push(ScenarioAction {
        step: 0,
        target_body_label: label.to_string(),
        action_type: ActionType::ApplyForce,
        force,
        application_point: None,
    });
}

/// A 10x10 box pushed sideways once, with no celestial sources.
pub fn boxed_force() -> Scenario {
    let mut scenario = Scenario::new("boxed-force", 10);
    scenario.bodies.push(ScenarioBody {
        shape: CreationDescriptor::Box {
            width: 10.0,
            height: 10.0,
        },
        x: 0.0,
        y: 0.0,
        velocity: DVec2::ZERO,
        angular_velocity: 0.0,
        options: BodyOptions::labeled("box"),
    });
    push_force(&mut scenario, "box", DVec2::new(10.0, 0.0));
    scenario
}

/// A massless source: gravity and the fallback pull are both off.
fn empty_space() -> CelestialSource {
    CelestialSource::new("void", 0.0, DVec2::new(1.0e6, 0.0), 1.0)
}

/// A rocket given one upward push in empty space.
pub fn rocket_lift() -> Scenario {
    let mut scenario = Scenario::new("rocket-lift", 1);
    scenario.celestial_sources.push(empty_space());
    scenario.bodies.push(ScenarioBody {
        shape: CreationDescriptor::Rocket {},
        x: 0.0,
        y: 0.0,
        velocity: DVec2::ZERO,
        angular_velocity: 0.0,
        options: BodyOptions::labeled("rocket"),
    });
    push_force(&mut scenario, "rocket", DVec2::new(0.0, -100.0));
    scenario
}

fn planet() -> CelestialSource {
    CelestialSource::new("planet", 1.0e9, DVec2::ZERO, 1.0e5)
        .with_radius(600.0)
        .with_atmosphere(Atmosphere {
            limit_altitude: 150.0,
            surface_density: 1.2e-3,
            scale_height: 40.0,
        })
}

/// A satellite on a roughly circular orbit above the atmosphere.
pub fn low_orbit() -> Scenario {
    let mut scenario = Scenario::new("low-orbit", 600);
    scenario.celestial_sources.push(planet());

    let radius = 1000.0;
    let source = planet();
    let g = scenario.config.gravitational_constant;
    let timestep = scenario.config.fixed_timestep_ms;
    // Per-step speed at which gravity supplies the centripetal term.
    let speed = (g * source.mass * timestep / 1000.0 / radius).sqrt();

    scenario.bodies.push(ScenarioBody {
        shape: CreationDescriptor::Circle { radius: 5.0 },
        x: 0.0,
        y: -radius,
        velocity: DVec2::new(speed, 0.0),
        angular_velocity: 0.0,
        options: BodyOptions {
            friction_air: Some(0.0),
            ..BodyOptions::labeled("satellite")
        },
    });
    scenario
}

/// A blunt capsule diving into the atmosphere.
pub fn reentry() -> Scenario {
    let mut scenario = Scenario::new("reentry", 300);
    scenario.celestial_sources.push(planet());
    scenario.bodies.push(ScenarioBody {
        shape: CreationDescriptor::Circle { radius: 6.0 },
        x: -300.0,
        y: -740.0,
        velocity: DVec2::new(3.0, 1.0),
        angular_velocity: 0.0,
        options: BodyOptions {
            friction_air: Some(0.0),
            ..BodyOptions::labeled("capsule").with_aero(Some(2.0), Some(3.0))
        },
    });
    scenario
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_unique() {
        let names: Vec<&str> = registry().iter().map(|e| e.name).collect();
        for (i, name) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(name));
            assert_eq!(find(name).unwrap().name, *name);
        }
        assert!(find("no-such-scenario").is_none());
    }

    #[test]
    fn test_runner_counts_steps() {
        let mut runner = ScenarioRunner::new(boxed_force());
        runner.run_to(4);
        assert_eq!(runner.current_step(), 4);
        assert_eq!(runner.engine().tick(), 4);
        assert!(!runner.is_finished());
        runner.run();
        assert_eq!(runner.engine().tick(), 10);
        assert!(runner.is_finished());
    }

    #[test]
    fn test_action_pushes_box() {
        let mut runner = ScenarioRunner::new(boxed_force());
        runner.run();
        let engine = runner.engine();
        let body = engine.find_body("box").unwrap();
        let state = engine.body_state(body).unwrap();
        assert!(state.kinematics.velocity.x > 0.0);
        assert!(state.kinematics.position.x > 0.0);
    }

    #[test]
    fn test_unsupported_items_skipped() {
        let mut scenario = boxed_force();
        scenario.bodies.push(ScenarioBody {
            shape: CreationDescriptor::Unknown,
            x: 0.0,
            y: 0.0,
            velocity: DVec2::ZERO,
            angular_velocity: 0.0,
            options: BodyOptions::default(),
        });
        scenario.actions.push(ScenarioAction {
            step: 1,
            target_body_label: "box".into(),
            action_type: ActionType::Unsupported,
            force: DVec2::X,
            application_point: None,
        });
        scenario.actions.push(ScenarioAction {
            step: 2,
            target_body_label: "ghost".into(),
            action_type: ActionType::ApplyForce,
            force: DVec2::X,
            application_point: None,
        });

        let mut runner = ScenarioRunner::new(scenario);
        runner.run();

        let events = runner.engine_mut().drain_events();
        let skipped: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                EngineEvent::ScenarioItemSkipped { step, .. } => Some(*step),
                _ => None,
            })
            .collect();
        assert_eq!(skipped, vec![0, 1, 2]);
        assert_eq!(runner.engine().body_count(), 1);
        assert_eq!(runner.engine().tick(), 10);
    }

    #[test]
    fn test_scenario_json_accepts_unknown_action() {
        let json = r#"{
            "name": "scripted",
            "bodies": [{ "shape": { "type": "Circle", "radius": 2.0 }, "x": 1.0, "y": 2.0 }],
            "actions": [{
                "step": 0,
                "target_body_label": "circle-1",
                "action_type": "teleport",
                "force": [0.0, 0.0]
            }],
            "steps": 3
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(scenario.actions[0].action_type, ActionType::Unsupported);
        assert_eq!(scenario.config, EngineConfig::default());
        assert_eq!(scenario.bodies[0].options, BodyOptions::default());
    }

    #[test]
    fn test_orbit_stays_above_surface() {
        let mut runner = ScenarioRunner::new(low_orbit());
        runner.run();
        let engine = runner.engine();
        let body = engine.find_body("satellite").unwrap();
        let distance = engine.body_state(body).unwrap().kinematics.position.length();
        assert!(distance > 900.0 && distance < 1100.0, "distance {}", distance);
    }
}
