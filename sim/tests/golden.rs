//! Recorded trajectories and run-to-run determinism.

use glam::DVec2;
use orbit_sim::scenario::{self, ScenarioRunner};
use orbit_sim::{BodyOptions, BodyState, CelestialSource, EngineState, PhysicsEngine};

const TIMESTEP_MS: f64 = 16.67;

fn boxed_force_run() -> BodyState {
    let mut engine = PhysicsEngine::default();
    engine.init(vec![]);
    let body = engine.create_box(0.0, 0.0, 10.0, 10.0, &BodyOptions::labeled("box"));
    engine
        .apply_force_at(body, DVec2::ZERO, DVec2::new(10.0, 0.0))
        .unwrap();
    for _ in 0..10 {
        assert_eq!(engine.fixed_step(TIMESTEP_MS), 1);
    }
    assert_eq!(engine.tick(), 10);
    engine.body_state(body).unwrap()
}

#[test]
fn boxed_force_matches_golden() {
    let body = boxed_force_run();
    let k = body.kinematics;

    assert_eq!(k.position, DVec2::new(15939.365861675342, 0.008729739470459394));
    assert_eq!(k.velocity, DVec2::new(1522.8055639016684, 0.0015636517910303516));
    assert_eq!(k.angle, 0.0);
    assert_eq!(k.angular_velocity, 0.0);
    assert_eq!(body.mass.mass, 0.1);
}

#[test]
fn boxed_force_repeats_exactly() {
    assert_eq!(boxed_force_run(), boxed_force_run());
}

#[test]
fn boxed_force_scenario_matches_direct_run() {
    let mut runner = ScenarioRunner::new(scenario::find("boxed-force").unwrap());
    runner.run();
    let engine = runner.engine();
    let body = engine.body_state(engine.find_body("box").unwrap()).unwrap();
    assert_eq!(body, boxed_force_run());
}

/// No gravity and no atmosphere. An empty source list would switch on the
/// fallback downward pull.
fn empty_space() -> Vec<CelestialSource> {
    vec![CelestialSource::new("void", 0.0, DVec2::new(1.0e6, 0.0), 1.0)]
}

#[test]
fn rocket_at_rest_in_empty_space_stays_put() {
    let mut engine = PhysicsEngine::default();
    engine.init(empty_space());
    let rocket = engine.create_rocket(0.0, 0.0, &BodyOptions::default());
    let before = engine.body_state(rocket).unwrap().kinematics;

    engine.fixed_step(TIMESTEP_MS);

    let after = engine.body_state(rocket).unwrap().kinematics;
    assert_eq!(after.velocity, DVec2::ZERO);
    assert_eq!(after.position, before.position);
}

#[test]
fn rocket_rises_under_upward_force() {
    let mut engine = PhysicsEngine::default();
    engine.init(empty_space());
    let rocket = engine.create_rocket(0.0, 0.0, &BodyOptions::default());
    let before = engine.body_state(rocket).unwrap().kinematics;

    engine
        .apply_force_at(rocket, before.position, DVec2::new(0.0, -100.0))
        .unwrap();
    assert_eq!(engine.fixed_step(TIMESTEP_MS), 1);

    let after = engine.body_state(rocket).unwrap().kinematics;
    assert!(after.velocity.y < before.velocity.y);
    assert!(after.position.y < before.position.y);
    assert!((after.velocity.x - before.velocity.x).abs() < 1e-9);
    assert!((after.position.x - before.position.x).abs() < 1e-9);
}

fn run_states(name: &str) -> Vec<EngineState> {
    let scenario = scenario::find(name).unwrap();
    let steps = scenario.steps;
    let mut runner = ScenarioRunner::new(scenario);
    let mut states = vec![runner.engine().to_state()];
    for _ in 0..steps {
        runner.step_once();
        states.push(runner.engine().to_state());
    }
    states
}

#[test]
fn every_builtin_scenario_is_deterministic() {
    for entry in scenario::registry() {
        let first = run_states(entry.name);
        let second = run_states(entry.name);
        assert_eq!(first.len(), second.len());
        for (tick, (a, b)) in first.iter().zip(&second).enumerate() {
            assert_eq!(a.tick, tick as u64);
            assert_eq!(a, b, "{} diverged at tick {}", entry.name, tick);
        }
    }
}

#[test]
fn rocket_lift_scenario_rises_without_gravity() {
    let scenario = scenario::rocket_lift();
    assert!(scenario.celestial_sources.iter().all(|s| s.mass == 0.0));

    let mut runner = ScenarioRunner::new(scenario);
    let rocket = runner.engine().find_body("rocket").unwrap();
    let before = runner.engine().body_state(rocket).unwrap().kinematics;
    runner.run();

    let after = runner.engine().body_state(rocket).unwrap().kinematics;
    assert!(after.velocity.y < before.velocity.y);
    assert!(after.position.y < before.position.y);
    assert!((after.velocity.x - before.velocity.x).abs() < 1e-9);
    assert!((after.position.x - before.position.x).abs() < 1e-9);
}
