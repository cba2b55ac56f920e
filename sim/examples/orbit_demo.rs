//! Demonstration of the orbital physics core.
//!
//! Run with: cargo run --example orbit_demo
//! Set RUST_LOG=orbit_sim=debug to see engine events.

use orbit_sim::scenario::{self, ScenarioRunner};
use orbit_sim::PhysicsEngine;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Default filter: our crate at info, everything else at warn.
const DEFAULT_FILTER: &str = "warn,orbit_sim=info";

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    Registry::default()
        .with(filter)
        .with(fmt::layer().compact())
        .init();

    println!("=== Orbit Sim - Physics Core Demo ===\n");

    println!("Built-in scenarios:");
    for entry in scenario::registry() {
        let scenario = (entry.build)();
        println!(
            "  {:<12} {} bodies, {} actions, {} steps",
            entry.name,
            scenario.bodies.len(),
            scenario.actions.len(),
            scenario.steps
        );
    }

    // Fly the satellite for a while, printing its track.
    println!("\n--- low-orbit ---\n");
    let mut runner = ScenarioRunner::new(scenario::low_orbit());
    while !runner.is_finished() {
        runner.step_once();
        if runner.current_step() % 100 == 0 {
            print_body(runner.engine(), "satellite");
        }
    }

    // Pause mid-reentry, save through JSON, then resume in a fresh engine.
    println!("\n--- reentry (saved at step 150) ---\n");
    let mut runner = ScenarioRunner::new(scenario::reentry());
    runner.run_to(150);
    let json = runner.engine().to_json().unwrap();
    println!("  saved state: {} bytes", json.len());

    let mut engine = PhysicsEngine::default();
    engine.from_json(&json).unwrap();
    let mut resumed = ScenarioRunner::resume(scenario::reentry(), engine, 150);
    while !resumed.is_finished() {
        resumed.step_once();
        if resumed.current_step() % 30 == 0 {
            print_body(resumed.engine(), "capsule");
        }
    }

    runner.run();
    let uninterrupted = runner.engine().to_state();
    println!(
        "\n  resumed run matches uninterrupted run: {}",
        uninterrupted == resumed.engine().to_state()
    );

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", resumed.engine().to_json_pretty().unwrap());
}

fn print_body(engine: &PhysicsEngine, label: &str) {
    let Some(state) = engine.find_body(label).and_then(|body| engine.body_state(body)) else {
        println!("  tick {:>4}: {} is gone", engine.tick(), label);
        return;
    };
    let k = state.kinematics;
    println!(
        "  tick {:>4}: {} pos=({:.1}, {:.1}) speed={:.3} r={:.1} heat={:.3e}",
        engine.tick(),
        label,
        k.position.x,
        k.position.y,
        k.speed(),
        k.position.length(),
        state.aero.current_heat_flux
    );
}
