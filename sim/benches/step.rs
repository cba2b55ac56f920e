//! Stepping throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec2;
use orbit_sim::{Atmosphere, BodyOptions, CelestialSource, PhysicsEngine};

fn populated_engine(bodies: usize) -> PhysicsEngine {
    let mut engine = PhysicsEngine::default();
    engine.init(vec![
        CelestialSource::new("planet", 1.0e9, DVec2::ZERO, 1.0e5)
            .with_radius(600.0)
            .with_atmosphere(Atmosphere {
                limit_altitude: 150.0,
                surface_density: 1.2e-3,
                scale_height: 40.0,
            }),
        CelestialSource::new("moon", 1.0e7, DVec2::new(3000.0, 0.0), 2.0e3).with_radius(100.0),
    ]);

    let options = BodyOptions::default().with_aero(Some(0.5), Some(2.0));
    for i in 0..bodies {
        let angle = i as f64 * 0.37;
        let radius = 700.0 + (i % 50) as f64 * 10.0;
        let (sin, cos) = angle.sin_cos();
        let body = if i % 10 == 0 {
            engine.create_rocket(radius * cos, radius * sin, &options)
        } else {
            engine.create_circle(radius * cos, radius * sin, 4.0, &options)
        };
        engine.set_velocity(body, DVec2::new(-sin, cos) * 3.0).unwrap();
    }
    engine
}

fn bench_fixed_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_step");
    for bodies in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(bodies), &bodies, |b, &bodies| {
            let mut engine = populated_engine(bodies);
            b.iter(|| engine.fixed_step(black_box(16.67)));
        });
    }
    group.finish();
}

fn bench_state_roundtrip(c: &mut Criterion) {
    let mut engine = populated_engine(200);
    engine.fixed_step(16.67 * 30.0);
    let json = engine.to_json().unwrap();

    c.bench_function("to_json_200", |b| b.iter(|| engine.to_json().unwrap()));
    c.bench_function("from_json_200", |b| {
        let mut target = PhysicsEngine::default();
        b.iter(|| target.from_json(black_box(&json)).unwrap());
    });
}

criterion_group!(benches, bench_fixed_step, bench_state_roundtrip);
criterion_main!(benches);
