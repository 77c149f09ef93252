//! Benchmarks for the CPU-side particle update.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use firefly::{EmitterConfig, ParticleEngine, Scene, Tween, Vec3};

/// Engine whose pool is full and busy recycling.
fn warmed_engine(config: EmitterConfig) -> ParticleEngine {
    let mut scene = Scene::new();
    let mut engine = ParticleEngine::with_seed(1);
    engine.set_values(config).unwrap();
    engine.initialize(&mut scene).unwrap();
    let lifetime = engine.config().particle_death_age;
    let mut t = 0.0;
    while t < lifetime * 1.5 {
        engine.update(1.0 / 60.0);
        t += 1.0 / 60.0;
    }
    engine
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_update");

    group.bench_function("fireflies", |b| {
        let mut engine = warmed_engine(EmitterConfig::fireflies());
        b.iter(|| engine.update(black_box(1.0 / 60.0)))
    });

    for rate in [1_000.0_f32, 10_000.0, 100_000.0] {
        let config = EmitterConfig {
            particles_per_second: rate,
            particle_death_age: 1.0,
            velocity_spread: Vec3::splat(2.0),
            color_tween: Tween::new(
                vec![0.0, 0.5, 1.0],
                vec![Vec3::new(0.0, 1.0, 0.5), Vec3::new(0.1, 1.0, 0.5), Vec3::new(0.2, 1.0, 0.2)],
            )
            .unwrap(),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("pool", rate as u32), &config, |b, config| {
            let mut engine = warmed_engine(config.clone());
            b.iter(|| engine.update(black_box(1.0 / 60.0)))
        });
    }

    group.finish();
}

fn bench_create_particle(c: &mut Criterion) {
    let mut engine = ParticleEngine::with_seed(2);
    engine.set_values(EmitterConfig::fireflies()).unwrap();
    c.bench_function("create_particle", |b| b.iter(|| black_box(engine.create_particle())));
}

criterion_group!(benches, bench_update, bench_create_particle);
criterion_main!(benches);
