//! Simulation benchmarks for salvo_core.
//!
//! Run with: `cargo bench -p salvo_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use glam::{Vec2, Vec3};
use salvo_core::collision::{bullets_vs_targets, enemy_vs_enemy, CollisionReport};
use salvo_core::prelude::*;
use salvo_core::projectile::ShotParams;

const DT: f32 = 1.0 / 60.0;

fn started(seed: u64) -> Simulation {
    let mut sim = Simulation::new(SimulationConfig::default().with_seed(seed)).unwrap();
    sim.tick(DT, &InputFrame::start());
    sim
}

/// Full ticks of a standard session with the trigger held.
pub fn tick_benchmark(c: &mut Criterion) {
    let input = InputFrame::default()
        .with_movement(Vec2::new(1.0, 0.2))
        .with_aim(Vec2::new(0.2, 0.1))
        .with_primary(true);

    c.bench_function("tick_standard_60", |b| {
        b.iter_batched(
            || started(42),
            |mut sim| {
                for _ in 0..60 {
                    black_box(sim.tick(DT, &input));
                }
                sim
            },
            BatchSize::SmallInput,
        );
    });
}

/// Collision passes over a crowded arena.
pub fn collision_benchmark(c: &mut Criterion) {
    let tuning = TuningConfig::default();
    let assets = AssetTable::default();
    let mut enemies = Registry::new();
    for i in 0..200 {
        let x = (i % 20) as f32 * 2.0;
        let y = (i / 20) as f32 * 2.0;
        enemies.insert(Enemy::spawn(EnemyKind::Ranged, Vec3::new(x, y, 0.0), 0.0, &tuning, &assets));
    }
    let bullets: Vec<Bullet> = (0..100)
        .map(|i| {
            Bullet::launch(
                BulletKind::Normal,
                &tuning.bullets.normal,
                ShotParams {
                    origin: Vec3::new(-5.0, i as f32 * 0.2, 0.0),
                    direction: Vec3::X,
                    shooter: Shooter::Player,
                    scale: None,
                },
                AssetHandle::default(),
                AssetHandle::default(),
            )
        })
        .collect();

    c.bench_function("enemy_pairs_200", |b| {
        b.iter_batched(
            || enemies.clone(),
            |mut enemies| enemy_vs_enemy(&mut enemies, &tuning),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("bullets_100_vs_200", |b| {
        b.iter_batched(
            || {
                (
                    enemies.clone(),
                    bullets.clone(),
                    Player::spawn(Vec3::new(0.0, 100.0, 0.0), &tuning, &assets),
                )
            },
            |(mut enemies, mut bullets, mut player)| {
                let mut report = CollisionReport::default();
                bullets_vs_targets(&mut bullets, &mut player, &mut enemies, DT, &tuning, &mut report);
                report
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, tick_benchmark, collision_benchmark);
criterion_main!(benches);
