//! Benchmarks for the reconciliation path: attaching components and letting
//! `process_component_changes` settle entities into taxa.
//!
//! Run with: cargo bench --bench reconciliation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use taxon_ecs::component::ComponentKind;
use taxon_ecs::data_pool::DataPool;
use taxon_ecs::filter_pool::FilterPool;
use taxon_ecs::world::{World, WorldConfig};

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

fn bench_initial_reconciliation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciliation");

    for count in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(
            BenchmarkId::new("single_archetype_first_settle", count),
            &count,
            |b, &count| {
                b.iter(|| {
                    let mut world = World::new(WorldConfig::default());
                    let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
                    world.register_pool(pos_id, DataPool::<Position>::new());
                    let _arch = world.add_archetype(&[pos_id], &[]).unwrap();
                    world.initialize().unwrap();

                    for i in 0..count {
                        let e = world.create_entity(false).unwrap();
                        world.attach_data(pos_id, e, Position { x: i as f32, y: 0.0, z: 0.0 });
                    }
                    world.process_component_changes().unwrap();
                    black_box(&world);
                });
            },
        );
    }

    group.finish();
}

fn bench_overlapping_archetypes(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciliation");

    group.bench_function("two_overlapping_archetypes_10k", |b| {
        b.iter(|| {
            let mut world = World::new(WorldConfig::default());
            let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
            let vel_id = world.register_component_type::<Velocity>(ComponentKind::Data);
            world.register_pool(pos_id, DataPool::<Position>::new());
            world.register_pool(vel_id, DataPool::<Velocity>::new());
            let _moving = world.add_archetype(&[pos_id, vel_id], &[]).unwrap();
            let _positioned = world.add_archetype(&[pos_id], &[]).unwrap();
            world.initialize().unwrap();

            for i in 0..5_000 {
                let e = world.create_entity(false).unwrap();
                world.attach_data(pos_id, e, Position { x: i as f32, y: 0.0, z: 0.0 });
                world.attach_data(vel_id, e, Velocity { x: 1.0, y: 0.0, z: 0.0 });
            }
            for i in 0..5_000 {
                let e = world.create_entity(false).unwrap();
                world.attach_data(pos_id, e, Position { x: i as f32, y: 0.0, z: 0.0 });
            }
            world.process_component_changes().unwrap();
            black_box(&world);
        });
    });

    group.finish();
}

fn bench_filter_migration(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciliation");

    group.bench_function("filter_value_change_migrates_1k", |b| {
        b.iter_batched(
            || {
                let mut world = World::new(WorldConfig::default());
                let pos_id = world.register_component_type::<Position>(ComponentKind::Data);
                let team_id = world.register_component_type::<&'static str>(ComponentKind::Filter);
                world.register_pool(pos_id, DataPool::<Position>::new());
                world.register_pool(team_id, FilterPool::<&'static str>::new());
                let _arch = world.add_archetype(&[pos_id], &[team_id]).unwrap();
                world.initialize().unwrap();

                let entities: Vec<_> = (0..1_000)
                    .map(|i| {
                        let e = world.create_entity(false).unwrap();
                        world.attach_data(pos_id, e, Position { x: i as f32, y: 0.0, z: 0.0 });
                        world.attach_filter(team_id, e, "red");
                        e
                    })
                    .collect();
                world.process_component_changes().unwrap();
                (world, entities, team_id)
            },
            |(mut world, entities, team_id)| {
                for e in entities {
                    world.set_filter(team_id, e, "blue");
                }
                world.process_component_changes().unwrap();
                black_box(&world);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_initial_reconciliation,
    bench_overlapping_archetypes,
    bench_filter_migration
);
criterion_main!(benches);
