//! Performance benchmarks for PETRI

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::Vec2;
use petri::{Cell, CellKind, Config, Organism, World, WorldSnapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DT: f32 = 1.0 / 60.0;

fn benchmark_world_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("world_update");

    for population in [100usize, 500, 1000].iter() {
        let cells = *population;
        let mut config = Config::default();
        config.world.initial_wandering = cells * 5 / 10;
        config.world.initial_photosynthetic = cells * 3 / 10;
        config.world.initial_predators =
            cells - config.world.initial_wandering - config.world.initial_photosynthetic;

        let mut world = World::new_with_seed(config, 42);

        // Warm up
        world.run(10, DT);

        group.bench_with_input(BenchmarkId::new("cells", cells), population, |b, _| {
            b.iter(|| {
                world.update(DT);
            });
        });
    }

    group.finish();
}

fn benchmark_organism_update(c: &mut Criterion) {
    // A 32-member chain exercises the spring pass.
    let mut organism = Organism::from_pair(
        Cell::new(CellKind::Wandering, Vec2::new(100.0, 100.0)),
        Cell::new(CellKind::Wandering, Vec2::new(116.0, 100.0)),
    );
    for i in 2..32 {
        organism.attach(Cell::new(
            CellKind::Wandering,
            Vec2::new(100.0 + i as f32 * 16.0, 100.0),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let bounds = Vec2::new(2000.0, 2000.0);

    c.bench_function("organism_update_32_members", |b| {
        b.iter(|| {
            let mut events = Vec::new();
            // Zero dt keeps the workload identical across iterations.
            organism.update(0.0, 0, &[], &[], bounds, &mut events, &mut rng);
            black_box(&organism);
        });
    });
}

fn benchmark_collision_pass(c: &mut Criterion) {
    // 200 cells over a small field, so overlaps are common.
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut template = Vec::new();
    for i in 0..200 {
        let kind = match i % 3 {
            0 => CellKind::Wandering,
            1 => CellKind::Photosynthetic,
            _ => CellKind::Predator,
        };
        template.push(Cell::new(
            kind,
            Vec2::new(rng.gen::<f32>() * 400.0, rng.gen::<f32>() * 300.0),
        ));
    }

    c.bench_function("collision_resolve_200_cells", |b| {
        b.iter_batched(
            || (template.clone(), Vec::new(), Vec::new()),
            |(mut cells, mut organisms, mut particles)| {
                petri::collision::resolve(&mut cells, &mut organisms, &mut particles, 0.1, &mut rng);
                black_box(cells.len())
            },
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut config = Config::default();
    config.world.initial_wandering = 250;
    config.world.initial_photosynthetic = 150;
    config.world.initial_predators = 100;

    let mut world = World::new_with_seed(config, 42);
    world.run(100, DT);

    c.bench_function("snapshot_build", |b| {
        b.iter(|| WorldSnapshot::from_world(black_box(&world)));
    });

    let snapshot = WorldSnapshot::from_world(&world);

    c.bench_function("snapshot_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&snapshot)).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_world_update,
    benchmark_organism_update,
    benchmark_collision_pass,
    benchmark_snapshot,
);

criterion_main!(benches);
