//! Benchmarks for the fixed-step tick and the blast pass.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use september_core::prelude::*;

fn town() -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let placements: Vec<Placement> = (0..12)
        .flat_map(|row| {
            (0..12).map(move |col| Placement::new((row + col) % 13, 20 + col * 7, 20 + row * 7))
        })
        .collect();
    engine.place_buildings(&placements);
    engine.populate();
    engine
}

fn bench_step(c: &mut Criterion) {
    let mut engine = town();
    c.bench_function("fixed_step_100_pedestrians", |b| {
        b.iter(|| {
            engine.step();
            black_box(engine.tick())
        });
    });
}

fn bench_blast(c: &mut Criterion) {
    let engine = town();
    c.bench_function("blast_pass", |b| {
        b.iter_batched(
            || engine.buildings.clone(),
            |mut buildings| {
                let center = TilePos::new(55, 55);
                let low = buildings.explode(&engine.map, black_box(center));
                let tall = buildings.explode_tall(&engine.map, black_box(center));
                black_box((low, tall))
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_frame(c: &mut Criterion) {
    let engine = town();
    let atlas = StaticAtlas::with_defaults(engine.map.projection());
    c.bench_function("render_frame", |b| {
        b.iter(|| black_box(engine.frame(&atlas)));
    });
}

criterion_group!(benches, bench_step, bench_blast, bench_frame);
criterion_main!(benches);
