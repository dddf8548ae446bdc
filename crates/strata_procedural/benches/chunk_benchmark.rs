//! Benchmark for chunk generation performance.
//!
//! Run with: cargo bench --package strata_procedural --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{
    create_generator, generate_batch, ChunkCoord, GeneratorKind, NoopProgress, TerrainConfig, TerrainGenerator,
    WorldSeed,
};

fn generator(kind: GeneratorKind) -> Box<dyn TerrainGenerator> {
    let config = TerrainConfig {
        generator: kind,
        ..TerrainConfig::default()
    };
    match create_generator(WorldSeed::new(42), &config) {
        Ok(generator) => generator,
        Err(e) => panic!("default config rejected: {e}"),
    }
}

fn benchmark_single_chunk(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_chunk");
    for kind in [GeneratorKind::Spline, GeneratorKind::HybridSdf] {
        let gen = generator(kind);
        group.bench_function(format!("{kind:?}"), |b| {
            let mut coord = 0i32;
            b.iter(|| {
                coord = coord.wrapping_add(1);
                black_box(gen.generate_chunk(ChunkCoord::new(coord, coord / 2)))
            });
        });
    }
    group.finish();
}

fn benchmark_point_queries(c: &mut Criterion) {
    let gen = generator(GeneratorKind::HybridSdf);

    c.bench_function("height_at", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(7);
            black_box(gen.height_at(black_box(x), black_box(x / 3)))
        });
    });
}

fn benchmark_batch(c: &mut Criterion) {
    let gen = generator(GeneratorKind::HybridSdf);
    let coords: Vec<ChunkCoord> = (0..8)
        .flat_map(|z| (0..8).map(move |x| ChunkCoord::new(x, z)))
        .collect();

    let mut group = c.benchmark_group("chunk_grid");
    group.sample_size(10);
    group.throughput(Throughput::Elements(coords.len() as u64));

    group.bench_function("8x8_sequential", |b| {
        b.iter(|| {
            for &coord in &coords {
                black_box(gen.generate_chunk(coord));
            }
        });
    });

    let workers = std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
    group.bench_function("8x8_batch", |b| {
        b.iter(|| black_box(generate_batch(gen.as_ref(), &coords, workers, &NoopProgress)));
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_chunk, benchmark_point_queries, benchmark_batch);
criterion_main!(benches);
