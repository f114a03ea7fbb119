//! Performance benchmarks for the lattice engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use petri::{Config, Lattice, SizeSpec};

fn benchmark_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");

    for size in [50, 100, 200].iter() {
        let mut config = Config::default();
        config.grid.size = SizeSpec::Square(*size);
        config.grid.density = 0.8;
        config.rule.slider = 0.3;

        let mut lattice = Lattice::new_with_seed(&config, 42).unwrap();

        // Warm up
        lattice.evolve(1000);

        group.bench_with_input(BenchmarkId::new("size", size), size, |b, _| {
            b.iter(|| {
                lattice.evolve(black_box(100));
            });
        });
    }

    group.finish();
}

fn benchmark_free_color_construction(c: &mut Criterion) {
    let mut config = Config::default();
    config.grid.size = SizeSpec::Square(100);
    config.rule.only_red_blue = false;
    config.grid.density = 0.8;

    c.bench_function("free_color_init", |b| {
        b.iter(|| Lattice::new_with_seed(black_box(&config), 42).unwrap());
    });
}

fn benchmark_snapshot(c: &mut Criterion) {
    let mut config = Config::default();
    config.grid.size = SizeSpec::Square(200);

    let lattice = Lattice::new_with_seed(&config, 42).unwrap();

    c.bench_function("snapshot_copy_out", |b| {
        b.iter(|| black_box(lattice.snapshot()));
    });
}

criterion_group!(
    benches,
    benchmark_evolve,
    benchmark_free_color_construction,
    benchmark_snapshot,
);

criterion_main!(benches);
