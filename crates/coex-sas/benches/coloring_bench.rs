//! Benchmarks for partitioning and coloring
//!
//! Run with: cargo bench -p coex-sas

use coex_ir::{Category, Coordination, Device, DeviceRegistry, EdgeKey, EdgeWeightTable, Location};
use coex_sas::{ColoringConfig, ColoringEngine, estimate_all, partition};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// Devices on a square lattice, each linked to its lattice neighbors and
/// diagonals with weights that fall off along the row.
fn lattice(side: usize) -> (DeviceRegistry, EdgeWeightTable) {
    let n = side * side;
    let registry = DeviceRegistry::from_devices((0..n).map(|i| {
        Device::new(i, Location::new(36.8, -76.0), 6.0, Category::A, 26.0)
            .with_coex_group((i % 3) as u32)
    }))
    .unwrap();

    let mut table = EdgeWeightTable::new("bench", Coordination::Point);
    for row in 0..side {
        for col in 0..side {
            let i = row * side + col;
            let weight = 0.15 + 0.8 * (col as f64 / side as f64);
            let mut link = |j: usize| {
                table
                    .insert(EdgeKey::new(i.into(), j.into()).unwrap(), weight)
                    .unwrap();
            };
            if col + 1 < side {
                link(i + 1);
            }
            if row + 1 < side {
                link(i + side);
            }
            if col + 1 < side && row + 1 < side {
                link(i + side + 1);
            }
        }
    }
    (registry, table)
}

/// Benchmark BFS partitioning
fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for side in &[10, 20, 40] {
        let (registry, table) = lattice(*side);
        let ids = registry.ids();
        group.bench_with_input(BenchmarkId::new("lattice", side * side), side, |b, _| {
            b.iter(|| partition(black_box(&ids), black_box(&table), black_box(0.5)));
        });
    }

    group.finish();
}

/// Benchmark coloring with threshold escalation
fn bench_color_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("color_all");
    let engine = ColoringEngine::new(ColoringConfig {
        max_colors: 4,
        ..ColoringConfig::default()
    })
    .unwrap();

    for side in &[10, 20, 40] {
        let (registry, table) = lattice(*side);
        let ids = registry.ids();
        group.bench_with_input(BenchmarkId::new("lattice", side * side), side, |b, _| {
            b.iter(|| engine.color_all(black_box(&ids), &registry, &table).unwrap());
        });
    }

    group.finish();
}

/// Benchmark Approach-3 cluster estimates
fn bench_approach3(c: &mut Criterion) {
    let mut group = c.benchmark_group("approach3");

    for side in &[10, 20, 40] {
        let (registry, table) = lattice(*side);
        group.bench_with_input(BenchmarkId::new("lattice", side * side), side, |b, _| {
            b.iter(|| estimate_all(&registry, black_box(&table), black_box(0.5)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_partition, bench_color_all, bench_approach3);
criterion_main!(benches);
