//! Benchmarks for geometry image filtering.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gimsmooth::algo::domain_transform::DomainTransform;
use gimsmooth::algo::noise::{add_noise, NoiseOptions};
use gimsmooth::algo::recursive::SweepPlan;
use gimsmooth::gim::{shapes, GeometryImage};
use gimsmooth::prelude::*;

fn noisy_cube(size: usize) -> GeometryImage {
    let cube = shapes::octahedral_cube(size, 1.0);
    add_noise(&cube, &NoiseOptions::default().with_intensity(0.005).with_seed(17))
}

fn bench_filter_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let gim = noisy_cube(129);

    for mode in [FilterMode::Plain, FilterMode::Curvature, FilterMode::Distance] {
        let options = FilterOptions::default()
            .with_mode(mode)
            .with_spatial_factor(8.0)
            .with_iterations(3);
        group.bench_with_input(BenchmarkId::new(format!("{:?}", mode), 129), &options, |b, o| {
            b.iter(|| filter(&gim, o))
        });
    }

    group.finish();
}

fn bench_parallel_vs_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_filter_257");
    let gim = noisy_cube(257);
    let options = FilterOptions::default()
        .with_mode(FilterMode::Plain)
        .with_spatial_factor(8.0);

    group.bench_function("parallel", |b| b.iter(|| filter(&gim, &options)));
    let sequential = options.clone().sequential();
    group.bench_function("sequential", |b| b.iter(|| filter(&gim, &sequential)));

    group.finish();
}

fn bench_domain_transform(c: &mut Criterion) {
    let mut gim = noisy_cube(129);
    gim.update_normals();
    let plan = SweepPlan::new(gim.size());

    c.bench_function("curvature_transform_129", |b| {
        b.iter(|| {
            let normals = gim.normals().unwrap();
            DomainTransform::curvature(&plan, normals).into_weights(8.0, 0.2)
        })
    });

    c.bench_function("update_normals_129", |b| {
        b.iter(|| {
            let mut copy = gim.clone();
            copy.update_normals();
            copy
        })
    });
}

criterion_group!(
    benches,
    bench_filter_modes,
    bench_parallel_vs_sequential,
    bench_domain_transform
);
criterion_main!(benches);
