use super::default_buffers;
use criterion::{black_box, criterion_group, Criterion};
use umbra::config::KernelConfig;
use umbra::lighting::shade;

fn bench_shade_pixel(c: &mut Criterion) {
    let (sources, obstacles) = default_buffers();
    let config = KernelConfig::default();
    c.bench_function("shade_pixel", |b| {
        b.iter(|| shade(black_box(100.0), black_box(150.0), &sources, &obstacles, &config))
    });
}

fn bench_shade_pixel_unpruned(c: &mut Criterion) {
    let (sources, obstacles) = default_buffers();
    let config = KernelConfig {
        pruning: false,
        ..KernelConfig::default()
    };
    c.bench_function("shade_pixel_unpruned", |b| {
        b.iter(|| shade(black_box(100.0), black_box(150.0), &sources, &obstacles, &config))
    });
}

criterion_group!(benches, bench_shade_pixel, bench_shade_pixel_unpruned);
