use super::{default_buffers, HEIGHT, WIDTH};
use criterion::{criterion_group, Criterion};
use umbra::config::KernelConfig;
use umbra::display::PixelBuffer;
use umbra::render::LightField;

fn bench_full_frame(c: &mut Criterion) {
    let (sources, obstacles) = default_buffers();
    let mut field = LightField::new(WIDTH, HEIGHT, KernelConfig::default(), 0).unwrap();
    c.bench_function("full_frame_320x240", |b| {
        b.iter(|| {
            // Same inputs every time, so force the dispatch
            field.invalidate();
            field.render(&sources, &obstacles, 0).unwrap()
        })
    });
}

fn bench_tone_map(c: &mut Criterion) {
    let (sources, obstacles) = default_buffers();
    let mut field = LightField::new(WIDTH, HEIGHT, KernelConfig::default(), 0).unwrap();
    field.render(&sources, &obstacles, 0).unwrap();
    let mut buffer = PixelBuffer::with_size(WIDTH, HEIGHT);
    c.bench_function("tone_map_320x240", |b| b.iter(|| field.tone_map(&mut buffer)));
}

criterion_group!(benches, bench_full_frame, bench_tone_map);
