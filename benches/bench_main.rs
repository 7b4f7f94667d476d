use criterion::criterion_main;

mod lighting;

criterion_main! {
    lighting::kernel::benches,
    lighting::frame::benches,
}
