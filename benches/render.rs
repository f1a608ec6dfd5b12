#[macro_use]
extern crate criterion;
extern crate juliaset;
extern crate num_cpus;

use criterion::{black_box, Criterion};
use juliaset::Renderer;

fn render_single(c: &mut Criterion) {
    let renderer = Renderer::new(160, 1).unwrap();
    c.bench_function("render 320x160 single", move |b| {
        b.iter(|| renderer.render_single(black_box(0.5)))
    });
}

fn render_threaded(c: &mut Criterion) {
    let renderer = Renderer::new(160, num_cpus::get()).unwrap();
    c.bench_function("render 320x160 threaded", move |b| {
        b.iter(|| renderer.render(black_box(0.5)))
    });
}

criterion_group!(benches, render_single, render_threaded);
criterion_main!(benches);
