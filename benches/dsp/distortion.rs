//! Benchmarks for the output soft clipper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vangelis::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values, driven past the rails)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 * 0.1).sin() * 3.0)
            .collect();

        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("soft_clip", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                distortion::soft_clip_buffer(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
