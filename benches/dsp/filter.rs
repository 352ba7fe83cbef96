//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use vangelis::dsp::filter::{FilterMode, SvFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, mode) in [
            ("lowpass", FilterMode::LowPass),
            ("highpass", FilterMode::HighPass),
            ("bandpass", FilterMode::BandPass),
            ("notch", FilterMode::Notch),
        ] {
            let mut filter = SvFilter::lowpass(SAMPLE_RATE, 1000.0);
            filter.set_mode(mode);
            filter.set_resonance(0.5);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }

        // Cutoff gliding every sample, the cost of a live filter sweep
        let mut filter = SvFilter::lowpass(SAMPLE_RATE, 200.0);
        let mut buffer = input.clone();
        let mut up = true;
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| {
                filter.set_cutoff(if up { 8_000.0 } else { 200.0 });
                up = !up;
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = filter.next_sample(*sample, black_box(1.1));
                }
            })
        });
    }

    group.finish();
}
