//! Benchmarks for the PolyBLEP waveform kernel and unison stacks.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::SmallRng, SeedableRng};
use vangelis::dsp::{oscillator::Oscillator, unison::Unison, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let dt = 440.0 / SAMPLE_RATE;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One kernel per waveform; saw and square pay for the PolyBLEP branches
        for waveform in Waveform::ALL {
            let mut osc = Oscillator::default();
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next(black_box(waveform), black_box(dt));
                    }
                })
            });
        }

        // Four detuned saws, the widest unison a voice can run
        let mut unison = Unison::default();
        unison.start(4, 15.0, 0.0, &mut SmallRng::seed_from_u64(1));
        group.bench_with_input(BenchmarkId::new("unison4_saw", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = unison.next(Waveform::Saw, black_box(dt), 0.0);
                }
            })
        });
    }

    group.finish();
}
