//! Benchmarks for the whole engine: message draining, mixing, stealing.

use std::{collections::VecDeque, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use vangelis::{
    dsp::Waveform,
    synth::{NoteId, SynthMessage},
    EngineConfig, ParamUpdate, PolySynth, DEFAULT_MAX_VOICES,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn note_on(id: u64) -> SynthMessage {
    SynthMessage::NoteOn {
        id: NoteId(id),
        frequency: 55.0 * (1.0 + (id % 24) as f32 / 6.0),
        waveform: Waveform::Saw,
        velocity: 0.8,
    }
}

fn full_engine() -> PolySynth<VecDeque<SynthMessage>> {
    let mut config = EngineConfig::with_sample_rate(SAMPLE_RATE);
    config.params.merge(
        &ParamUpdate {
            use_filter: Some(true),
            filter_cutoff: Some(3_000.0),
            ..Default::default()
        }
        .with_unison(2, 8.0),
    );

    let queue = (0..DEFAULT_MAX_VOICES as u64).map(note_on).collect();
    PolySynth::new(config, queue).expect("bench config is valid")
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Every voice held, nothing arriving
        let mut synth = full_engine();
        synth.render_block(&mut buffer);
        group.bench_with_input(BenchmarkId::new("full_pool", size), &size, |b, _| {
            b.iter(|| {
                synth.render_block(black_box(&mut buffer));
            })
        });

        // Full pool plus one new note per block, so every block steals
        let mut synth = full_engine();
        synth.render_block(&mut buffer);
        let mut next_id = DEFAULT_MAX_VOICES as u64;
        group.bench_with_input(BenchmarkId::new("steal_per_block", size), &size, |b, _| {
            b.iter(|| {
                synth.apply(note_on(next_id));
                next_id += 1;
                synth.render_block(black_box(&mut buffer));
            })
        });

        // Stereo output, the usual device layout
        let mut synth = full_engine();
        let mut interleaved = vec![0.0f32; size * 2];
        group.bench_with_input(BenchmarkId::new("interleaved_stereo", size), &size, |b, _| {
            b.iter(|| {
                synth.render_interleaved(black_box(&mut interleaved), 2);
            })
        });
    }

    group.finish();
}
