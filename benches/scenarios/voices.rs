//! Benchmarks for complete voices.
//!
//! Each patch is one `Voice` held in sustain, from a bare oscillator up to
//! everything switched on at once.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use rand::{rngs::SmallRng, SeedableRng};
use vangelis::{
    dsp::{FilterMode, LfoTarget, Waveform},
    synth::{NoteId, NoteStart, SynthParams, Voice},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn held_voice(waveform: Waveform, params: &SynthParams) -> Voice {
    let mut voice = Voice::new(SAMPLE_RATE);
    let note = NoteStart {
        id: NoteId(0),
        frequency: 110.0, // A2, typical bass note
        waveform,
        velocity: 1.0,
    };
    voice.start(note, params, 0, &mut SmallRng::seed_from_u64(0));
    voice
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    let patches = [
        // Baseline: oscillator and envelope only
        ("sine_plain", Waveform::Sine, SynthParams::default()),
        // lead-style: sawtooth → envelope → filter
        (
            "saw_lowpass",
            Waveform::Saw,
            SynthParams {
                use_filter: true,
                filter_cutoff: 2_500.0,
                ..Default::default()
            },
        ),
        // acid-style: resonant filter swept by the LFO
        (
            "acid_lfo_cutoff",
            Waveform::Saw,
            SynthParams {
                use_filter: true,
                filter_cutoff: 400.0,
                filter_resonance: 6.0,
                lfo_rate: 2.0,
                lfo_depth: 1.0,
                lfo_target: LfoTarget::FilterCutoff,
                ..Default::default()
            },
        ),
        // FM bell: sine carrier, phase-modulated
        (
            "fm_bell",
            Waveform::Sine,
            SynthParams {
                use_fm: true,
                fm_ratio: 3.5,
                fm_index: 8.0,
                ..Default::default()
            },
        ),
        // Worst case: 4x unison, FM, band-pass filter and vibrato
        (
            "everything",
            Waveform::Square,
            SynthParams {
                use_fm: true,
                use_filter: true,
                filter_mode: FilterMode::BandPass,
                lfo_rate: 5.0,
                lfo_depth: 0.3,
                lfo_target: LfoTarget::Pitch,
                unison_voices: 4,
                unison_detune: 20.0,
                ..Default::default()
            },
        ),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform, params) in &patches {
            let mut voice = held_voice(*waveform, params);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    voice.render_add(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
