//! Whole-buffer rendering for one-shot playback.
//!
//! This is the simple path: compute a complete waveform up front, bake a
//! linear ADSR into it and hand it to whatever plays buffers. It allocates and
//! knows nothing about voices or the control queue, so it must never run on
//! the audio thread. The realtime engine lives in `synth`.

use std::f32::consts::TAU;

use crate::dsp::oscillator::{sample, wrap_phase, Waveform};

fn sample_count(duration_secs: f32, sample_rate: f32) -> usize {
    if duration_secs.is_finite() && sample_rate.is_finite() && duration_secs > 0.0 {
        (duration_secs * sample_rate) as usize
    } else {
        0
    }
}

/// Render `duration_secs` of a band-limited waveform starting at phase 0.
pub fn generate_waveform(
    waveform: Waveform,
    frequency: f32,
    duration_secs: f32,
    sample_rate: f32,
) -> Vec<f32> {
    generate_waveform_with_phase(waveform, frequency, 0.0, duration_secs, sample_rate)
}

/// Same as [`generate_waveform`] with a start phase in radians.
pub fn generate_waveform_with_phase(
    waveform: Waveform,
    frequency: f32,
    phase_offset: f32,
    duration_secs: f32,
    sample_rate: f32,
) -> Vec<f32> {
    let dt = frequency / sample_rate;
    let start = phase_offset / TAU;

    (0..sample_count(duration_secs, sample_rate))
        .map(|n| {
            // Phase from the sample index, not an accumulator, so long
            // buffers do not drift.
            let t = n as f32 / sample_rate;
            let phase = wrap_phase(frequency * t + start);
            sample(waveform, phase, dt)
        })
        .collect()
}

/// Two-operator sine FM: `sin(2π·fc·t + index · sin(2π·fm·t))`.
pub fn fm_waveform(
    carrier_freq: f32,
    modulator_freq: f32,
    modulation_index: f32,
    duration_secs: f32,
    sample_rate: f32,
) -> Vec<f32> {
    (0..sample_count(duration_secs, sample_rate))
        .map(|n| {
            let t = n as f32 / sample_rate;
            let modulator = modulation_index * (TAU * modulator_freq * t).sin();
            (TAU * carrier_freq * t + modulator).sin()
        })
        .collect()
}

/// Linear ADSR shape for baked buffers. Times in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Default for Adsr {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.2,
        }
    }
}

/// Multiply `samples` by a linear ADSR spanning the whole buffer.
///
/// The release occupies the last `release` seconds; sustain fills whatever is
/// left between decay and release.
pub fn apply_adsr(samples: &mut [f32], adsr: &Adsr, sample_rate: f32) {
    let to_samples = |secs: f32| (secs.max(0.0) * sample_rate) as usize;
    let attack = to_samples(adsr.attack);
    let decay = to_samples(adsr.decay);
    let release = to_samples(adsr.release);
    let sustain_level = adsr.sustain.clamp(0.0, 1.0);
    let sustain = samples.len().saturating_sub(attack + decay + release);

    let decay_end = attack + decay;
    let sustain_end = decay_end + sustain;

    for (i, sample) in samples.iter_mut().enumerate() {
        let gain = if i < attack {
            i as f32 / attack.max(1) as f32
        } else if i < decay_end {
            1.0 - (1.0 - sustain_level) * (i - attack) as f32 / decay.max(1) as f32
        } else if i < sustain_end {
            sustain_level
        } else {
            sustain_level * (1.0 - (i - sustain_end) as f32 / release.max(1) as f32)
        };
        *sample *= gain.clamp(0.0, 1.0);
    }
}

/// Equal-power pan: 0 = hard left, 0.5 = center, 1 = hard right.
pub fn pan_stereo(mono: &[f32], pan: f32) -> (Vec<f32>, Vec<f32>) {
    let pan = if pan.is_finite() { pan.clamp(0.0, 1.0) } else { 0.5 };
    let left_gain = (1.0 - pan).sqrt();
    let right_gain = pan.sqrt();

    mono.iter()
        .map(|&s| (s * left_gain, s * right_gain))
        .unzip()
}
