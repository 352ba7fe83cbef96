//! Unison: several detuned copies of one oscillator per note.
//!
//! Stacking slightly detuned oscillators makes them drift in and out of phase
//! against each other, which the ear hears as width and movement (the
//! "supersaw" sound). Each sub-oscillator keeps its own phase; the detune
//! spread is symmetric around the center pitch:
//!
//!   offset_i = (i - (count - 1) / 2) · detune        (cents)
//!   ratio_i  = 2^(offset_i / 1200)
//!
//!   count = 3, detune = 10  →  -10, 0, +10 cents
//!   count = 4, detune = 10  →  -15, -5, +5, +15 cents
//!
//! If every copy started at the same phase they would sum into one loud
//! click-like transient on every note. Start phases are fanned out by 8% of a
//! cycle across the stack plus up to 1% of random jitter, drawn once per note
//! from the engine's seeded generator.
//!
//! The output is the mean of the active copies so loudness does not grow with
//! the voice count.

use rand::Rng;

use crate::dsp::oscillator::{sample, wrap_phase, Waveform};

pub const MAX_UNISON: usize = 4;
pub const MAX_DETUNE_CENTS: f32 = 50.0;
const PHASE_SPREAD: f32 = 0.08;
const PHASE_JITTER: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct Unison {
    count: usize,
    phases: [f32; MAX_UNISON],
    ratios: [f32; MAX_UNISON],
}

impl Default for Unison {
    fn default() -> Self {
        Self {
            count: 1,
            phases: [0.0; MAX_UNISON],
            ratios: [1.0; MAX_UNISON],
        }
    }
}

impl Unison {
    /// Lay out phases and detune ratios for a new note.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        detune_cents: f32,
        base_phase: f32,
        rng: &mut R,
    ) {
        self.count = count.clamp(1, MAX_UNISON);
        let detune = if detune_cents.is_finite() {
            detune_cents.clamp(0.0, MAX_DETUNE_CENTS)
        } else {
            0.0
        };
        let spread = self.count > 1;
        let center = (self.count - 1) as f32 / 2.0;

        for i in 0..MAX_UNISON {
            let offset = if spread {
                (i as f32 / self.count as f32) * PHASE_SPREAD + rng.gen_range(0.0..PHASE_JITTER)
            } else {
                0.0
            };
            self.phases[i] = wrap_phase(base_phase + offset);

            let cents = (i as f32 - center) * detune;
            self.ratios[i] = if cents == 0.0 {
                1.0
            } else {
                2.0f32.powf(cents / 1200.0)
            };
        }
    }

    /// Mean of all active copies at base phase increment `dt`, with an extra
    /// phase offset (FM) applied to every copy.
    #[inline]
    pub fn next(&mut self, waveform: Waveform, dt: f32, phase_offset: f32) -> f32 {
        let mut sum = 0.0;
        for i in 0..self.count {
            let dt_i = dt * self.ratios[i];
            let phase = self.phases[i];
            let modulated = if phase_offset == 0.0 {
                phase
            } else {
                wrap_phase(phase + phase_offset)
            };
            sum += sample(waveform, modulated, dt_i);
            self.phases[i] = wrap_phase(phase + dt_i);
        }
        sum / self.count as f32
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases[..self.count]
    }

    pub fn ratios(&self) -> &[f32] {
        &self.ratios[..self.count]
    }
}
