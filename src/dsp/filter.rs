use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::smooth::OnePole;

/*
| mode      | output            | passes        | rejects      |
| --------- | ----------------- | ------------- | ------------ |
| low-pass  | lp                | below cutoff  | above cutoff |
| high-pass | input - k·bp - lp | above cutoff  | below cutoff |
| band-pass | bp                | around cutoff | outside      |
| notch     | input - k·bp      | outside       | around       |

State-variable filter. Two integrators hold all of the state; every response
is a different tap of the same recurrence, so switching mode never changes
the topology or resets anything.

Why not the textbook Chamberlin form?
-------------------------------------

The Chamberlin SVF (f = 2·sin(π·fc/sr), lp += f·bp, hp = x - lp - q·bp,
bp += f·hp) is only stable while f² + 2·f·q < 4. With resonance 0.7 that
caps the usable cutoff near sr/12, and an 18 kHz cutoff blows up to
infinity within a few hundred samples.

The topology-preserving transform (TPT) version integrates with the
trapezoidal rule instead. Same two integrators, same outputs, stable for
every cutoff below Nyquist:

    g  = tan(π · cutoff / sample_rate)        (prewarped integrator gain)
    k  = 1 / resonance                        (damping)
    h  = 1 / (1 + g·(g + k))

    v3 = input - ic2
    v1 = h · (ic1 + g·v3)                     band-pass
    v2 = ic2 + g·v1                           low-pass
    ic1 = 2·v1 - ic1
    ic2 = 2·v2 - ic2

Resonance is a Q factor: 0.7 is close to Butterworth (flat passband), 10 is
a sharp peak. Cutoff is clamped to [20 Hz, 0.45 · sample_rate] and resonance
to [0.1, 10], so `g` and `k` are always finite and positive.

Cutoff changes are glided with a 10 ms one-pole so sweeps do not zipper.
*/

pub const MIN_CUTOFF: f32 = 20.0;
pub const MIN_RESONANCE: f32 = 0.1;
pub const MAX_RESONANCE: f32 = 10.0;
const CUTOFF_SMOOTHING_SECS: f32 = 0.01;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterMode {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(FilterMode::LowPass),
            1 => Some(FilterMode::HighPass),
            2 => Some(FilterMode::BandPass),
            3 => Some(FilterMode::Notch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SvFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    sample_rate: f32,
    cutoff: OnePole,
    resonance: f32,
    mode: FilterMode,
}

impl SvFilter {
    pub fn new(sample_rate: f32) -> Self {
        let cutoff = 18_000.0f32.min(sample_rate * 0.45);
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            sample_rate,
            cutoff: OnePole::new(cutoff, CUTOFF_SMOOTHING_SECS, sample_rate),
            resonance: 0.7,
            mode: FilterMode::LowPass,
        }
    }

    pub fn lowpass(sample_rate: f32, cutoff: f32) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.set_cutoff(cutoff);
        filter.snap_cutoff();
        filter
    }

    fn max_cutoff(&self) -> f32 {
        self.sample_rate * 0.45
    }

    fn clamp_cutoff(&self, cutoff: f32) -> f32 {
        cutoff.clamp(MIN_CUTOFF, self.max_cutoff())
    }

    /// Set the cutoff the smoother glides towards.
    pub fn set_cutoff(&mut self, cutoff: f32) {
        if cutoff.is_finite() {
            self.cutoff.set_target(self.clamp_cutoff(cutoff));
        }
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        if resonance.is_finite() {
            self.resonance = resonance.clamp(MIN_RESONANCE, MAX_RESONANCE);
        }
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Jump the smoothed cutoff to its target. Used when a note starts.
    pub fn snap_cutoff(&mut self) {
        self.cutoff.snap();
    }

    /// Filter one sample.
    ///
    /// `cutoff_scale` multiplies the smoothed cutoff for this sample only;
    /// pass 1.0 for no modulation.
    #[inline]
    pub fn next_sample(&mut self, input: f32, cutoff_scale: f32) -> f32 {
        let smoothed = self.cutoff.next();
        let cutoff = if cutoff_scale == 1.0 {
            smoothed
        } else {
            self.clamp_cutoff(smoothed * cutoff_scale)
        };

        let g = (PI * cutoff / self.sample_rate).tan();
        let k = 1.0 / self.resonance;
        let h = 1.0 / (1.0 + g * (g + k));

        let v3 = input - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        match self.mode {
            FilterMode::LowPass => v2,
            FilterMode::HighPass => input - k * v1 - v2,
            FilterMode::BandPass => v1,
            FilterMode::Notch => input - k * v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, 1.0);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// Cutoff actually used on the last sample (before any modulation).
    pub fn cutoff(&self) -> f32 {
        self.cutoff.value()
    }

    pub fn target_cutoff(&self) -> f32 {
        self.cutoff.target()
    }

    /// Largest change the smoother can make in one sample for the current gap.
    pub fn max_cutoff_step(&self) -> f32 {
        (self.cutoff.target() - self.cutoff.value()).abs() * (1.0 - self.cutoff.coeff())
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }
}
