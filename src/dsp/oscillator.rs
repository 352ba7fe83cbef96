use std::f32::consts::TAU;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseWaveformError;

/*
Band-Limited Oscillators
========================

Every voice in the engine is built on the same tiny kernel: given a waveform,
a phase in [0, 1) and a phase increment, produce one sample in [-1, 1].

Vocabulary
----------

  phase       Position inside one cycle, normalized to [0, 1).
              0.0 = start of the cycle, 0.5 = halfway, wraps back to 0.0.

  dt          Phase increment per sample: frequency / sample_rate.
              A 441 Hz tone at 44.1 kHz has dt = 0.01 (100 samples/cycle).

  Nyquist     Half the sample rate. Anything above it cannot be represented
              and folds back down as an inharmonic "alias".


Why Naive Saw and Square Alias
------------------------------

A sawtooth computed as `2 * phase - 1` jumps from +1 to -1 in a single
sample. That step contains energy at every harmonic, far beyond Nyquist.
Sampling it folds those harmonics back into the audible band:

    naive saw at 3 kHz, 44.1 kHz sample rate

    magnitude
      │ █
      │ █   █
      │ █   █  ▄  █  ▄ ▂ ▄ ▂ ▂  ← aliases between the real harmonics
      └──────────────────────────→ frequency

Oversampling fixes this but costs a multiple of the CPU budget.


PolyBLEP
--------

A band-limited step is a smoothed version of the ideal step. PolyBLEP
approximates the difference between the two with a 2-sample polynomial and
subtracts it around every discontinuity:

    t < dt         (just after the jump)    x = t / dt
                   correction = 2x - x² - 1

    t > 1 - dt     (just before the jump)   x = (t - 1) / dt
                   correction = x² + 2x + 1

    elsewhere      correction = 0

Saw has one discontinuity (at phase 0). Square has two: the rising edge at
phase 0 and the falling edge at phase 0.5, so the correction is applied to
`phase` and to `(phase + 0.5) mod 1`.

Sine and triangle are continuous and need no correction. Triangle's kinks
still produce harmonics, but they fall off as 1/n² and stay well below the
audible aliasing floor.


Phase Modulation (FM)
---------------------

FM in this engine is phase modulation: a sine modulator's output, scaled by
the modulation index, is added to the carrier's phase before lookup. The
index is specified in radians and converted to cycles (÷ 2π) because our
phase is normalized. The sum can be negative, so it is wrapped with
`wrap_phase` rather than a plain `%`.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];

    /// Numeric ids used by control surfaces: 0 sine, 1 saw, 2 square, 3 triangle.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Waveform::Sine),
            1 => Some(Waveform::Saw),
            2 => Some(Waveform::Square),
            3 => Some(Waveform::Triangle),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }
}

impl FromStr for Waveform {
    type Err = ParseWaveformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "saw" | "sawtooth" => Ok(Waveform::Saw),
            "square" => Ok(Waveform::Square),
            "triangle" => Ok(Waveform::Triangle),
            _ => {
                log::debug!("rejecting waveform name {s:?}");
                Err(ParseWaveformError(s.to_string()))
            }
        }
    }
}

/// PolyBLEP residual for a unit step located at phase 0.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}

/// One sample of `waveform` at `phase`, anti-aliased for a phase step of `dt`.
#[inline]
pub fn sample(waveform: Waveform, phase: f32, dt: f32) -> f32 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Saw => 2.0 * phase - 1.0 - poly_blep(phase, dt),
        Waveform::Square => {
            let naive = if phase < 0.5 { 1.0 } else { -1.0 };
            naive + poly_blep(phase, dt) - poly_blep(wrap_phase(phase + 0.5), dt)
        }
        Waveform::Triangle => 2.0 * (2.0 * phase - 1.0).abs() - 1.0,
    }
}

/// Wrap any finite phase into [0, 1).
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let wrapped = phase - phase.floor();
    // `floor` of a tiny negative value can round the result up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Free-running phase accumulator driving the kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Oscillator {
    phase: f32,
}

impl Oscillator {
    pub fn new(phase: f32) -> Self {
        Self {
            phase: wrap_phase(phase),
        }
    }

    /// Returns the sample at the current phase, then advances by `dt`.
    #[inline]
    pub fn next(&mut self, waveform: Waveform, dt: f32) -> f32 {
        let out = sample(waveform, self.phase, dt);
        self.phase = wrap_phase(self.phase + dt);
        out
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_phase(phase);
    }
}
