//! Low Frequency Oscillator (LFO) routed to a single voice parameter.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{oscillator::wrap_phase, smooth::OnePole};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies (here 0 - 20 Hz).
It is never heard directly; it moves a parameter of the voice instead.

Vocabulary
----------

  rate        LFO frequency in Hz. 5 Hz = one wobble every 200 ms.

  depth       How far the LFO pushes its target, normalized to [0, 1].
              The LFO output is `sin(2π · phase) · depth`, a bipolar value
              in [-depth, +depth].

  target      The single parameter the LFO is routed to.


Routing
-------

Each voice owns one LFO and it drives exactly one destination at a time:

    Pitch       vibrato. ±2 semitones at full depth:
                    freq · 2^((value · 2) / 12)

    Amplitude   tremolo. Multiplies the post-envelope sample:
                    sample · max(0, 1 + value)
                At full depth the trough reaches silence.

    Filter      wah. ±4 semitones of cutoff at full depth, for this sample
                only (the smoothed base cutoff is left alone):
                    cutoff · 2^((value · 4) / 12)


Depth Smoothing
---------------

Moving the depth slider while a note sounds would step the modulation
amount and click. Depth glides to its new value over ~20 ms (one-pole, see
`dsp/smooth.rs`). A fresh note snaps straight to the current depth since
there is nothing to click against yet.
*/

pub const MAX_LFO_RATE: f32 = 20.0;
const DEPTH_SMOOTHING_SECS: f32 = 0.02;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoTarget {
    #[default]
    None,
    Pitch,
    Amplitude,
    FilterCutoff,
}

impl LfoTarget {
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(LfoTarget::None),
            1 => Some(LfoTarget::Pitch),
            2 => Some(LfoTarget::Amplitude),
            3 => Some(LfoTarget::FilterCutoff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lfo {
    sample_rate: f32,
    phase: f32,
    rate: f32,
    depth: OnePole,
}

impl Lfo {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            rate: 0.0,
            depth: OnePole::new(0.0, DEPTH_SMOOTHING_SECS, sample_rate),
        }
    }

    pub fn set_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.rate = rate.clamp(0.0, MAX_LFO_RATE);
        }
    }

    pub fn set_depth(&mut self, depth: f32) {
        if depth.is_finite() {
            self.depth.set_target(depth.clamp(0.0, 1.0));
        }
    }

    pub fn snap_depth(&mut self) {
        self.depth.snap();
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    /// Advance one sample and return the bipolar modulation value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let depth = self.depth.next();
        // Phase holds while the LFO is switched off by rate or depth.
        if self.rate <= 0.0 || depth <= 0.0 {
            return 0.0;
        }
        self.phase = wrap_phase(self.phase + self.rate / self.sample_rate);
        (TAU * self.phase).sin() * depth
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Current (smoothed) depth.
    pub fn depth(&self) -> f32 {
        self.depth.value()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

/// Frequency multiplier for the pitch target (±2 semitones at full depth).
#[inline]
pub fn pitch_ratio(value: f32) -> f32 {
    2.0f32.powf(value * 2.0 / 12.0)
}

/// Gain for the amplitude target.
#[inline]
pub fn amplitude_gain(value: f32) -> f32 {
    (1.0 + value).max(0.0)
}

/// Cutoff multiplier for the filter target (±4 semitones at full depth).
#[inline]
pub fn cutoff_scale(value: f32) -> f32 {
    2.0f32.powf(value * 4.0 / 12.0)
}
