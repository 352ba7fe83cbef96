//! Global synth parameters shared by every voice.
//!
//! `SynthParams` is the full record the engine owns. Control code never
//! writes it directly; it sends a `ParamUpdate` (every field optional)
//! through the message queue and the engine merges it at the next block
//! boundary. All clamping happens here, at the point of entry, so nothing
//! downstream ever sees a value that could produce NaN or Inf.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{filter::FilterMode, lfo::LfoTarget, unison::MAX_UNISON},
    MIN_STAGE_TIME,
};

/// Shortest attack or release the controls offer.
pub const MIN_ATTACK_RELEASE: f32 = 0.005;
pub const MAX_STAGE_TIME: f32 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub use_adsr: bool,

    pub use_fm: bool,
    pub fm_ratio: f32,
    /// Modulation index in radians.
    pub fm_index: f32,
    /// Carrier start phase in degrees.
    pub phase_offset: f32,

    pub use_filter: bool,
    pub filter_cutoff: f32,
    pub filter_resonance: f32,
    pub filter_mode: FilterMode,

    pub lfo_rate: f32,
    pub lfo_depth: f32,
    pub lfo_target: LfoTarget,

    pub unison_voices: usize,
    /// Cents between neighbouring unison copies.
    pub unison_detune: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.3,
            use_adsr: true,
            use_fm: false,
            fm_ratio: 2.0,
            fm_index: 2.0,
            phase_offset: 0.0,
            use_filter: false,
            filter_cutoff: 18_000.0,
            filter_resonance: 0.7,
            filter_mode: FilterMode::LowPass,
            lfo_rate: 0.0,
            lfo_depth: 0.0,
            lfo_target: LfoTarget::None,
            unison_voices: 1,
            unison_detune: 0.0,
        }
    }
}

/// Partial parameter record. `None` leaves the current value alone.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParamUpdate {
    pub attack: Option<f32>,
    pub decay: Option<f32>,
    pub sustain: Option<f32>,
    pub release: Option<f32>,
    pub use_adsr: Option<bool>,

    pub use_fm: Option<bool>,
    pub fm_ratio: Option<f32>,
    pub fm_index: Option<f32>,
    pub phase_offset: Option<f32>,

    pub use_filter: Option<bool>,
    pub filter_cutoff: Option<f32>,
    pub filter_resonance: Option<f32>,
    pub filter_mode: Option<FilterMode>,

    pub lfo_rate: Option<f32>,
    pub lfo_depth: Option<f32>,
    pub lfo_target: Option<LfoTarget>,

    pub unison_voices: Option<usize>,
    pub unison_detune: Option<f32>,
}

/// Clamp a finite value into range; non-finite input keeps `current`.
#[inline]
fn clamped(value: Option<f32>, current: f32, min: f32, max: f32) -> f32 {
    match value {
        Some(v) if v.is_finite() => v.clamp(min, max),
        _ => current,
    }
}

impl SynthParams {
    /// Fold an update into the record, clamping every field at entry.
    pub fn merge(&mut self, update: &ParamUpdate) {
        let min_ar = MIN_ATTACK_RELEASE.max(MIN_STAGE_TIME);
        self.attack = clamped(update.attack, self.attack, min_ar, MAX_STAGE_TIME);
        self.decay = clamped(update.decay, self.decay, MIN_STAGE_TIME, MAX_STAGE_TIME);
        self.sustain = clamped(update.sustain, self.sustain, 0.0, 1.0);
        self.release = clamped(update.release, self.release, min_ar, MAX_STAGE_TIME);
        if let Some(use_adsr) = update.use_adsr {
            self.use_adsr = use_adsr;
        }

        if let Some(use_fm) = update.use_fm {
            self.use_fm = use_fm;
        }
        self.fm_ratio = clamped(update.fm_ratio, self.fm_ratio, 0.5, 8.0);
        self.fm_index = clamped(update.fm_index, self.fm_index, 0.0, 30.0);
        self.phase_offset = clamped(update.phase_offset, self.phase_offset, 0.0, 360.0);

        if let Some(use_filter) = update.use_filter {
            self.use_filter = use_filter;
        }
        self.filter_cutoff = clamped(update.filter_cutoff, self.filter_cutoff, 20.0, 20_000.0);
        self.filter_resonance =
            clamped(update.filter_resonance, self.filter_resonance, 0.1, 10.0);
        if let Some(mode) = update.filter_mode {
            self.filter_mode = mode;
        }

        self.lfo_rate = clamped(update.lfo_rate, self.lfo_rate, 0.0, 20.0);
        self.lfo_depth = clamped(update.lfo_depth, self.lfo_depth, 0.0, 1.0);
        if let Some(target) = update.lfo_target {
            self.lfo_target = target;
        }

        if let Some(count) = update.unison_voices {
            self.unison_voices = count.clamp(1, MAX_UNISON);
        }
        self.unison_detune = clamped(update.unison_detune, self.unison_detune, 0.0, 50.0);
    }

    /// Build a clamped record from scratch.
    pub fn sanitized(self) -> Self {
        let mut params = Self::default();
        params.merge(&ParamUpdate::from(self));
        params
    }

    /// Carrier start phase in cycles.
    pub fn phase_offset_cycles(&self) -> f32 {
        self.phase_offset / 360.0
    }
}

impl From<SynthParams> for ParamUpdate {
    fn from(p: SynthParams) -> Self {
        Self {
            attack: Some(p.attack),
            decay: Some(p.decay),
            sustain: Some(p.sustain),
            release: Some(p.release),
            use_adsr: Some(p.use_adsr),
            use_fm: Some(p.use_fm),
            fm_ratio: Some(p.fm_ratio),
            fm_index: Some(p.fm_index),
            phase_offset: Some(p.phase_offset),
            use_filter: Some(p.use_filter),
            filter_cutoff: Some(p.filter_cutoff),
            filter_resonance: Some(p.filter_resonance),
            filter_mode: Some(p.filter_mode),
            lfo_rate: Some(p.lfo_rate),
            lfo_depth: Some(p.lfo_depth),
            lfo_target: Some(p.lfo_target),
            unison_voices: Some(p.unison_voices),
            unison_detune: Some(p.unison_detune),
        }
    }
}

impl ParamUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Envelope times, sustain or the bypass flag changed.
    pub fn touches_envelope(&self) -> bool {
        self.attack.is_some()
            || self.decay.is_some()
            || self.sustain.is_some()
            || self.release.is_some()
            || self.use_adsr.is_some()
    }

    pub fn touches_filter(&self) -> bool {
        self.use_filter.is_some()
            || self.filter_cutoff.is_some()
            || self.filter_resonance.is_some()
            || self.filter_mode.is_some()
    }

    pub fn touches_lfo(&self) -> bool {
        self.lfo_rate.is_some() || self.lfo_depth.is_some() || self.lfo_target.is_some()
    }

    pub fn touches_fm(&self) -> bool {
        self.use_fm.is_some() || self.fm_ratio.is_some() || self.fm_index.is_some()
    }

    pub fn with_filter_cutoff(mut self, cutoff: f32) -> Self {
        self.filter_cutoff = Some(cutoff);
        self
    }

    pub fn with_adsr(mut self, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        self.attack = Some(attack);
        self.decay = Some(decay);
        self.sustain = Some(sustain);
        self.release = Some(release);
        self
    }

    pub fn with_lfo(mut self, rate: f32, depth: f32, target: LfoTarget) -> Self {
        self.lfo_rate = Some(rate);
        self.lfo_depth = Some(depth);
        self.lfo_target = Some(target);
        self
    }

    pub fn with_unison(mut self, voices: usize, detune: f32) -> Self {
        self.unison_voices = Some(voices);
        self.unison_detune = Some(detune);
        self
    }
}
