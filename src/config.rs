//! Engine construction parameters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    synth::{params::SynthParams, pool::StealWeights},
    DEFAULT_MAX_VOICES,
};

pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;
pub const MAX_POLYPHONY: usize = 256;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Voices that may sound at once before stealing starts.
    pub polyphony: usize,
    /// Extra slots where stolen voices fade out.
    pub steal_slots: usize,
    /// Headroom gain applied to the voice sum before soft clipping.
    pub mix_gain: f32,
    pub steal_fade_secs: f32,
    /// Seed for unison phase jitter.
    pub seed: u64,
    pub steal_weights: StealWeights,
    /// Parameters in effect before the first `SetParams`.
    pub params: SynthParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            polyphony: DEFAULT_MAX_VOICES,
            steal_slots: 4,
            mix_gain: 0.2,
            steal_fade_secs: 0.01,
            seed: 0x5eed,
            steal_weights: StealWeights::default(),
            params: SynthParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite()
            || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate)
        {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.polyphony == 0 || self.polyphony > MAX_POLYPHONY {
            return Err(ConfigError::Polyphony {
                got: self.polyphony,
                max: MAX_POLYPHONY,
            });
        }
        if !self.mix_gain.is_finite() || self.mix_gain <= 0.0 {
            return Err(ConfigError::MixGain(self.mix_gain));
        }
        if !self.steal_fade_secs.is_finite() || self.steal_fade_secs <= 0.0 {
            return Err(ConfigError::StealFade(self.steal_fade_secs));
        }
        Ok(())
    }
}
