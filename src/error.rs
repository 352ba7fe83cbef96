//! Error types for the non-realtime edges of the engine.
//!
//! Nothing in here is ever produced inside the audio callback. Bad control
//! input reaching the engine is dropped silently; these errors only surface
//! where a caller can actually do something about them (construction, the
//! UI-side message handle, string parsing).

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate {0} Hz is outside the supported range 8000..=384000")]
    SampleRate(f32),

    #[error("polyphony must be between 1 and {max}, got {got}")]
    Polyphony { got: usize, max: usize },

    #[error("mix gain must be finite and positive, got {0}")]
    MixGain(f32),

    #[error("steal fade time must be finite and positive, got {0} s")]
    StealFade(f32),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("control queue is full, message dropped")]
    QueueFull,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown waveform `{0}` (expected sine, saw, square or triangle)")]
pub struct ParseWaveformError(pub String);
