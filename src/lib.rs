pub mod config;
pub mod dsp;
pub mod error;
pub mod io;
pub mod oneshot; // Non-realtime buffer rendering
pub mod synth; // Voice management, stealing and the engine

pub use config::EngineConfig;
pub use error::{ConfigError, ControlError, ParseWaveformError};
pub use synth::{
    message::{NoteId, SynthMessage},
    params::{ParamUpdate, SynthParams},
    poly::PolySynth,
};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_MAX_VOICES: usize = 24;

/// Envelope level treated as silence.
pub const MIN_GAIN: f32 = 1.0e-4;
/// Shortest allowed envelope stage, in seconds.
pub const MIN_STAGE_TIME: f32 = 0.001;
