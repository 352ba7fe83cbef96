//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; note handling and mixing live in `synth`.

/// Tanh soft clipping for the final mix.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter with smoothed cutoff.
pub mod filter;
/// Per-voice LFO and its routing curves.
pub mod lfo;
/// PolyBLEP waveform kernel.
pub mod oscillator;
/// One-pole parameter smoothing.
pub mod smooth;
/// Detuned oscillator stacks.
pub mod unison;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{FilterMode, SvFilter};
pub use lfo::{Lfo, LfoTarget};
pub use oscillator::Waveform;
