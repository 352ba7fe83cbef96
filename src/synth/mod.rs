// Purpose: Voice management, polyphony, control messages
// This layer sits above the dsp primitives and owns every voice

pub mod message;
pub mod params;
pub mod pool;
pub mod poly;
pub mod voice;

#[cfg(feature = "rtrb")]
pub use message::{channel, SynthHandle};
pub use message::{MessageReceiver, NoteId, SynthMessage};
pub use params::{ParamUpdate, SynthParams};
pub use pool::{StealWeights, VoicePool};
pub use poly::PolySynth;
pub use voice::{NoteStart, Voice};
