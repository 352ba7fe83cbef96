use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "rtrb")]
use crate::error::ControlError;
use crate::{dsp::oscillator::Waveform, synth::params::ParamUpdate};

/// Opaque key tying a note-off to the note-on that started it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

impl NoteId {
    /// Key for a MIDI note on a given channel.
    pub fn from_midi(channel: u8, key: u8) -> Self {
        NoteId(((channel as u64) << 8) | key as u64)
    }
}

impl From<u64> for NoteId {
    fn from(id: u64) -> Self {
        NoteId(id)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn {
        id: NoteId,
        frequency: f32,
        waveform: Waveform,
        velocity: f32,
    },
    NoteOff {
        id: NoteId,
    },
    AllNotesOff,
    SetParams(ParamUpdate),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Offline driving (tests, benches). Not for the audio thread.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

/// UI-thread side of the control queue.
#[cfg(feature = "rtrb")]
pub struct SynthHandle {
    tx: Producer<SynthMessage>,
}

/// Create a bounded SPSC control queue.
#[cfg(feature = "rtrb")]
pub fn channel(capacity: usize) -> (SynthHandle, Consumer<SynthMessage>) {
    let (tx, rx) = RingBuffer::new(capacity);
    (SynthHandle { tx }, rx)
}

#[cfg(feature = "rtrb")]
impl SynthHandle {
    pub fn send(&mut self, message: SynthMessage) -> Result<(), ControlError> {
        self.tx.push(message).map_err(|_| {
            log::warn!("control queue full, dropping {message:?}");
            ControlError::QueueFull
        })
    }

    pub fn note_on(
        &mut self,
        id: NoteId,
        frequency: f32,
        waveform: Waveform,
        velocity: f32,
    ) -> Result<(), ControlError> {
        self.send(SynthMessage::NoteOn {
            id,
            frequency,
            waveform,
            velocity,
        })
    }

    pub fn note_off(&mut self, id: NoteId) -> Result<(), ControlError> {
        self.send(SynthMessage::NoteOff { id })
    }

    pub fn all_notes_off(&mut self) -> Result<(), ControlError> {
        self.send(SynthMessage::AllNotesOff)
    }

    pub fn set_params(&mut self, update: ParamUpdate) -> Result<(), ControlError> {
        self.send(SynthMessage::SetParams(update))
    }

    /// Free slots left in the queue.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}
