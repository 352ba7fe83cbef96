use crate::{
    dsp::oscillator::Waveform,
    io::midi::{MidiEvent, CC_ALL_NOTES_OFF},
    synth::message::{NoteId, SynthMessage},
};

/// Translate a MIDI event on `channel_filter` into an engine message.
///
/// A note-on with velocity 0 is a note-off, as running-status keyboards send
/// it that way.
pub fn midi_to_synth(
    midi: MidiEvent,
    channel_filter: u8,
    waveform: Waveform,
) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if channel == channel_filter => {
            let id = NoteId::from_midi(channel, key);
            if velocity == 0 {
                Some(SynthMessage::NoteOff { id })
            } else {
                Some(SynthMessage::NoteOn {
                    id,
                    frequency: midi_note_to_freq(key),
                    waveform,
                    velocity: velocity as f32 / 127.0,
                })
            }
        }
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff {
                id: NoteId::from_midi(channel, key),
            })
        }
        MidiEvent::ControlChange {
            channel,
            controller: CC_ALL_NOTES_OFF,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
