#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

/// Controller number for "all notes off".
pub const CC_ALL_NOTES_OFF: u8 = 123;

impl MidiEvent {
    /// Decode a raw channel voice message. Anything else is `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0f;
        match (status & 0xf0, data) {
            (0x80, [key, velocity, ..]) => Some(MidiEvent::NoteOff {
                channel,
                key: key & 0x7f,
                velocity: velocity & 0x7f,
            }),
            (0x90, [key, velocity, ..]) => Some(MidiEvent::NoteOn {
                channel,
                key: key & 0x7f,
                velocity: velocity & 0x7f,
            }),
            (0xb0, [controller, value, ..]) => Some(MidiEvent::ControlChange {
                channel,
                controller: controller & 0x7f,
                value: value & 0x7f,
            }),
            _ => None,
        }
    }
}
