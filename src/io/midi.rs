//! MIDI note → drum slot mapping for pad controllers and keyboards.

/// Lowest mapped note, C1 (General MIDI bass drum 1).
pub const FIRST_DRUM_NOTE: u8 = 36;
/// Slots reachable from MIDI, C1 through B1.
pub const DRUM_SLOTS: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiEvent {
    /// Decode a channel voice message; anything else is `None`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let &[status, data1, data2, ..] = bytes else {
            return None;
        };
        let channel = status & 0x0f;
        match status & 0xf0 {
            // Note-on with velocity 0 is a note-off by convention.
            0x90 if data2 > 0 => Some(MidiEvent::NoteOn {
                channel,
                key: data1,
                velocity: data2,
            }),
            0x80 | 0x90 => Some(MidiEvent::NoteOff {
                channel,
                key: data1,
                velocity: data2,
            }),
            0xb0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            _ => None,
        }
    }
}

/// Drum slot (0 - 11) for MIDI notes 36 - 47.
pub fn note_to_slot(note: u8) -> Option<usize> {
    note.checked_sub(FIRST_DRUM_NOTE)
        .filter(|&slot| slot < DRUM_SLOTS)
        .map(usize::from)
}

/// Slot and velocity for an event that should fire a drum.
pub fn drum_trigger(event: MidiEvent) -> Option<(usize, u8)> {
    match event {
        MidiEvent::NoteOn { key, velocity, .. } => note_to_slot(key).map(|slot| (slot, velocity)),
        _ => None,
    }
}
