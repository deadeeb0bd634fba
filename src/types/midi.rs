// Copyright (c) 2024 Mike Tsao

use serde::{Deserialize, Serialize};
use synonym::Synonym;

pub use midly::{
    num::{u4, u7},
    MidiMessage,
};

/// Newtype for MIDI channel.
#[derive(Synonym, Serialize, Deserialize)]
pub struct MidiChannel(pub u8);
#[allow(missing_docs)]
impl MidiChannel {
    pub const MIN_VALUE: u8 = 0;
    pub const MAX_VALUE: u8 = 15; // inclusive
    pub const DRUM_VALUE: u8 = 10;
    pub const DRUM: Self = Self(Self::DRUM_VALUE);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }
}
impl From<u4> for MidiChannel {
    fn from(value: u4) -> Self {
        Self(value.as_int())
    }
}
impl From<MidiChannel> for u4 {
    fn from(value: MidiChannel) -> Self {
        u4::from(value.0.min(MidiChannel::MAX_VALUE))
    }
}

/// A [MidiMessage] addressed to a [MidiChannel]. This is what travels over a
/// [MidiEndpoint](crate::orchestration::MidiEndpoint).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    #[allow(missing_docs)]
    pub channel: MidiChannel,
    #[allow(missing_docs)]
    pub message: MidiMessage,
}
impl MidiEvent {
    /// Convenience function to make a note-on [MidiEvent].
    pub fn new_note_on(channel: MidiChannel, key: u8, vel: u8) -> Self {
        Self {
            channel,
            message: MidiMessage::NoteOn {
                key: u7::from(key),
                vel: u7::from(vel),
            },
        }
    }
}
