// Copyright (c) 2024 Mike Tsao

use crate::types::{MidiChannel, MusicalTime, PitchClass};
use serde::{Deserialize, Serialize};

/// A [NoteEvent] is a single played note. It knows which key it's playing, and
/// when it starts relative to the beginning of its track.
///
/// Notes are plain values. Editing a note means building a new one and
/// replacing the old one wholesale, which is why most of the methods here take
/// `&self` and return `Self`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NoteEvent {
    /// The MIDI key code for the note. 60 is (usually) middle C. Meaningful
    /// values are 0..128.
    pub key: u8,
    /// Where the note starts, in beats from the start of the track.
    pub position: MusicalTime,
    /// How long the note sounds, in beats.
    pub duration: MusicalTime,
    /// How hard the note is struck.
    pub velocity: u8,
    /// Which channel the note is played on.
    #[serde(default)]
    pub channel: MidiChannel,
}
impl Default for NoteEvent {
    fn default() -> Self {
        Self::new_with(60, MusicalTime::START, MusicalTime::ONE_BEAT)
    }
}
impl NoteEvent {
    /// The velocity given to notes that don't specify one.
    pub const DEFAULT_VELOCITY: u8 = 127;

    /// Creates a [NoteEvent] from a key and start/duration.
    pub const fn new_with(key: u8, position: MusicalTime, duration: MusicalTime) -> Self {
        Self {
            key,
            position,
            duration,
            velocity: Self::DEFAULT_VELOCITY,
            channel: MidiChannel::new(0),
        }
    }

    /// Returns a copy with the given velocity.
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    /// Returns a copy on the given channel.
    pub fn with_channel(mut self, channel: MidiChannel) -> Self {
        self.channel = channel;
        self
    }

    /// When the note stops sounding, or None if that's past the end of
    /// representable time.
    pub fn end(&self) -> Option<MusicalTime> {
        self.position.checked_add(self.duration)
    }

    #[allow(missing_docs)]
    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_key(self.key)
    }

    /// Moves the note's start by the specified amount without changing its
    /// duration. A negative amount moves it left. A move that would overflow
    /// leaves the note where it is.
    pub fn shifted(&self, delta: MusicalTime) -> Self {
        match self.position.checked_add(delta) {
            Some(position) => Self { position, ..*self },
            None => {
                log::warn!("Note {} at {} can't move any further", self.key, self.position);
                *self
            }
        }
    }

    /// Returns a copy with a different key.
    pub fn transposed_to(&self, key: u8) -> Self {
        Self { key, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_defaults() {
        let note = NoteEvent::new_with(64, MusicalTime::ONE_BEAT, MusicalTime::DURATION_HALF);
        assert_eq!(note.velocity, NoteEvent::DEFAULT_VELOCITY);
        assert_eq!(note.channel, MidiChannel::default());
        assert_eq!(note.end(), Some(MusicalTime::new_with_beats(3)));
        assert_eq!(note.pitch_class(), PitchClass::E);
    }

    #[test]
    fn edits_return_new_values() {
        let note = NoteEvent::new_with(60, MusicalTime::START, MusicalTime::DURATION_HALF)
            .with_velocity(90)
            .with_channel(MidiChannel::DRUM);

        let shifted = note.shifted(-MusicalTime::ONE_BEAT);
        assert_eq!(shifted.position, MusicalTime::new_with_beats(-1));
        assert_eq!(shifted.duration, note.duration);
        assert_eq!(shifted.velocity, 90);
        assert_eq!(shifted.channel, MidiChannel::DRUM);

        let transposed = note.transposed_to(72);
        assert_eq!(transposed.key, 72);
        assert_eq!(transposed.position, note.position);

        // The original is untouched.
        assert_eq!(note.key, 60);
        assert_eq!(note.position, MusicalTime::START);
    }
}
