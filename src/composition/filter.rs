// Copyright (c) 2024 Mike Tsao

use crate::{composition::NoteEvent, types::PitchClass};
use serde::{Deserialize, Serialize};
use strum::EnumCount;

/// [PitchClassFilter] transposes notes by an amount that depends on their
/// pitch class. Setting the offset for [PitchClass::C] to +2, for example,
/// turns every C into a D while leaving other notes alone. A full table of
/// offsets can remap one scale onto another.
///
/// The filter knows nothing about sequences. It hands out a pure transform
/// ([PitchClassFilter::transform()]) that the
/// [SequenceEditor](crate::orchestration::SequenceEditor) applies to whatever
/// tracks the caller selects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PitchClassFilter {
    offsets: [i32; PitchClass::COUNT],
}
impl PitchClassFilter {
    /// The exclusive upper bound of a valid MIDI key.
    pub const KEY_LIMIT: i64 = 128;

    /// Sets the semitone offset for one pitch class. Pitch classes outside
    /// 0..12, negative ones included, are ignored.
    pub fn set_offset(&mut self, pitch_class: i32, offset: i32) {
        if let Some(slot) = Self::slot(pitch_class).and_then(|i| self.offsets.get_mut(i)) {
            *slot = offset;
        } else {
            log::debug!("ignoring offset {offset} for nonexistent pitch class {pitch_class}");
        }
    }

    /// The offset for one pitch class, if it exists.
    pub fn offset(&self, pitch_class: i32) -> Option<i32> {
        Self::slot(pitch_class).and_then(|i| self.offsets.get(i).copied())
    }

    fn slot(pitch_class: i32) -> Option<usize> {
        usize::try_from(pitch_class).ok()
    }

    /// All twelve offsets, indexed by pitch class.
    pub fn offsets(&self) -> &[i32; PitchClass::COUNT] {
        &self.offsets
    }

    /// Sets every offset back to zero.
    pub fn reset(&mut self) {
        self.offsets = Default::default();
    }

    /// Applies the offset for the note's pitch class. If the result would fall
    /// outside the MIDI key range, the note comes back unchanged; the offset is
    /// dropped rather than clamped.
    pub fn transform(&self, note: NoteEvent) -> NoteEvent {
        let offset = self.offsets[note.pitch_class().index()] as i64;
        let candidate = note.key as i64 + offset;
        if (0..Self::KEY_LIMIT).contains(&candidate) {
            note.transposed_to(candidate as u8)
        } else {
            note
        }
    }

    /// [PitchClassFilter::transform()] as a function value, ready to hand to
    /// [SequenceEditor::filter_notes()](crate::orchestration::SequenceEditor::filter_notes).
    pub fn transform_fn(&self) -> impl Fn(NoteEvent) -> NoteEvent + '_ {
        move |note| self.transform(note)
    }
}
