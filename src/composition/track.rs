// Copyright (c) 2024 Mike Tsao

use crate::{
    composition::NoteEvent,
    types::{IsUid, MusicalTime, UidFactory},
};
use delegate::delegate;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Newtype for track title string.
#[derive(Synonym, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct TrackTitle(#[derivative(Default(value = "\"Untitled\".to_string()"))] pub String);

/// Identifies a track independently of its position in a
/// [Sequence](crate::composition::Sequence).
#[derive(Synonym, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct TrackUid(#[derivative(Default(value = "1"))] pub usize);
impl IsUid for TrackUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}

/// Mints [TrackUid]s.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackUidFactory(UidFactory<TrackUid>);
impl Default for TrackUidFactory {
    fn default() -> Self {
        Self(UidFactory::<TrackUid>::new(1))
    }
}
impl TrackUidFactory {
    delegate! {
        to self.0 {
            /// Creates a new [TrackUid].
            pub fn mint_next(&self) -> TrackUid;
            /// Keeps the factory ahead of a uid it didn't mint.
            pub fn notify_externally_minted_uid(&self, uid: TrackUid);
        }
    }
}

/// A [Track] is an ordered list of [NoteEvent]s. The order is whatever order
/// the notes arrived in; it isn't necessarily sorted by position.
///
/// Nothing outside the track gets a mutable view of its notes. Editors read a
/// copy with [Track::note_data()] and install a whole new list with
/// [Track::replace_note_data()].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Track {
    uid: TrackUid,
    title: TrackTitle,
    notes: Vec<NoteEvent>,
}
impl Track {
    #[allow(missing_docs)]
    pub fn new_with(title: &str, notes: Vec<NoteEvent>) -> Self {
        Self {
            uid: TrackUid::default(),
            title: TrackTitle(title.to_string()),
            notes,
        }
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> TrackUid {
        self.uid
    }

    pub(crate) fn set_uid(&mut self, uid: TrackUid) {
        self.uid = uid;
    }

    #[allow(missing_docs)]
    pub fn title(&self) -> &TrackTitle {
        &self.title
    }

    #[allow(missing_docs)]
    pub fn set_title(&mut self, title: TrackTitle) {
        self.title = title;
    }

    /// The track's notes, in order.
    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    /// A copy of the track's notes, for a caller that intends to edit them
    /// and hand them back.
    pub fn note_data(&self) -> Vec<NoteEvent> {
        self.notes.clone()
    }

    /// Replaces every note in the track at once.
    pub fn replace_note_data(&mut self, notes: Vec<NoteEvent>) {
        self.notes = notes;
    }

    /// When the last note in this track stops sounding. An empty track ends
    /// at time zero. Notes whose end can't be represented don't count.
    pub fn end(&self) -> MusicalTime {
        self.notes
            .iter()
            .filter_map(|n| n.end())
            .max()
            .unwrap_or(MusicalTime::START)
    }

    delegate! {
        to self.notes {
            /// The number of notes in the track.
            pub fn len(&self) -> usize;
            /// Whether the track has no notes.
            pub fn is_empty(&self) -> bool;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_title_defaults() {
        assert_eq!(TrackTitle::default().0, "Untitled");
        let track = Track::new_with("Bass", Vec::default());
        assert_eq!(track.title().0, "Bass");
        assert!(track.is_empty());
        assert_eq!(track.end(), MusicalTime::START);
    }

    #[test]
    fn note_data_is_a_copy() {
        let note = NoteEvent::new_with(60, MusicalTime::START, MusicalTime::ONE_BEAT);
        let mut track = Track::new_with("Lead", vec![note]);

        let mut notes = track.note_data();
        notes[0].key = 61;
        assert_eq!(track.notes()[0].key, 60, "editing the copy shouldn't touch the track");

        track.replace_note_data(notes);
        assert_eq!(track.notes()[0].key, 61);
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn track_end_is_latest_note_end() {
        let track = Track::new_with(
            "Lead",
            vec![
                NoteEvent::new_with(60, MusicalTime::new_with_beats(3), MusicalTime::ONE_BEAT),
                NoteEvent::new_with(62, MusicalTime::START, MusicalTime::DURATION_HALF),
            ],
        );
        assert_eq!(track.end(), MusicalTime::new_with_beats(4));
    }
}
