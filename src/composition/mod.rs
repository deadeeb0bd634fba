// Copyright (c) 2024 Mike Tsao

//! Representation of the notes, tracks, and sequences being edited.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        NoteEvent, PitchClassFilter, Sequence, SequenceBuilder, Track, TrackSelection, TrackTitle,
        TrackUid,
    };
}

pub use filter::PitchClassFilter;
pub use note::NoteEvent;
pub use sequence::{
    Sequence, SequenceBuilder, SequenceBuilderError, SequenceEphemerals, TrackSelection,
};
pub use track::{Track, TrackTitle, TrackUid, TrackUidFactory};

mod filter;
mod note;
mod sequence;
mod track;
