// Copyright (c) 2024 Mike Tsao

#![warn(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Loopsmith edits the notes in a looping MIDI sequence.
//!
//! A [Sequence](composition::Sequence) is a list of
//! [Track](composition::Track)s, and each track is a list of
//! [NoteEvent](composition::NoteEvent)s. The
//! [SequenceEditor](orchestration::SequenceEditor) owns the sequence and
//! applies edits to whichever tracks the caller selects: transposing by pitch
//! class with a [PitchClassFilter](composition::PitchClassFilter), doubling or
//! halving note lengths, shifting notes by a beat, or any caller-supplied
//! transform. It also deletes tracks, keeping the loop length and the routing
//! to the [SoundSink](traits::SoundSink) intact afterward.
//!
//! Sequences come from Standard MIDI Files through
//! [SequenceLibrary](util::SequenceLibrary) and
//! [MidiFileCodec](util::MidiFileCodec), which also writes them back out.

/// A collection of imports that are useful to users of this crate. `use
/// loopsmith::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        composition::prelude::*, elements::prelude::*, orchestration::prelude::*,
        traits::prelude::*, types::prelude::*, util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {composition::Sequence, orchestration::SequenceEditor};

pub mod composition;
pub mod elements;
pub mod error;
pub mod orchestration;
pub mod traits;
pub mod types;
pub mod util;
