// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        CrossbeamChannel, MidiChannel, MidiEvent, MidiMessage, MusicalTime, PitchClass, Tempo,
    };
}

pub use {
    channels::CrossbeamChannel,
    midi::{u4, u7, MidiChannel, MidiEvent, MidiMessage},
    note::PitchClass,
    time::{MusicalTime, Tempo},
    uid::{IsUid, UidFactory},
};

mod channels;
mod midi;
mod note;
mod time;
mod uid;
