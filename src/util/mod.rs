// Copyright (c) 2024 Mike Tsao

//! File formats, asset lookup, settings, and other utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{EditorSettings, MidiFileCodec, PositionFloor, SequenceLibrary};
}

pub use codec::MidiFileCodec;
pub use library::SequenceLibrary;
pub use mod_serial::ModSerial;
pub use settings::{EditorSettings, EditorSettingsBuilder, PositionFloor};

mod codec;
mod library;
mod mod_serial;
mod settings;
