// Copyright (c) 2024 Mike Tsao

//! Editing a sequence and connecting it to something that plays it.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{MidiEndpoint, NullSink, SequenceEditor};
}

pub use {
    editor::SequenceEditor,
    routing::{MidiEndpoint, OutputRouting},
    sinks::NullSink,
};

mod editor;
mod routing;
mod sinks;
