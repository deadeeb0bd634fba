// Copyright (c) 2024 Mike Tsao

//! The traits that connect the editor to the world around it.

use crate::orchestration::MidiEndpoint;

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{HasSettings, Serializable, SoundSink};
}

/// A [SoundSink] is whatever turns MIDI into sound: a software synth, a
/// hardware port, or, in tests, a queue. The editor routes every track to the
/// sink's [SoundSink::midi_in()] endpoint and starts it once at setup.
pub trait SoundSink: core::fmt::Debug {
    /// The endpoint that accepts MIDI for this sink.
    fn midi_in(&self) -> MidiEndpoint;

    /// Brings the sink up. An error here means there won't be any sound, but
    /// editing can go on regardless.
    fn start(&mut self) -> anyhow::Result<()>;
}

/// Something that is [Serializable] might need to rebuild state that isn't
/// saved, right after deserialization.
pub trait Serializable {
    /// Called just after loading from disk.
    fn after_deser(&mut self) {}
}

/// Settings structs implement [HasSettings] so that the app knows when they
/// need to be written back to disk.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}
