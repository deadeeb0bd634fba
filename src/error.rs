// Copyright (c) 2024 Mike Tsao

//! Errors that callers may want to match on.

use thiserror::Error;

/// Reasons a sequence couldn't be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No asset with this name exists in any search path.
    #[error("couldn't find an asset named {0}")]
    NotFound(String),

    /// The asset exists but isn't a usable MIDI file.
    #[error("{name} isn't a usable MIDI file: {reason}")]
    Corrupt {
        #[allow(missing_docs)]
        name: String,
        #[allow(missing_docs)]
        reason: String,
    },

    /// The file counts time in SMPTE frames rather than beats.
    #[error("{0} uses timecode timing, which isn't supported")]
    UnsupportedTiming(String),

    #[allow(missing_docs)]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a sequence couldn't be written out.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// There are no tracks to write.
    #[error("the sequence has no tracks")]
    Empty,

    /// A time or resolution doesn't fit in the Standard MIDI File format.
    #[error("can't be written as MIDI: {0}")]
    OutOfRange(String),

    /// midly refused to write the file.
    #[error("couldn't write MIDI data: {0}")]
    Midi(String),

    #[allow(missing_docs)]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
