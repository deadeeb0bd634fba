// Copyright (c) 2024 Mike Tsao

//! Sound sinks that run as services and talk over crossbeam channels.

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        MidiSinkService, MidiSinkServiceEvent, MidiSinkServiceInput, ProvidesService,
    };
}

pub use sink::{MidiSinkService, MidiSinkServiceEvent, MidiSinkServiceInput};
pub use traits::ProvidesService;

mod sink;
mod traits;
