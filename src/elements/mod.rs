// Copyright (c) 2024 Mike Tsao

//! Building blocks that sequences are made of.

/// The most commonly used imports.
pub mod prelude {
    pub use super::Transport;
}

pub use transport::Transport;

mod transport;
