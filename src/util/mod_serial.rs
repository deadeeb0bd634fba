// Copyright (c) 2024 Mike Tsao

use derivative::Derivative;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// [ModSerial] is a counter that changes whenever its owner does. Observers
/// keep their own usize and hand it to [ModSerial::has_changed()], which
/// reports whether anything happened since they last looked.
#[derive(Synonym, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct ModSerial(
    // Starts away from usize::default() so that a fresh observer sees a change
    // on its first check.
    #[derivative(Default(value = "1000"))] pub usize,
);
impl ModSerial {
    /// Records that the owner changed.
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Returns true if the serial differs from `last_known`, and brings
    /// `last_known` up to date.
    pub fn has_changed(&self, last_known: &mut usize) -> bool {
        let has_changed = self.0 != *last_known;
        *last_known = self.0;
        has_changed
    }
}
