// Copyright (c) 2024 Mike Tsao

use core::fmt::Display;
use strum_macros::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// The twelve pitch classes of the chromatic scale. A MIDI key's pitch class
/// is its key number mod 12, so every C on the keyboard is [PitchClass::C].
#[allow(missing_docs)]
#[derive(
    Clone, Copy, Debug, Default, EnumCount, EnumIter, Eq, FromRepr, Hash, IntoStaticStr, PartialEq,
)]
#[repr(u8)]
pub enum PitchClass {
    #[default]
    C = 0,
    #[strum(serialize = "C#")]
    Cs,
    D,
    #[strum(serialize = "D#")]
    Ds,
    E,
    F,
    #[strum(serialize = "F#")]
    Fs,
    G,
    #[strum(serialize = "G#")]
    Gs,
    A,
    #[strum(serialize = "A#")]
    As,
    B,
}
impl PitchClass {
    /// The pitch class of a MIDI key number.
    pub fn from_key(key: u8) -> Self {
        // The modulo guarantees a valid repr.
        Self::from_repr(key % 12).unwrap_or_default()
    }

    /// The 0-11 index used to key per-class tables.
    pub const fn index(&self) -> usize {
        *self as usize
    }
}
impl Display for PitchClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::{EnumCount, IntoEnumIterator};

    #[test]
    fn pitch_classes_cover_the_octave() {
        assert_eq!(PitchClass::COUNT, 12);
        for (i, pc) in PitchClass::iter().enumerate() {
            assert_eq!(pc.index(), i);
            assert_eq!(PitchClass::from_key(i as u8 + 60), pc);
        }
    }

    #[test]
    fn pitch_class_names() {
        assert_eq!(PitchClass::from_key(60).to_string(), "C");
        assert_eq!(PitchClass::from_key(61).to_string(), "C#");
        assert_eq!(PitchClass::from_key(127).to_string(), "G");
        assert_eq!(PitchClass::from_key(0), PitchClass::C);
    }
}
