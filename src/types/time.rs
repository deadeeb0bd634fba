// Copyright (c) 2024 Mike Tsao

//! Handles musical time.

use core::{
    fmt::{self, Display},
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};
use derivative::Derivative;
use num_rational::Rational64;
use num_traits::{CheckedAdd, CheckedDiv, CheckedMul, CheckedSub};
use serde::{Deserialize, Serialize};

/// Beats per minute.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Derivative, PartialEq, PartialOrd)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct Tempo(#[derivative(Default(value = "120.0"))] pub f64);
impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} BPM", self.0))
    }
}
impl From<u16> for Tempo {
    fn from(value: u16) -> Self {
        Self(value as f64)
    }
}
impl Tempo {
    /// The largest value we'll allow.
    pub const MAX_VALUE: f64 = 1024.0;

    /// The smallest value we'll allow. Zero would mean that time never moves.
    pub const MIN_VALUE: f64 = 1.0;

    const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

    /// Converts from the microseconds-per-beat representation used by
    /// Standard MIDI File tempo meta events.
    pub fn from_microseconds_per_beat(microseconds: u32) -> Self {
        if microseconds == 0 {
            Self::default()
        } else {
            let bpm = Self::MICROSECONDS_PER_MINUTE / microseconds as f64;
            Self(bpm.clamp(Self::MIN_VALUE, Self::MAX_VALUE))
        }
    }

    /// Microseconds per beat, for writing tempo meta events.
    pub fn microseconds_per_beat(&self) -> u32 {
        let bpm = self.0.clamp(Self::MIN_VALUE, Self::MAX_VALUE);
        (Self::MICROSECONDS_PER_MINUTE / bpm).round() as u32
    }
}

/// [MusicalTime] is the universal unit of time. It is an exact, signed number
/// of beats, so a 1/12-beat note halved once is exactly [Self::MIN_DURATION].
/// Positions may be negative when the editing policy allows it (see
/// [PositionFloor](crate::util::PositionFloor)).
///
/// Repeated edits can push the numerator or denominator past what an i64
/// holds, so anything driven by user edits should use the `checked_*`
/// methods, which return None instead of overflowing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MusicalTime(Rational64);

#[allow(missing_docs)]
impl MusicalTime {
    /// Pulses per quarter note. A beat can't be edited into anything finer
    /// than one pulse.
    pub const PPQN: i64 = 24;

    pub const START: MusicalTime = Self::new_with_beats(0);
    pub const DURATION_ZERO: MusicalTime = Self::START;
    pub const ONE_BEAT: MusicalTime = Self::new_with_beats(1);
    pub const DURATION_WHOLE: MusicalTime = Self::new_with_beats(4);
    pub const DURATION_HALF: MusicalTime = Self::new_with_beats(2);
    pub const DURATION_QUARTER: MusicalTime = Self::ONE_BEAT;
    pub const DURATION_EIGHTH: MusicalTime = Self(Rational64::new_raw(1, 2));

    /// The shortest duration that survives an edit: one pulse at [Self::PPQN].
    pub const MIN_DURATION: MusicalTime = Self(Rational64::new_raw(1, Self::PPQN));

    pub const fn new_with_beats(beats: i64) -> Self {
        Self(Rational64::new_raw(beats, 1))
    }

    /// Creates a [MusicalTime] of `numer / denom` beats. Panics if `denom` is
    /// zero.
    pub fn new_with_ratio(numer: i64, denom: i64) -> Self {
        Self(Rational64::new(numer, denom))
    }

    pub fn new_with_ticks(ticks: i64, ticks_per_quarter: u16) -> Self {
        Self::new_with_ratio(ticks, ticks_per_quarter.max(1) as i64)
    }

    /// The number of MIDI ticks at the given resolution, rounded to the
    /// nearest tick. None if the tick count doesn't fit in an i64.
    pub fn checked_ticks(&self, ticks_per_quarter: u16) -> Option<i64> {
        self.checked_mul(ticks_per_quarter as i64)
            .map(|t| t.0.round().to_integer())
    }

    pub const fn as_ratio(&self) -> Rational64 {
        self.0
    }

    /// The smallest whole-beat time that is at least this one.
    pub fn ceil_to_beat(&self) -> Self {
        let whole = self.0.trunc();
        if self.0.is_integer() || self.is_negative() {
            Self(whole)
        } else {
            Self(
                whole
                    .checked_add(&Rational64::from_integer(1))
                    .unwrap_or(whole),
            )
        }
    }

    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        self.0.checked_add(&rhs.0).map(Self)
    }

    pub fn checked_sub(&self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(&rhs.0).map(Self)
    }

    pub fn checked_mul(&self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(&Rational64::from_integer(rhs)).map(Self)
    }

    /// None on overflow or when `rhs` is zero.
    pub fn checked_div(&self, rhs: i64) -> Option<Self> {
        self.0.checked_div(&Rational64::from_integer(rhs)).map(Self)
    }

    /// The remainder after dividing by `rhs`, with the sign of `self`. None on
    /// overflow or when `rhs` is zero.
    pub fn checked_rem(&self, rhs: Self) -> Option<Self> {
        let quotient = self.0.checked_div(&rhs.0)?.trunc();
        let whole = rhs.0.checked_mul(&quotient)?;
        self.0.checked_sub(&whole).map(Self)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Rational64::default()
    }

    /// Returns true if the value is zero. This is valid because we sometimes
    /// use [MusicalTime] to represent durations from time zero.
    pub fn is_empty(&self) -> bool {
        self.0 == Rational64::default()
    }
}
impl Display for MusicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{} beats", self.0.numer())
        } else {
            write!(f, "{}/{} beats", self.0.numer(), self.0.denom())
        }
    }
}
impl From<Rational64> for MusicalTime {
    fn from(value: Rational64) -> Self {
        Self(value)
    }
}
impl Add for MusicalTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for MusicalTime {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
impl Sub for MusicalTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl SubAssign for MusicalTime {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}
impl Neg for MusicalTime {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tempo_default_is_sane() {
        assert_eq!(Tempo::default().0, 120.0);
        assert_eq!(Tempo::from(90), Tempo(90.0));
    }

    #[test]
    fn tempo_converts_to_and_from_microseconds() {
        assert_eq!(Tempo::from_microseconds_per_beat(500_000), Tempo(120.0));
        assert_eq!(Tempo(120.0).microseconds_per_beat(), 500_000);
        assert_eq!(Tempo(60.0).microseconds_per_beat(), 1_000_000);

        // Degenerate input falls back to the default rather than dividing by
        // zero.
        assert_eq!(Tempo::from_microseconds_per_beat(0), Tempo::default());
    }

    #[test]
    fn musical_time_at_time_zero() {
        let t = MusicalTime::default();
        assert_eq!(t, MusicalTime::START);
        assert!(t.is_empty());
        assert!(!t.is_negative());
        assert_eq!(t.ceil_to_beat(), MusicalTime::START);
    }

    #[test]
    fn musical_time_arithmetic_is_exact() {
        let twelfth = MusicalTime::new_with_ratio(1, 12);
        assert_eq!(twelfth.checked_div(2), Some(MusicalTime::MIN_DURATION));
        assert_eq!(MusicalTime::MIN_DURATION.checked_mul(2), Some(twelfth));
        assert_eq!(
            MusicalTime::new_with_ratio(1, 3) + MusicalTime::new_with_ratio(2, 3),
            MusicalTime::ONE_BEAT
        );
        assert!((MusicalTime::START - MusicalTime::ONE_BEAT).is_negative());
        assert_eq!(-MusicalTime::ONE_BEAT, MusicalTime::new_with_beats(-1));
    }

    #[test]
    fn musical_time_tick_conversions() {
        assert_eq!(MusicalTime::new_with_ticks(480, 480), MusicalTime::ONE_BEAT);
        assert_eq!(
            MusicalTime::new_with_ticks(240, 480),
            MusicalTime::DURATION_EIGHTH
        );
        assert_eq!(MusicalTime::MIN_DURATION.checked_ticks(480), Some(20));
        assert_eq!(MusicalTime::new_with_beats(3).checked_ticks(96), Some(288));

        // 1/7 beat at 480 tpq is 68.57 ticks, which rounds up.
        assert_eq!(MusicalTime::new_with_ratio(1, 7).checked_ticks(480), Some(69));
    }

    #[test]
    fn musical_time_rounding_helpers() {
        let t = MusicalTime::new_with_ratio(9, 4);
        assert_eq!(t.ceil_to_beat(), MusicalTime::new_with_beats(3));
        assert_eq!(
            MusicalTime::new_with_ratio(-9, 4).ceil_to_beat(),
            MusicalTime::new_with_beats(-2)
        );
        assert_eq!(
            MusicalTime::new_with_beats(5).checked_rem(MusicalTime::new_with_beats(4)),
            Some(MusicalTime::ONE_BEAT)
        );
        assert_eq!(
            MusicalTime::new_with_ratio(-1, 2).checked_rem(MusicalTime::new_with_beats(4)),
            Some(MusicalTime::new_with_ratio(-1, 2))
        );
        assert_eq!(MusicalTime::ONE_BEAT.checked_rem(MusicalTime::START), None);
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        let huge = MusicalTime::new_with_beats(i64::MAX / 2 + 1);
        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!((-huge).checked_sub(huge + MusicalTime::ONE_BEAT), None);
        assert_eq!(
            huge.checked_sub(MusicalTime::ONE_BEAT),
            Some(MusicalTime::new_with_beats(i64::MAX / 2))
        );
        assert_eq!(huge.checked_ticks(480), None);
        assert_eq!(MusicalTime::ONE_BEAT.checked_div(0), None);

        let tiny = MusicalTime::new_with_ratio(1, i64::MAX / 2 + 1);
        assert_eq!(tiny.checked_div(2), None);
        assert_eq!(tiny.checked_mul(2), Some(MusicalTime::new_with_ratio(1, i64::MAX / 4 + 1)));
    }

    #[test]
    fn musical_time_display() {
        assert_eq!(MusicalTime::new_with_beats(4).to_string(), "4 beats");
        assert_eq!(MusicalTime::MIN_DURATION.to_string(), "1/24 beats");
    }
}
