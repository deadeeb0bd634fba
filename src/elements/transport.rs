// Copyright (c) 2024 Mike Tsao

use crate::types::MusicalTime;

/// [Transport] is the sequence's clock. It keeps track of the current
/// position, whether playback is running, and how time should advance given
/// the sequence's loop settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transport {
    /// The time pointer within the sequence.
    current_time: MusicalTime,

    is_performing: bool,
}
impl Transport {
    /// Advances the clock by `delta` and returns the new time.
    ///
    /// With looping on, time wraps at `length`. With looping off, time stops at
    /// `length` and performance ends. When the transport isn't performing, the
    /// clock doesn't move.
    pub fn advance(
        &mut self,
        delta: MusicalTime,
        length: MusicalTime,
        is_looping: bool,
    ) -> MusicalTime {
        if !self.is_performing {
            return self.current_time;
        }
        let Some(new_time) = self.current_time.checked_add(delta) else {
            log::warn!("can't advance {} by {delta}", self.current_time);
            return self.current_time;
        };
        if length <= MusicalTime::DURATION_ZERO {
            self.current_time = MusicalTime::START;
            self.is_performing = false;
        } else if is_looping {
            match new_time.checked_rem(length) {
                Some(wrapped) => self.current_time = wrapped,
                None => log::warn!("can't wrap {new_time} at {length}"),
            }
        } else if new_time >= length {
            self.current_time = length;
            self.is_performing = false;
        } else {
            self.current_time = new_time;
        }
        self.current_time
    }

    #[allow(missing_docs)]
    pub fn current_time(&self) -> MusicalTime {
        self.current_time
    }

    #[allow(missing_docs)]
    pub fn is_performing(&self) -> bool {
        self.is_performing
    }

    /// Starts playback from the current position.
    pub fn play(&mut self) {
        self.is_performing = true;
    }

    /// Halts playback. Stopping when already stopped resets the time to start,
    /// which gives the stop button a convenient dual function.
    pub fn stop(&mut self) {
        if self.is_performing {
            self.is_performing = false;
        } else {
            self.skip_to_start();
        }
    }

    /// Moves the clock back to the beginning without changing whether it's
    /// running.
    pub fn skip_to_start(&mut self) {
        self.current_time = MusicalTime::START;
    }
}
