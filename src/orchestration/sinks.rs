// Copyright (c) 2024 Mike Tsao

use crate::{
    orchestration::MidiEndpoint,
    traits::SoundSink,
    types::{CrossbeamChannel, MidiEvent},
};

/// A [SoundSink] that makes no sound. It queues whatever MIDI it receives, so
/// it's handy for headless runs and for checking what a sequence sent.
#[derive(Debug, Default)]
pub struct NullSink {
    channel: CrossbeamChannel<MidiEvent>,
    start_count: usize,
    should_fail_to_start: bool,
}
impl NullSink {
    /// A sink whose [SoundSink::start()] always fails.
    pub fn new_failing() -> Self {
        Self {
            should_fail_to_start: true,
            ..Default::default()
        }
    }

    /// How many times the sink has been started.
    pub fn start_count(&self) -> usize {
        self.start_count
    }

    /// Everything received since the last call.
    pub fn received(&self) -> Vec<MidiEvent> {
        self.channel.receiver.try_iter().collect()
    }
}
impl SoundSink for NullSink {
    fn midi_in(&self) -> MidiEndpoint {
        MidiEndpoint::new_with("null sink", self.channel.sender.clone())
    }

    fn start(&mut self) -> anyhow::Result<()> {
        if self.should_fail_to_start {
            return Err(anyhow::anyhow!("the null sink was told not to start"));
        }
        self.start_count += 1;
        Ok(())
    }
}
