// Copyright (c) 2024 Mike Tsao

//! Provides a sound sink that runs as a service.

use crate::traits::ProvidesService;
use crossbeam::channel::{Receiver, Select, Sender};
use loopsmith::{orchestration::MidiEndpoint, prelude::*};

/// The client controls the sink through [MidiSinkServiceInput] messages.
#[derive(Clone, Debug, PartialEq)]
pub enum MidiSinkServiceInput {
    /// Begin passing MIDI along. Until then, incoming MIDI is discarded.
    Start,

    /// The app is ready to quit, so the service should end.
    Quit,
}

/// The service reports to the client through [MidiSinkServiceEvent] messages.
#[derive(Clone, Debug, PartialEq)]
pub enum MidiSinkServiceEvent {
    /// The sink has processed [MidiSinkServiceInput::Start].
    Started,

    /// A MIDI event arrived at the sink while it was running. This is where a
    /// synthesizer would make sound.
    Midi(MidiEvent),

    /// The sink has processed [MidiSinkServiceInput::Quit], and the service
    /// will go away shortly.
    Quit,
}

/// A [SoundSink] that accepts MIDI on a crossbeam channel and handles it on its
/// own thread.
#[derive(Debug)]
pub struct MidiSinkService {
    midi: CrossbeamChannel<MidiEvent>,
    inputs: CrossbeamChannel<MidiSinkServiceInput>,
    events: CrossbeamChannel<MidiSinkServiceEvent>,
}
impl Default for MidiSinkService {
    fn default() -> Self {
        Self::new()
    }
}
impl MidiSinkService {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        let r = Self {
            midi: Default::default(),
            inputs: Default::default(),
            events: Default::default(),
        };
        r.spawn_thread();
        r
    }

    fn spawn_thread(&self) {
        let mut daemon = MidiSinkServiceDaemon {
            inputs: self.inputs.receiver.clone(),
            midi: self.midi.receiver.clone(),
            sender: self.events.sender.clone(),
            is_started: false,
        };
        std::thread::spawn(move || daemon.execute());
    }
}
impl ProvidesService<MidiSinkServiceInput, MidiSinkServiceEvent> for MidiSinkService {
    fn sender(&self) -> &Sender<MidiSinkServiceInput> {
        &self.inputs.sender
    }

    fn receiver(&self) -> &Receiver<MidiSinkServiceEvent> {
        &self.events.receiver
    }
}
impl SoundSink for MidiSinkService {
    fn midi_in(&self) -> MidiEndpoint {
        MidiEndpoint::new_with("MIDI sink service", self.midi.sender.clone())
    }

    fn start(&mut self) -> anyhow::Result<()> {
        self.inputs
            .sender
            .send(MidiSinkServiceInput::Start)
            .map_err(|e| anyhow::format_err!("Couldn't start the MIDI sink: {e}"))
    }
}

struct MidiSinkServiceDaemon {
    inputs: Receiver<MidiSinkServiceInput>,
    midi: Receiver<MidiEvent>,
    sender: Sender<MidiSinkServiceEvent>,
    is_started: bool,
}
impl MidiSinkServiceDaemon {
    fn execute(&mut self) {
        let inputs = self.inputs.clone();
        let midi = self.midi.clone();
        let mut sel = Select::new();
        let input_index = sel.recv(&inputs);
        let midi_index = sel.recv(&midi);

        loop {
            let operation = sel.select();
            match operation.index() {
                index if index == input_index => {
                    let Ok(input) = MidiSinkService::recv_operation(operation, &inputs) else {
                        // Everyone who could send us commands is gone.
                        return;
                    };
                    match input {
                        MidiSinkServiceInput::Start => {
                            self.is_started = true;
                            let _ = self.sender.send(MidiSinkServiceEvent::Started);
                        }
                        MidiSinkServiceInput::Quit => {
                            log::debug!("MidiSinkServiceInput::Quit");
                            let _ = self.sender.send(MidiSinkServiceEvent::Quit);
                            return;
                        }
                    }
                }
                index if index == midi_index => {
                    if let Ok(event) = MidiSinkService::recv_operation(operation, &midi) {
                        if self.is_started {
                            let _ = self.sender.send(MidiSinkServiceEvent::Midi(event));
                        } else {
                            log::debug!("discarding {event:?}; the sink hasn't started");
                        }
                    }
                }
                _ => {
                    log::error!("missing case for a new receiver");
                    return;
                }
            }
        }
    }
}
