// Copyright (c) 2024 Mike Tsao

use crate::types::MidiEvent;
use crossbeam::channel::Sender;

/// A [MidiEndpoint] is the input side of whatever will turn MIDI into sound.
/// It's cheap to clone; every clone feeds the same receiver.
#[derive(Clone, Debug)]
pub struct MidiEndpoint {
    name: String,
    sender: Sender<MidiEvent>,
}
impl MidiEndpoint {
    #[allow(missing_docs)]
    pub fn new_with(name: &str, sender: Sender<MidiEvent>) -> Self {
        Self {
            name: name.to_string(),
            sender,
        }
    }

    /// A human-readable name for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends an event without blocking. Returns false, after logging, if the
    /// receiver is gone or full.
    pub fn send(&self, event: MidiEvent) -> bool {
        if let Err(e) = self.sender.try_send(event) {
            log::warn!("While sending to {}: {e:?}", self.name);
            false
        } else {
            true
        }
    }

    /// Whether both endpoints feed the same receiver.
    pub fn is_same_endpoint(&self, other: &MidiEndpoint) -> bool {
        self.sender.same_channel(&other.sender)
    }
}

/// [OutputRouting] records which [MidiEndpoint] each track plays through.
///
/// Bindings are positional, like the tracks themselves. When a track is
/// removed, every track after it is renumbered and loses its binding, and a
/// newly added track starts unbound. The remedy in both cases is to bind the
/// global output again with [OutputRouting::bind_global()].
#[derive(Debug, Default)]
pub struct OutputRouting {
    global: Option<MidiEndpoint>,
    outputs: Vec<Option<MidiEndpoint>>,
}
impl OutputRouting {
    /// Routes all `track_count` tracks to `endpoint`, replacing any previous
    /// bindings.
    pub fn bind_global(&mut self, endpoint: MidiEndpoint, track_count: usize) {
        self.outputs = vec![Some(endpoint.clone()); track_count];
        self.global = Some(endpoint);
    }

    /// Leaves `track_count` unbound slots and forgets the global output.
    pub fn reset(&mut self, track_count: usize) {
        self.outputs = vec![None; track_count];
        self.global = None;
    }

    /// Makes room for a newly appended track, which starts out unbound.
    pub fn push_track(&mut self) {
        self.outputs.push(None);
    }

    /// Forgets the track at `index`. The tracks after it shift down and lose
    /// their bindings.
    pub fn remove_track(&mut self, index: usize) {
        if index < self.outputs.len() {
            self.outputs.remove(index);
            self.outputs[index..].iter_mut().for_each(|o| *o = None);
        }
    }

    /// The endpoint the track at `index` plays through, if it's bound.
    pub fn output(&self, index: usize) -> Option<&MidiEndpoint> {
        self.outputs.get(index).and_then(|o| o.as_ref())
    }

    /// The endpoint most recently bound with [OutputRouting::bind_global()].
    pub fn global(&self) -> Option<&MidiEndpoint> {
        self.global.as_ref()
    }

    /// Whether each of `track_count` tracks is bound to the global output.
    pub fn is_fully_bound(&self, track_count: usize) -> bool {
        let Some(global) = self.global.as_ref() else {
            return track_count == 0;
        };
        self.outputs.len() == track_count
            && self
                .outputs
                .iter()
                .all(|o| o.as_ref().is_some_and(|e| e.is_same_endpoint(global)))
    }
}
