// Copyright (c) 2024 Mike Tsao

use crate::{
    composition::{NoteEvent, Track, TrackUid, TrackUidFactory},
    elements::Transport,
    orchestration::{MidiEndpoint, OutputRouting},
    traits::Serializable,
    types::{MusicalTime, Tempo},
    util::ModSerial,
};
use derivative::Derivative;
use derive_builder::Builder;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A set of track indices chosen by the caller for one operation. Indices are
/// positional, so a selection goes stale as soon as tracks are removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackSelection(FxHashSet<usize>);
impl TrackSelection {
    /// Selects every index in `0..track_count`.
    pub fn all(track_count: usize) -> Self {
        Self::from_iter(0..track_count)
    }

    #[allow(missing_docs)]
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// Adds an index. Returns false if it was already selected.
    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The selected indices, smallest first.
    pub fn ascending(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.0.iter().copied().collect();
        indices.sort_unstable();
        indices
    }
}
impl FromIterator<usize> for TrackSelection {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl<const N: usize> From<[usize; N]> for TrackSelection {
    fn from(indices: [usize; N]) -> Self {
        Self::from_iter(indices)
    }
}

/// A [Sequence] is a looping collection of [Track]s.
///
/// Tracks are addressed by their position in the list. Removing a track shifts
/// every later track down by one, so callers that need a handle that survives
/// deletion should hold on to the [TrackUid] instead and resolve it with
/// [Sequence::track_index()].
///
/// [Sequence] itself enforces nothing about its length. Keeping the length at
/// or above the minimum loop length is the editor's job.
#[derive(Debug, Derivative, Serialize, Deserialize, Builder)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct Sequence {
    #[builder(setter(skip))]
    uid_factory: TrackUidFactory,

    /// The tracks, in display order.
    #[builder(default, setter(each(name = "track", into)))]
    tracks: Vec<Track>,

    /// Where playback wraps when looping is on.
    #[derivative(Default(value = "MusicalTime::new_with_beats(4)"))]
    #[builder(default = "MusicalTime::new_with_beats(4)")]
    length: MusicalTime,

    #[builder(default)]
    loop_enabled: bool,

    #[builder(default)]
    tempo: Tempo,

    /// The resolution the sequence was loaded at, and the one it will be
    /// written at.
    #[derivative(Default(value = "480"))]
    #[builder(default = "480")]
    ticks_per_quarter: u16,

    #[builder(setter(skip))]
    #[serde(skip)]
    e: SequenceEphemerals,
}
/// Non-persistent portions of [Sequence].
#[derive(Debug, Default)]
pub struct SequenceEphemerals {
    transport: Transport,
    routing: OutputRouting,

    // Changes whenever the sequence does.
    mod_serial: ModSerial,
}
impl SequenceBuilder {
    /// Builds the [Sequence], giving each of its tracks a fresh [TrackUid].
    pub fn build(&self) -> Result<Sequence, SequenceBuilderError> {
        match self.build_from_builder() {
            Ok(mut s) => {
                if !(1..=Sequence::MAX_TICKS_PER_QUARTER).contains(&s.ticks_per_quarter) {
                    return Err(SequenceBuilderError::ValidationError(format!(
                        "ticks_per_quarter must be between 1 and {}",
                        Sequence::MAX_TICKS_PER_QUARTER
                    )));
                }
                s.assign_uids();
                s.e.routing.reset(s.tracks.len());
                Ok(s)
            }
            Err(e) => Err(e),
        }
    }
}
impl Sequence {
    /// The finest resolution a Standard MIDI File header can hold.
    pub const MAX_TICKS_PER_QUARTER: u16 = 0x7fff;

    /// Creates a [Sequence] from a list of tracks. Each track gets a fresh
    /// [TrackUid].
    pub fn new_with_tracks(tracks: Vec<Track>) -> Self {
        let mut r = Self {
            tracks,
            ..Default::default()
        };
        r.assign_uids();
        r.e.routing.reset(r.tracks.len());
        r
    }

    fn assign_uids(&mut self) {
        for track in self.tracks.iter_mut() {
            track.set_uid(self.uid_factory.mint_next());
        }
    }

    fn mark_changed(&mut self) {
        self.e.mod_serial.bump();
    }

    #[allow(missing_docs)]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The track at `index`, if there is one.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    #[allow(missing_docs)]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// The current position of the track with the given uid.
    pub fn track_index(&self, uid: TrackUid) -> Option<usize> {
        self.tracks.iter().position(|t| t.uid() == uid)
    }

    /// Appends a track and returns its new uid. The new track has no output
    /// until the global output is bound again.
    pub fn add_track(&mut self, mut track: Track) -> TrackUid {
        let uid = self.uid_factory.mint_next();
        track.set_uid(uid);
        self.tracks.push(track);
        self.e.routing.push_track();
        self.mark_changed();
        uid
    }

    /// Removes the track at `index` and returns it. Tracks after it move down
    /// one place and lose their outputs.
    pub fn delete_track(&mut self, index: usize) -> Option<Track> {
        if index < self.tracks.len() {
            let track = self.tracks.remove(index);
            self.e.routing.remove_track(index);
            self.mark_changed();
            Some(track)
        } else {
            None
        }
    }

    /// Swaps in a whole new list of notes for the track at `index`. Returns
    /// false if there's no such track.
    pub fn replace_note_data(&mut self, index: usize, notes: Vec<NoteEvent>) -> bool {
        if let Some(track) = self.tracks.get_mut(index) {
            track.replace_note_data(notes);
            self.mark_changed();
            true
        } else {
            false
        }
    }

    /// The loop length.
    pub fn length(&self) -> MusicalTime {
        self.length
    }

    #[allow(missing_docs)]
    pub fn set_length(&mut self, length: MusicalTime) {
        self.length = length;
        self.mark_changed();
    }

    /// When the last note of any track stops sounding.
    pub fn end(&self) -> MusicalTime {
        self.tracks
            .iter()
            .map(|t| t.end())
            .max()
            .unwrap_or(MusicalTime::START)
    }

    #[allow(missing_docs)]
    pub fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Turns looping on. Playback wraps at [Sequence::length()].
    pub fn enable_looping(&mut self) {
        self.loop_enabled = true;
        self.mark_changed();
    }

    #[allow(missing_docs)]
    pub fn disable_looping(&mut self) {
        self.loop_enabled = false;
        self.mark_changed();
    }

    #[allow(missing_docs)]
    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    #[allow(missing_docs)]
    pub fn set_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
        self.mark_changed();
    }

    #[allow(missing_docs)]
    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    /// Sends every track's output to `endpoint`.
    pub fn set_global_midi_output(&mut self, endpoint: MidiEndpoint) {
        self.e.routing.bind_global(endpoint, self.tracks.len());
    }

    /// The endpoint the track at `index` currently plays through.
    pub fn output_for(&self, index: usize) -> Option<&MidiEndpoint> {
        self.e.routing.output(index)
    }

    #[allow(missing_docs)]
    pub fn routing(&self) -> &OutputRouting {
        &self.e.routing
    }

    /// Whether every track plays through the global output.
    pub fn is_fully_routed(&self) -> bool {
        self.e.routing.is_fully_bound(self.tracks.len())
    }

    /// Starts playback from wherever the transport is now.
    pub fn play(&mut self) {
        self.e.transport.play();
    }

    /// Stops playback. Stopping a stopped sequence rewinds it.
    pub fn stop(&mut self) {
        self.e.transport.stop();
    }

    /// Moves the transport back to the start.
    pub fn rewind(&mut self) {
        self.e.transport.skip_to_start();
    }

    #[allow(missing_docs)]
    pub fn is_playing(&self) -> bool {
        self.e.transport.is_performing()
    }

    #[allow(missing_docs)]
    pub fn current_time(&self) -> MusicalTime {
        self.e.transport.current_time()
    }

    /// Moves the transport forward by `delta`, honoring the loop settings.
    pub fn advance(&mut self, delta: MusicalTime) -> MusicalTime {
        self.e
            .transport
            .advance(delta, self.length, self.loop_enabled)
    }

    /// Use like this:
    ///
    /// ```no_run
    /// use loopsmith::composition::Sequence;
    ///
    /// let sequence = Sequence::default();
    /// let mut sequence_serial = 0;
    ///
    /// if sequence.has_changed(&mut sequence_serial) {
    ///     // Update local data
    /// } else {
    ///     // We're up to date, nothing to do
    /// }
    /// ```
    pub fn has_changed(&self, last_known: &mut usize) -> bool {
        self.e.mod_serial.has_changed(last_known)
    }
}
impl Serializable for Sequence {
    fn after_deser(&mut self) {
        for track in self.tracks.iter() {
            self.uid_factory.notify_externally_minted_uid(track.uid());
        }
        self.e.routing.reset(self.tracks.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrossbeamChannel;

    fn tracks(count: usize) -> Vec<Track> {
        (0..count)
            .map(|i| {
                Track::new_with(
                    &format!("Track {i}"),
                    vec![NoteEvent::new_with(
                        60 + i as u8,
                        MusicalTime::START,
                        MusicalTime::ONE_BEAT,
                    )],
                )
            })
            .collect()
    }

    #[test]
    fn selection_basics() {
        let selection = TrackSelection::from([3, 1, 3, 0]);
        assert_eq!(selection.len(), 3);
        assert_eq!(selection.ascending(), vec![0, 1, 3]);
        assert!(selection.contains(1));
        assert!(!selection.contains(2));
        assert_eq!(TrackSelection::all(3).ascending(), vec![0, 1, 2]);
        assert!(TrackSelection::default().is_empty());
    }

    #[test]
    fn sequence_defaults() {
        let s = Sequence::default();
        assert_eq!(s.length(), MusicalTime::new_with_beats(4));
        assert!(!s.loop_enabled());
        assert_eq!(s.ticks_per_quarter(), 480);
        assert_eq!(s.track_count(), 0);
        assert!(s.is_fully_routed());
    }

    #[test]
    fn builder_mints_unique_uids() {
        let s = SequenceBuilder::default()
            .tracks(tracks(3))
            .loop_enabled(true)
            .build()
            .unwrap();
        assert!(s.loop_enabled());
        let uids: FxHashSet<TrackUid> = s.tracks().iter().map(|t| t.uid()).collect();
        assert_eq!(uids.len(), 3);

        assert!(SequenceBuilder::default()
            .ticks_per_quarter(0)
            .build()
            .is_err());
        assert!(SequenceBuilder::default()
            .ticks_per_quarter(Sequence::MAX_TICKS_PER_QUARTER + 1)
            .build()
            .is_err());
        assert!(SequenceBuilder::default()
            .ticks_per_quarter(Sequence::MAX_TICKS_PER_QUARTER)
            .build()
            .is_ok());
    }

    #[test]
    fn uids_survive_deletion() {
        let mut s = Sequence::new_with_tracks(tracks(3));
        let last_uid = s.tracks()[2].uid();
        assert_eq!(s.track_index(last_uid), Some(2));

        let removed = s.delete_track(0).unwrap();
        assert_eq!(removed.title().0, "Track 0");
        assert_eq!(s.track_index(last_uid), Some(1));
        assert_eq!(s.track_index(removed.uid()), None);
        assert!(s.delete_track(5).is_none());

        let new_uid = s.add_track(Track::default());
        assert_ne!(new_uid, last_uid);
        assert_eq!(s.track_index(new_uid), Some(2));
    }

    #[test]
    fn mutations_are_observable() {
        let mut s = Sequence::new_with_tracks(tracks(2));
        let mut last_known = 0;
        assert!(s.has_changed(&mut last_known));
        assert!(!s.has_changed(&mut last_known));

        assert!(s.replace_note_data(1, Vec::default()));
        assert!(s.has_changed(&mut last_known));
        assert!(s.track(1).unwrap().is_empty());

        assert!(!s.replace_note_data(2, Vec::default()));
        assert!(!s.has_changed(&mut last_known));

        s.enable_looping();
        assert!(s.has_changed(&mut last_known));
    }

    #[test]
    fn routing_follows_structure() {
        let channel = CrossbeamChannel::default();
        let endpoint = MidiEndpoint::new_with("sink", channel.sender.clone());

        let mut s = Sequence::new_with_tracks(tracks(3));
        assert!(!s.is_fully_routed());
        s.set_global_midi_output(endpoint.clone());
        assert!(s.is_fully_routed());

        s.delete_track(0);
        assert!(!s.is_fully_routed());
        assert!(s.output_for(0).is_none());

        s.set_global_midi_output(endpoint.clone());
        assert!(s.is_fully_routed());

        s.add_track(Track::default());
        assert!(!s.is_fully_routed());
        s.set_global_midi_output(endpoint);
        assert!(s.is_fully_routed());
    }

    #[test]
    fn transport_loops_at_length() {
        let mut s = Sequence::new_with_tracks(tracks(1));
        s.enable_looping();
        s.play();
        assert!(s.is_playing());
        assert_eq!(
            s.advance(MusicalTime::new_with_beats(5)),
            MusicalTime::ONE_BEAT
        );
        s.stop();
        s.rewind();
        assert_eq!(s.current_time(), MusicalTime::START);
    }

    #[test]
    fn json_round_trip_keeps_uids_unique() {
        let s = Sequence::new_with_tracks(tracks(2));
        let json = serde_json::to_string(&s).unwrap();
        let mut restored: Sequence = serde_json::from_str(&json).unwrap();
        restored.after_deser();

        assert_eq!(restored.tracks(), s.tracks());
        let new_uid = restored.add_track(Track::default());
        assert!(s.tracks().iter().all(|t| t.uid() != new_uid));
    }
}
