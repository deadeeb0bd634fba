// Copyright (c) 2024 Mike Tsao

use crate::{
    composition::{NoteEvent, PitchClassFilter, Sequence, Track, TrackSelection, TrackUid},
    error::{EncodeError, LoadError},
    traits::SoundSink,
    types::MusicalTime,
    util::{EditorSettings, MidiFileCodec, SequenceLibrary},
};
use std::path::PathBuf;

/// [SequenceEditor] owns the [Sequence] being edited and is the only thing
/// that changes it.
///
/// Every edit takes a [TrackSelection]. Indices that don't name a current
/// track are skipped, and when there's no sequence at all, edits do nothing.
/// Each selected track gets a whole new list of notes, computed in full
/// before it's installed.
///
/// After a structural change, the editor makes sure that the loop is at least
/// [EditorSettings::min_loop_length()] long, that looping is still on if it
/// was before, and that every track is routed to the [SoundSink].
///
/// ```
/// use loopsmith::prelude::*;
///
/// let sequence = Sequence::new_with_tracks(vec![Track::new_with(
///     "Lead",
///     vec![NoteEvent::new_with(60, MusicalTime::START, MusicalTime::ONE_BEAT)],
/// )]);
/// let mut editor = SequenceEditor::new_with(
///     Some(sequence),
///     Box::new(NullSink::default()),
///     EditorSettings::default(),
/// );
/// editor.shift_right(&TrackSelection::from([0]));
/// editor.double_lengths(&TrackSelection::from([0]));
///
/// let note = editor.sequence().unwrap().tracks()[0].notes()[0];
/// assert_eq!(note.position, MusicalTime::new_with_beats(2));
/// assert_eq!(note.duration, MusicalTime::new_with_beats(2));
/// ```
#[derive(Debug)]
pub struct SequenceEditor {
    sequence: Option<Sequence>,
    sink: Box<dyn SoundSink>,
    settings: EditorSettings,
    filter: PitchClassFilter,
}
impl SequenceEditor {
    /// Takes charge of `sequence`, binds it to `sink`, and starts the sink. If
    /// the sink won't start, the error is logged and editing still works.
    pub fn new_with(
        sequence: Option<Sequence>,
        sink: Box<dyn SoundSink>,
        settings: EditorSettings,
    ) -> Self {
        let mut r = Self {
            sequence,
            sink,
            settings,
            filter: PitchClassFilter::default(),
        };
        r.prepare_sequence();
        if let Err(e) = r.sink.start() {
            log::error!("Couldn't start the sound sink: {e:?}");
        }
        r
    }

    /// Like [SequenceEditor::new_with()], but first loads the named asset from
    /// `library`.
    pub fn load(
        name: &str,
        library: &SequenceLibrary,
        sink: Box<dyn SoundSink>,
        settings: EditorSettings,
    ) -> Result<Self, LoadError> {
        let sequence = library.load(name)?;
        Ok(Self::new_with(Some(sequence), sink, settings))
    }

    /// Replaces the current sequence with a freshly loaded one and prepares it
    /// the same way a new editor would.
    pub fn reload(&mut self, sequence: Sequence) {
        if let Some(old) = self.sequence.as_mut() {
            old.stop();
        }
        self.sequence = Some(sequence);
        self.prepare_sequence();
    }

    fn prepare_sequence(&mut self) {
        let min_loop_length = self.settings.min_loop_length();
        let endpoint = self.sink.midi_in();
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.set_length(min_loop_length);
            sequence.enable_looping();
            sequence.set_global_midi_output(endpoint);
        }
    }

    #[allow(missing_docs)]
    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Settings changes apply to the next edit.
    pub fn settings_mut(&mut self) -> &mut EditorSettings {
        &mut self.settings
    }

    #[allow(missing_docs)]
    pub fn filter(&self) -> &PitchClassFilter {
        &self.filter
    }

    #[allow(missing_docs)]
    pub fn sink(&self) -> &dyn SoundSink {
        self.sink.as_ref()
    }

    fn apply_to(
        sequence: Option<&mut Sequence>,
        selection: &TrackSelection,
        mut transform: impl FnMut(NoteEvent) -> NoteEvent,
    ) {
        let Some(sequence) = sequence else {
            log::debug!("no sequence to edit");
            return;
        };
        for index in selection.ascending() {
            let Some(track) = sequence.track(index) else {
                log::debug!(
                    "ignoring track index {index}; there are only {} tracks",
                    sequence.track_count()
                );
                continue;
            };
            let notes: Vec<NoteEvent> = track.notes().iter().map(|n| transform(*n)).collect();
            sequence.replace_note_data(index, notes);
        }
    }

    /// Replaces every note in each selected track with `transform(note)`,
    /// keeping the notes in the same order.
    pub fn apply_to_selected_tracks(
        &mut self,
        selection: &TrackSelection,
        transform: impl FnMut(NoteEvent) -> NoteEvent,
    ) {
        Self::apply_to(self.sequence.as_mut(), selection, transform);
    }

    /// Runs a caller-supplied transform over the selected tracks. Whatever the
    /// transform returns is installed as is.
    pub fn filter_notes(
        &mut self,
        selection: &TrackSelection,
        transform: impl FnMut(NoteEvent) -> NoteEvent,
    ) {
        self.apply_to_selected_tracks(selection, transform);
    }

    /// Sets the offset for one pitch class in the editor's
    /// [PitchClassFilter]. Nothing changes in the sequence until
    /// [SequenceEditor::apply_pitch_class_filter()].
    pub fn set_offset(&mut self, pitch_class: i32, offset: i32) {
        self.filter.set_offset(pitch_class, offset);
    }

    /// Transposes the selected tracks through the editor's [PitchClassFilter].
    pub fn apply_pitch_class_filter(&mut self, selection: &TrackSelection) {
        Self::apply_to(self.sequence.as_mut(), selection, self.filter.transform_fn());
    }

    /// Doubles each note's position and duration. A value that would overflow
    /// stays as it is.
    pub fn double_lengths(&mut self, selection: &TrackSelection) {
        let floor = self.settings.position_floor();
        self.apply_to_selected_tracks(selection, |n| NoteEvent {
            position: floor.apply(Self::or_unchanged(&n, n.position.checked_mul(2), n.position)),
            duration: Self::or_unchanged(&n, n.duration.checked_mul(2), n.duration),
            ..n
        });
    }

    /// Halves each note's position and duration. A duration that would drop
    /// below [MusicalTime::MIN_DURATION] stays as it is, and so does a
    /// position too fine to represent.
    pub fn halve_lengths(&mut self, selection: &TrackSelection) {
        let floor = self.settings.position_floor();
        self.apply_to_selected_tracks(selection, |n| {
            let duration = match n.duration.checked_div(2) {
                Some(halved) if halved >= MusicalTime::MIN_DURATION => halved,
                _ => {
                    log::warn!(
                        "Note {} at {} is already too short to halve",
                        n.key,
                        n.position
                    );
                    n.duration
                }
            };
            NoteEvent {
                position: floor.apply(Self::or_unchanged(
                    &n,
                    n.position.checked_div(2),
                    n.position,
                )),
                duration,
                ..n
            }
        });
    }

    /// Moves each note one beat later.
    pub fn shift_right(&mut self, selection: &TrackSelection) {
        let floor = self.settings.position_floor();
        self.apply_to_selected_tracks(selection, |n| NoteEvent {
            position: floor.apply(Self::or_unchanged(
                &n,
                n.position.checked_add(MusicalTime::ONE_BEAT),
                n.position,
            )),
            ..n
        });
    }

    /// Moves each note one beat earlier.
    pub fn shift_left(&mut self, selection: &TrackSelection) {
        let floor = self.settings.position_floor();
        self.apply_to_selected_tracks(selection, |n| NoteEvent {
            position: floor.apply(Self::or_unchanged(
                &n,
                n.position.checked_sub(MusicalTime::ONE_BEAT),
                n.position,
            )),
            ..n
        });
    }

    fn or_unchanged(
        n: &NoteEvent,
        edited: Option<MusicalTime>,
        current: MusicalTime,
    ) -> MusicalTime {
        edited.unwrap_or_else(|| {
            log::warn!("Note {} at {} can't be edited any further", n.key, n.position);
            current
        })
    }

    /// Deletes the selected tracks. Playback stops first and stays stopped.
    ///
    /// The selection refers to the tracks as they were before the call, so
    /// deleting `{1, 3}` from five tracks removes the second and fourth and
    /// leaves the first, third, and fifth.
    pub fn delete_tracks(&mut self, selection: &TrackSelection) {
        let Some(sequence) = self.sequence.as_mut() else {
            log::debug!("no sequence to delete tracks from");
            return;
        };
        sequence.stop();

        let mut indices = selection.ascending();
        for i in 0..indices.len() {
            let index = indices[i];
            if sequence.delete_track(index).is_none() {
                log::debug!("ignoring track index {index} during delete");
                continue;
            }
            indices[i + 1..].iter_mut().for_each(|later| *later -= 1);
        }
        self.notify_structure_changed();
    }

    /// Appends a track. Returns its uid, or None if there's no sequence.
    pub fn add_track(&mut self, track: Track) -> Option<TrackUid> {
        let uid = self.sequence.as_mut()?.add_track(track);
        self.notify_structure_changed();
        Some(uid)
    }

    /// Call after anything that adds or removes tracks. Restores the minimum
    /// loop length, reasserts looping, and routes every track to the sink.
    pub fn notify_structure_changed(&mut self) {
        let min_loop_length = self.settings.min_loop_length();
        let endpoint = self.sink.midi_in();
        let Some(sequence) = self.sequence.as_mut() else {
            return;
        };
        if sequence.length() < min_loop_length {
            sequence.set_length(min_loop_length);
        }
        if sequence.loop_enabled() {
            sequence.enable_looping();
        }
        sequence.set_global_midi_output(endpoint);
    }

    /// Starts playback from the beginning.
    pub fn play(&mut self) {
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.rewind();
            sequence.play();
        }
    }

    #[allow(missing_docs)]
    pub fn stop(&mut self) {
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.stop();
        }
    }

    /// Moves playback forward by `delta` and returns the new time.
    pub fn advance(&mut self, delta: MusicalTime) -> Option<MusicalTime> {
        self.sequence.as_mut().map(|s| s.advance(delta))
    }

    /// The sequence as Standard MIDI File bytes.
    pub fn export_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        match self.sequence.as_ref() {
            Some(sequence) => MidiFileCodec::encode(sequence),
            None => Err(EncodeError::Empty),
        }
    }

    /// Writes the sequence to [EditorSettings::export_file_name()] in the
    /// system's temporary directory and returns where it went. Failures are
    /// logged, and the result is None.
    pub fn export_to_temp_dir(&self) -> Option<PathBuf> {
        let sequence = self.sequence.as_ref()?;
        match MidiFileCodec::export_to_temp_dir(sequence, self.settings.export_file_name()) {
            Ok(path) => Some(path),
            Err(e) => {
                log::error!("Couldn't export the sequence: {e}");
                None
            }
        }
    }
}
