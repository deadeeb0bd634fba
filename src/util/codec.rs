// Copyright (c) 2024 Mike Tsao

//! Reads and writes Standard MIDI Files.

use crate::{
    composition::{NoteEvent, Sequence, SequenceBuilder, Track},
    error::{EncodeError, LoadError},
    types::{MidiChannel, MusicalTime, Tempo},
};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use rustc_hash::FxHashMap;
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

/// A note whose note-on has been seen, with its end filled in once the
/// matching note-off turns up.
#[derive(Debug)]
struct PendingNote {
    start: u64,
    end: Option<u64>,
    key: u8,
    velocity: u8,
    channel: MidiChannel,
}

/// Everything we care about in one MIDI track.
#[derive(Debug, Default)]
struct ScannedTrack {
    title: Option<String>,
    tempo: Option<Tempo>,
    has_channel_messages: bool,
    notes: Vec<PendingNote>,
    last_tick: u64,
}
impl ScannedTrack {
    fn scan(events: &[TrackEvent]) -> Self {
        let mut r = Self::default();
        let mut active: FxHashMap<(u8, u8), VecDeque<usize>> = FxHashMap::default();
        let mut tick = 0u64;
        for event in events {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    r.has_channel_messages = true;
                    let channel = MidiChannel::from(channel);
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            active
                                .entry((channel.0, key.as_int()))
                                .or_default()
                                .push_back(r.notes.len());
                            r.notes.push(PendingNote {
                                start: tick,
                                end: None,
                                key: key.as_int(),
                                velocity: vel.as_int(),
                                channel,
                            });
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            if let Some(index) = active
                                .get_mut(&(channel.0, key.as_int()))
                                .and_then(|q| q.pop_front())
                            {
                                r.notes[index].end = Some(tick);
                            } else {
                                log::debug!("note-off for key {} without a note-on", key.as_int());
                            }
                        }
                        _ => {}
                    }
                }
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                    r.title = Some(String::from_utf8_lossy(name).to_string());
                }
                TrackEventKind::Meta(MetaMessage::Tempo(us_per_beat)) => {
                    if r.tempo.is_none() {
                        r.tempo = Some(Tempo::from_microseconds_per_beat(us_per_beat.as_int()));
                    }
                }
                _ => {}
            }
        }
        r.last_tick = tick;
        r
    }

    fn into_track(self, index: usize, ticks_per_quarter: u16) -> Track {
        let last_tick = self.last_tick;
        let notes = self
            .notes
            .into_iter()
            .filter_map(|n| {
                let end = n.end.unwrap_or(last_tick);
                if end <= n.start {
                    log::warn!(
                        "dropping zero-length note {} at tick {} in track {index}",
                        n.key,
                        n.start
                    );
                    return None;
                }
                Some(
                    NoteEvent::new_with(
                        n.key,
                        MusicalTime::new_with_ticks(n.start as i64, ticks_per_quarter),
                        MusicalTime::new_with_ticks((end - n.start) as i64, ticks_per_quarter),
                    )
                    .with_velocity(n.velocity)
                    .with_channel(n.channel),
                )
            })
            .collect();
        let title = self.title.unwrap_or_else(|| format!("Track {index}"));
        Track::new_with(&title, notes)
    }
}

/// Converts between [Sequence]s and Standard MIDI File bytes.
#[derive(Debug, Default)]
pub struct MidiFileCodec {}
impl MidiFileCodec {
    /// The longest gap between two events in one track.
    pub const MAX_DELTA_TICKS: u64 = 0x0fff_ffff;

    /// Parses a Standard MIDI File. `name` is used only for error messages.
    ///
    /// Only beat-based (metrical) timing is accepted. In a multitrack file,
    /// a first track without any channel messages is the conductor track: its
    /// tempo is kept, but it doesn't become a [Track].
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Sequence, LoadError> {
        let smf = Smf::parse(bytes).map_err(|e| LoadError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) if tpq.as_int() > 0 => tpq.as_int(),
            Timing::Metrical(_) => {
                return Err(LoadError::Corrupt {
                    name: name.to_string(),
                    reason: "zero ticks per quarter note".to_string(),
                })
            }
            Timing::Timecode(..) => return Err(LoadError::UnsupportedTiming(name.to_string())),
        };

        let mut tempo = None;
        let mut tracks = Vec::default();
        for (index, events) in smf.tracks.iter().enumerate() {
            let scanned = ScannedTrack::scan(events);
            if tempo.is_none() {
                tempo = scanned.tempo;
            }
            if index == 0 && smf.header.format == Format::Parallel && !scanned.has_channel_messages
            {
                continue;
            }
            tracks.push(scanned.into_track(index, ticks_per_quarter));
        }

        let mut builder = SequenceBuilder::default();
        builder
            .tracks(tracks)
            .tempo(tempo.unwrap_or_default())
            .ticks_per_quarter(ticks_per_quarter);
        let mut sequence = builder.build().map_err(|e| LoadError::Corrupt {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let end = sequence.end();
        if end > MusicalTime::START {
            sequence.set_length(end.ceil_to_beat());
        }
        Ok(sequence)
    }

    /// Reads and parses a MIDI file.
    pub fn load_path(path: &Path) -> Result<Sequence, LoadError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::decode(&name, &bytes)
    }

    /// Renders a [Sequence] as a format-1 Standard MIDI File: a conductor
    /// track with the tempo, then one MIDI track per [Track].
    pub fn encode(sequence: &Sequence) -> Result<Vec<u8>, EncodeError> {
        if sequence.track_count() == 0 {
            return Err(EncodeError::Empty);
        }
        let ticks_per_quarter = sequence.ticks_per_quarter();
        if ticks_per_quarter > Sequence::MAX_TICKS_PER_QUARTER {
            return Err(EncodeError::OutOfRange(format!(
                "{ticks_per_quarter} ticks per quarter note is more than {}",
                Sequence::MAX_TICKS_PER_QUARTER
            )));
        }

        let mut tracks = Vec::with_capacity(sequence.track_count() + 1);
        tracks.push(Self::conductor_track(sequence.tempo()));
        for track in sequence.tracks() {
            tracks.push(Self::note_track(track, ticks_per_quarter)?);
        }

        let smf = Smf {
            header: Header {
                format: Format::Parallel,
                timing: Timing::Metrical(u15::from(ticks_per_quarter)),
            },
            tracks,
        };
        let mut bytes = Vec::default();
        smf.write(&mut bytes)
            .map_err(|e| EncodeError::Midi(format!("{}", e)))?;
        Ok(bytes)
    }

    /// Encodes the sequence and writes it to `path`.
    pub fn save_path(sequence: &Sequence, path: &Path) -> Result<(), EncodeError> {
        let bytes = Self::encode(sequence)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Encodes the sequence into a file named `file_name` in the system's
    /// temporary directory, replacing any file already there.
    pub fn export_to_temp_dir(
        sequence: &Sequence,
        file_name: &str,
    ) -> Result<PathBuf, EncodeError> {
        let path = std::env::temp_dir().join(file_name);
        Self::save_path(sequence, &path)?;
        Ok(path)
    }

    fn conductor_track<'a>(tempo: Tempo) -> Vec<TrackEvent<'a>> {
        vec![
            TrackEvent {
                delta: u28::from(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::from(
                    tempo.microseconds_per_beat(),
                ))),
            },
            TrackEvent {
                delta: u28::from(0),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ]
    }

    fn note_track(
        track: &Track,
        ticks_per_quarter: u16,
    ) -> Result<Vec<TrackEvent<'_>>, EncodeError> {
        let out_of_range = |note: &NoteEvent| {
            EncodeError::OutOfRange(format!(
                "note {} at {} in track {}",
                note.key,
                note.position,
                track.title().0
            ))
        };

        // (absolute tick, note-offs sort before note-ons, event)
        let mut timed: Vec<(u64, u8, TrackEventKind)> = Vec::with_capacity(track.len() * 2);
        for note in track.notes() {
            let mut start = note
                .position
                .checked_ticks(ticks_per_quarter)
                .ok_or_else(|| out_of_range(note))?;
            if start < 0 {
                log::warn!(
                    "note {} at {} starts before the track does; writing it at the start",
                    note.key,
                    note.position
                );
                start = 0;
            }
            let end = note
                .duration
                .checked_ticks(ticks_per_quarter)
                .and_then(|d| start.checked_add(d.max(1)))
                .ok_or_else(|| out_of_range(note))?;
            let channel = u4::from(note.channel);
            timed.push((
                start as u64,
                1,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: u7::from(note.key),
                        vel: u7::from(note.velocity.max(1)),
                    },
                },
            ));
            timed.push((
                end as u64,
                0,
                TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: u7::from(note.key),
                        vel: u7::from(0),
                    },
                },
            ));
        }
        timed.sort_by_key(|(tick, order, _)| (*tick, *order));

        let mut events = Vec::with_capacity(timed.len() + 2);
        events.push(TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(track.title().0.as_bytes())),
        });
        let mut prev_tick = 0u64;
        for (tick, _, kind) in timed {
            let delta = tick - prev_tick;
            if delta > Self::MAX_DELTA_TICKS {
                return Err(EncodeError::OutOfRange(format!(
                    "a gap of {delta} ticks in track {} is longer than {}",
                    track.title().0,
                    Self::MAX_DELTA_TICKS
                )));
            }
            events.push(TrackEvent {
                delta: u28::from(delta as u32),
                kind,
            });
            prev_tick = tick;
        }
        events.push(TrackEvent {
            delta: u28::from(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        Ok(events)
    }
}
