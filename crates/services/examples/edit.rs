// Copyright (c) 2024 Mike Tsao

//! The `edit` example loads a MIDI file, edits the selected tracks, and writes
//! the result to the temp directory.

use clap::Parser;
use loopsmith::{prelude::*, util::SequenceLibrary};
use loopsmith_services::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Name of the asset to load. Defaults to the one named in settings.
    name: Option<String>,

    /// Directories to search for assets. May be repeated.
    #[clap(short = 'a', long = "assets", value_parser)]
    asset_paths: Vec<PathBuf>,

    /// A JSON settings file
    #[clap(short = 's', long, value_parser)]
    settings: Option<PathBuf>,

    /// Track indices to edit. Defaults to every track.
    #[clap(short = 't', long = "track", value_parser)]
    tracks: Vec<usize>,

    /// Transpose a pitch class, written as PITCH_CLASS:OFFSET (e.g., 0:2 turns
    /// every C into a D). May be repeated.
    #[clap(long, value_parser = parse_offset)]
    transpose: Vec<(i32, i32)>,

    /// Double note positions and durations
    #[clap(long, value_parser)]
    double: bool,

    /// Halve note positions and durations
    #[clap(long, value_parser)]
    halve: bool,

    /// Shift notes one beat later
    #[clap(long, value_parser)]
    shift_right: bool,

    /// Shift notes one beat earlier
    #[clap(long, value_parser)]
    shift_left: bool,

    /// Delete the selected tracks instead of editing them
    #[clap(long, value_parser)]
    delete: bool,
}

fn parse_offset(s: &str) -> Result<(i32, i32), String> {
    let (pitch_class, offset) = s
        .split_once(':')
        .ok_or_else(|| format!("expected PITCH_CLASS:OFFSET, got {s}"))?;
    Ok((
        pitch_class.parse().map_err(|e| format!("{e}"))?,
        offset.parse().map_err(|e| format!("{e}"))?,
    ))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut settings = if let Some(path) = args.settings.as_ref() {
        EditorSettings::load(path)?
    } else {
        EditorSettings::default()
    };
    if !args.asset_paths.is_empty() {
        settings.set_asset_paths(args.asset_paths.clone());
    }
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| settings.source_name().to_string());
    let library = SequenceLibrary::new_with(settings.asset_paths());

    let sink = MidiSinkService::default();
    let sink_events = sink.receiver().clone();
    let mut editor = SequenceEditor::load(&name, &library, Box::new(sink), settings)?;
    if let Ok(event) = sink_events.recv_timeout(std::time::Duration::from_secs(1)) {
        log::info!("sink: {event:?}");
    }

    let track_count = editor.sequence().map_or(0, |s| s.track_count());
    let selection = if args.tracks.is_empty() {
        TrackSelection::all(track_count)
    } else {
        TrackSelection::from_iter(args.tracks.iter().copied())
    };

    if args.delete {
        editor.delete_tracks(&selection);
    } else {
        if !args.transpose.is_empty() {
            for (pitch_class, offset) in args.transpose.iter() {
                editor.set_offset(*pitch_class, *offset);
            }
            editor.apply_pitch_class_filter(&selection);
        }
        if args.double {
            editor.double_lengths(&selection);
        }
        if args.halve {
            editor.halve_lengths(&selection);
        }
        if args.shift_right {
            editor.shift_right(&selection);
        }
        if args.shift_left {
            editor.shift_left(&selection);
        }
    }

    if let Some(sequence) = editor.sequence() {
        for (index, track) in sequence.tracks().iter().enumerate() {
            println!("{index}: {} ({} notes)", track.title().0, track.len());
        }
    }
    match editor.export_to_temp_dir() {
        Some(path) => println!("Wrote {path:?}"),
        None => anyhow::bail!("Couldn't export {name}"),
    }
    Ok(())
}
