// Copyright (c) 2024 Mike Tsao

use loopsmith::{
    error::LoadError,
    prelude::*,
    util::{EditorSettingsBuilder, SequenceLibrary},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mixolydian() -> Sequence {
    // D mixolydian: D E F# G A B C
    let keys = [62, 64, 66, 67, 69, 71, 72];
    let melody = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            NoteEvent::new_with(
                *key,
                MusicalTime::new_with_ratio(i as i64, 2),
                MusicalTime::DURATION_EIGHTH,
            )
            .with_velocity(90)
        })
        .collect();
    let drone = vec![NoteEvent::new_with(
        38,
        MusicalTime::START,
        MusicalTime::new_with_beats(4),
    )
    .with_channel(MidiChannel::new(1))];
    let mut sequence = Sequence::new_with_tracks(vec![
        Track::new_with("Melody", melody),
        Track::new_with("Drone", drone),
    ]);
    sequence.set_tempo(Tempo(100.0));
    sequence
}

#[test]
fn load_edit_and_export() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    MidiFileCodec::save_path(&mixolydian(), &dir.path().join("D_mixolydian_01.mid")).unwrap();

    let settings = EditorSettingsBuilder::default()
        .asset_paths(vec![dir.path().to_path_buf()])
        .export_file_name(format!("loopsmith-test-{}.mid", std::process::id()))
        .build()
        .unwrap();
    let library = SequenceLibrary::new_with(settings.asset_paths());
    let name = settings.source_name().to_string();
    let mut editor =
        SequenceEditor::load(&name, &library, Box::new(NullSink::default()), settings).unwrap();

    let sequence = editor.sequence().unwrap();
    assert_eq!(sequence.track_count(), 2);
    assert_eq!(sequence.tempo(), Tempo(100.0));
    assert_eq!(sequence.tracks()[0].title().0, "Melody");
    assert_eq!(sequence.tracks()[0].notes(), mixolydian().tracks()[0].notes());
    assert_eq!(sequence.tracks()[1].notes()[0].channel, MidiChannel::new(1));
    assert!(sequence.loop_enabled());

    // Turn the F# into an F (D dorian is close enough for a test) and export.
    editor.set_offset(PitchClass::Fs as i32, -1);
    editor.apply_pitch_class_filter(&TrackSelection::from([0]));
    let path = editor.export_to_temp_dir().unwrap();

    let exported = MidiFileCodec::load_path(&path).unwrap();
    let keys: Vec<u8> = exported.tracks()[0].notes().iter().map(|n| n.key).collect();
    assert_eq!(keys, vec![62, 64, 65, 67, 69, 71, 72]);
    assert_eq!(exported.tracks()[1].title().0, "Drone");
    let _ = std::fs::remove_file(path);

    assert_eq!(
        editor.export_bytes().unwrap(),
        MidiFileCodec::encode(editor.sequence().unwrap()).unwrap()
    );
}

#[test]
fn missing_asset_is_reported() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let library = SequenceLibrary::new_with(&[dir.path().to_path_buf()]);
    let result = SequenceEditor::load(
        "D_mixolydian_01",
        &library,
        Box::new(NullSink::default()),
        EditorSettings::default(),
    );
    assert!(matches!(result, Err(LoadError::NotFound(name)) if name == "D_mixolydian_01"));
}

#[test]
fn corrupt_asset_is_reported() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.mid"), b"MThd garbage").unwrap();
    let library = SequenceLibrary::new_with(&[dir.path().to_path_buf()]);
    assert!(matches!(
        library.load("broken"),
        Err(LoadError::Corrupt { .. })
    ));
}
