// Copyright (c) 2024 Mike Tsao

//! Persistent configuration for the editor.

use crate::{traits::HasSettings, types::MusicalTime};
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// What the built-in edits do when a note would end up before the start of
/// its track.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PositionFloor {
    /// Negative positions are allowed.
    #[default]
    Permit,
    /// Negative positions become zero.
    ClampToZero,
}
impl PositionFloor {
    /// Applies the floor to a position.
    pub fn apply(&self, position: MusicalTime) -> MusicalTime {
        match self {
            PositionFloor::Permit => position,
            PositionFloor::ClampToZero => position.max(MusicalTime::START),
        }
    }
}

/// Contains persistent editor settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize, Builder)]
#[derivative(Default)]
#[builder(default)]
#[serde(rename_all = "kebab-case", default)]
pub struct EditorSettings {
    /// The shortest loop a sequence may have.
    #[derivative(Default(value = "MusicalTime::DURATION_WHOLE"))]
    min_loop_length: MusicalTime,

    position_floor: PositionFloor,

    /// The file name used when exporting to the temp directory.
    #[derivative(Default(value = "\"ExportedMIDI.mid\".to_string()"))]
    export_file_name: String,

    /// The asset that a new editor starts with.
    #[derivative(Default(value = "\"D_mixolydian_01\".to_string()"))]
    source_name: String,

    /// Where to look for assets, in order.
    asset_paths: Vec<PathBuf>,

    #[serde(skip)]
    #[builder(setter(skip))]
    has_been_saved: bool,
}
impl HasSettings for EditorSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl EditorSettings {
    #[allow(missing_docs)]
    pub fn min_loop_length(&self) -> MusicalTime {
        self.min_loop_length
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_min_loop_length(&mut self, min_loop_length: MusicalTime) {
        if min_loop_length != self.min_loop_length {
            self.min_loop_length = min_loop_length;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn position_floor(&self) -> PositionFloor {
        self.position_floor
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_position_floor(&mut self, position_floor: PositionFloor) {
        if position_floor != self.position_floor {
            self.position_floor = position_floor;
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn export_file_name(&self) -> &str {
        &self.export_file_name
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_export_file_name(&mut self, export_file_name: &str) {
        if export_file_name != self.export_file_name {
            self.export_file_name = export_file_name.to_string();
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_source_name(&mut self, source_name: &str) {
        if source_name != self.source_name {
            self.source_name = source_name.to_string();
            self.needs_save();
        }
    }

    #[allow(missing_docs)]
    pub fn asset_paths(&self) -> &[PathBuf] {
        &self.asset_paths
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_asset_paths(&mut self, asset_paths: Vec<PathBuf>) {
        if asset_paths != self.asset_paths {
            self.asset_paths = asset_paths;
            self.needs_save();
        }
    }

    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        log::debug!("Loading settings from {path:?}");
        let mut contents = String::new();
        let mut file = File::open(path)
            .map_err(|e| anyhow::format_err!("Couldn't open {path:?}: {}", e))?;
        file.read_to_string(&mut contents)
            .map_err(|e| anyhow::format_err!("Couldn't read {path:?}: {}", e))?;
        let mut settings: Self = serde_json::from_str(&contents)
            .map_err(|e| anyhow::format_err!("Couldn't parse {path:?}: {}", e))?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Writes settings to a JSON file, creating parent directories as needed.
    pub fn save(&mut self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self)
            .map_err(|_| anyhow::format_err!("Unable to serialize settings JSON"))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| {
                anyhow::format_err!("Unable to create {path:?} parent directories: {}", e)
            })?;
        }

        let mut file = File::create(path)
            .map_err(|e| anyhow::format_err!("Unable to create {path:?}: {}", e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| anyhow::format_err!("Unable to write {path:?}: {}", e))?;

        self.mark_clean();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.min_loop_length(), MusicalTime::new_with_beats(4));
        assert_eq!(settings.position_floor(), PositionFloor::Permit);
        assert_eq!(settings.export_file_name(), "ExportedMIDI.mid");
        assert_eq!(settings.source_name(), "D_mixolydian_01");
        assert!(settings.asset_paths().is_empty());
        assert!(!settings.has_been_saved());
    }

    #[test]
    fn setters_mark_dirty_only_on_change() {
        let mut settings = EditorSettings::default();
        settings.mark_clean();

        settings.set_position_floor(PositionFloor::Permit);
        assert!(settings.has_been_saved(), "setting the same value isn't a change");

        settings.set_position_floor(PositionFloor::ClampToZero);
        assert!(!settings.has_been_saved());
    }

    #[test]
    fn builder_fills_in_defaults() {
        let settings = EditorSettingsBuilder::default()
            .min_loop_length(MusicalTime::new_with_beats(8))
            .build()
            .unwrap();
        assert_eq!(settings.min_loop_length(), MusicalTime::new_with_beats(8));
        assert_eq!(settings.export_file_name(), "ExportedMIDI.mid");
    }

    #[test]
    fn position_floor() {
        let negative = MusicalTime::new_with_beats(-1);
        assert_eq!(PositionFloor::Permit.apply(negative), negative);
        assert_eq!(PositionFloor::ClampToZero.apply(negative), MusicalTime::START);
        assert_eq!(
            PositionFloor::ClampToZero.apply(MusicalTime::ONE_BEAT),
            MusicalTime::ONE_BEAT
        );
        assert_eq!(PositionFloor::iter().count(), 2);
        assert_eq!(PositionFloor::ClampToZero.to_string(), "ClampToZero");
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = EditorSettings::default();
        settings.set_position_floor(PositionFloor::ClampToZero);
        settings.set_asset_paths(vec![PathBuf::from("/tmp/assets")]);
        settings.save(&path).unwrap();
        assert!(settings.has_been_saved());

        let loaded = EditorSettings::load(&path).unwrap();
        assert_eq!(loaded.position_floor(), PositionFloor::ClampToZero);
        assert_eq!(loaded.asset_paths(), &[PathBuf::from("/tmp/assets")]);
        assert_eq!(loaded.min_loop_length(), settings.min_loop_length());
        assert!(loaded.has_been_saved());

        assert!(EditorSettings::load(&dir.path().join("missing.json")).is_err());
    }
}
