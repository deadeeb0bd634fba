// Copyright (c) 2024 Mike Tsao

//! Finds sequence assets by name.

use crate::{composition::Sequence, error::LoadError, util::MidiFileCodec};
use std::path::{Path, PathBuf};

/// [SequenceLibrary] turns an asset name like `D_mixolydian_01` into a loaded
/// [Sequence] by looking through a list of directories, in order.
#[derive(Clone, Debug, Default)]
pub struct SequenceLibrary {
    search_paths: Vec<PathBuf>,
}
impl SequenceLibrary {
    /// The extension tried when the bare name doesn't exist.
    pub const EXTENSION: &'static str = "mid";

    #[allow(missing_docs)]
    pub fn new_with(search_paths: &[PathBuf]) -> Self {
        Self {
            search_paths: search_paths.to_vec(),
        }
    }

    /// Adds a directory to the end of the search list.
    pub fn push_search_path(&mut self, path: &Path) {
        self.search_paths.push(path.to_path_buf());
    }

    #[allow(missing_docs)]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The first existing file for `name`. Each directory is checked for
    /// `name` as given and then for `name.mid` before moving on.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        self.search_paths.iter().find_map(|dir| {
            [
                dir.join(name),
                dir.join(format!("{name}.{}", Self::EXTENSION)),
            ]
            .into_iter()
            .find(|candidate| candidate.is_file())
        })
    }

    /// Finds and decodes the named asset.
    pub fn load(&self, name: &str) -> Result<Sequence, LoadError> {
        let Some(path) = self.find(name) else {
            log::debug!("{name} isn't in any of {:?}", self.search_paths);
            return Err(LoadError::NotFound(name.to_string()));
        };
        log::debug!("Loading {name} from {path:?}");
        MidiFileCodec::load_path(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        composition::{NoteEvent, Track},
        types::MusicalTime,
    };

    fn write_asset(dir: &Path, file_name: &str, key: u8) {
        let sequence = Sequence::new_with_tracks(vec![Track::new_with(
            "Lead",
            vec![NoteEvent::new_with(key, MusicalTime::START, MusicalTime::ONE_BEAT)],
        )]);
        MidiFileCodec::save_path(&sequence, &dir.join(file_name)).unwrap();
    }

    #[test]
    fn missing_asset_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let library = SequenceLibrary::new_with(&[dir.path().to_path_buf()]);
        assert!(library.find("nope").is_none());
        assert!(matches!(library.load("nope"), Err(LoadError::NotFound(_))));
        assert!(matches!(
            SequenceLibrary::default().load("nope"),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn extension_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        write_asset(dir.path(), "riff.mid", 62);
        let library = SequenceLibrary::new_with(&[dir.path().to_path_buf()]);

        assert_eq!(library.find("riff"), Some(dir.path().join("riff.mid")));
        assert_eq!(library.find("riff.mid"), Some(dir.path().join("riff.mid")));
        assert_eq!(library.load("riff").unwrap().tracks()[0].notes()[0].key, 62);
    }

    #[test]
    fn earlier_paths_win() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_asset(first.path(), "riff.mid", 60);
        write_asset(second.path(), "riff.mid", 67);

        let mut library = SequenceLibrary::default();
        library.push_search_path(second.path());
        library.push_search_path(first.path());
        assert_eq!(library.search_paths().len(), 2);
        assert_eq!(library.load("riff").unwrap().tracks()[0].notes()[0].key, 67);
    }
}
