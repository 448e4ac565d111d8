//! File-backed persistence
//!
//! - Q-learning model store (`model`)
//! - Save-game store (`save`)
//! - JSON documents written to a `.tmp` sibling first, then renamed over the
//!   target so a crash never leaves a half-written file
//!
//! Nothing here is called from inside a frame; the driver loads before the
//! loop and stores after it.

pub mod error;
pub mod model;
pub mod save;

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use error::{PersistenceError, Result};
pub use model::ModelStore;
pub use save::{LevelSnapshot, PlayerSnapshot, SaveGame, SaveStore};

/// Read a JSON document. A missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(PersistenceError::io(path, err)),
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|err| PersistenceError::json(path, err))
}

/// Write a JSON document through a temporary file and rename
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    if !dir.as_os_str().is_empty() && !dir.is_dir() {
        return Err(PersistenceError::MissingDirectory(dir.to_path_buf()));
    }

    let json = serde_json::to_string_pretty(value).map_err(|err| PersistenceError::json(path, err))?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(|err| PersistenceError::io(&tmp, err))?;
    fs::rename(&tmp, path).map_err(|err| PersistenceError::io(path, err))
}

/// Create a storage directory (and parents) if needed
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| PersistenceError::io(dir, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<u32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        write_json_atomic(&path, &vec![1u32, 2, 3]).unwrap();
        assert!(!path.with_extension("tmp").exists());
        let back: Option<Vec<u32>> = read_json(&path).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("doc.json");
        let err = write_json_atomic(&path, &1u32).unwrap_err();
        assert!(matches!(err, PersistenceError::MissingDirectory(_)));
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = read_json::<Vec<u32>>(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::Json { .. }));
    }
}
