//! Saved games
//!
//! Only the fields needed to resume are stored: player stats and position,
//! the level number and collectible progress.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{PersistenceError, Result, ensure_dir, read_json, write_json_atomic};
use crate::config::PlayerColor;

pub const SAVE_FILE: &str = "game_save.json";
/// Bumped when the layout changes
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub lives: u32,
    pub score: u64,
    pub total_points: u64,
    pub bananas: u32,
    pub color: PlayerColor,
    /// Top-left corner
    pub position: (f32, f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub current_level: u32,
    pub collectibles_collected: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: u32,
    /// Unix seconds
    pub timestamp: u64,
    pub player: PlayerSnapshot,
    pub level: LevelSnapshot,
}

impl SaveGame {
    pub fn new(timestamp: u64, player: PlayerSnapshot, level: LevelSnapshot) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp,
            player,
            level,
        }
    }
}

/// Single save slot inside a save directory
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SAVE_FILE)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn has_save(&self) -> bool {
        self.path().is_file()
    }

    pub fn try_load(&self) -> Result<Option<SaveGame>> {
        read_json(&self.path())
    }

    pub fn try_save(&self, save: &SaveGame) -> Result<()> {
        ensure_dir(&self.dir)?;
        write_json_atomic(&self.path(), save)
    }

    /// Saved game, or `None` when missing or unreadable
    pub fn load(&self) -> Option<SaveGame> {
        match self.try_load() {
            Ok(Some(save)) if save.version <= SAVE_VERSION => {
                log::info!(
                    "Loaded save: level {}, score {}",
                    save.level.current_level,
                    save.player.score
                );
                Some(save)
            }
            Ok(Some(save)) => {
                log::warn!("Ignoring save with unknown version {}", save.version);
                None
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("Failed to load save: {err}");
                None
            }
        }
    }

    /// Store the save. Returns whether it was written.
    pub fn save(&self, save: &SaveGame) -> bool {
        match self.try_save(save) {
            Ok(()) => {
                log::info!("Game saved (level {})", save.level.current_level);
                true
            }
            Err(err) => {
                log::warn!("Failed to save game: {err}");
                false
            }
        }
    }

    /// Remove the save if present. Missing is not an error.
    pub fn delete_save(&self) -> Result<()> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted save {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistenceError::io(path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveGame {
        SaveGame::new(
            1_700_000_000,
            PlayerSnapshot {
                lives: 2,
                score: 340,
                total_points: 900,
                bananas: 4,
                color: PlayerColor::Purple,
                position: (250.0, 410.0),
            },
            LevelSnapshot {
                current_level: 4,
                collectibles_collected: 3,
            },
        )
    }

    #[test]
    fn test_save_load_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path().join("saves"));
        assert!(!store.has_save());
        assert_eq!(store.load(), None);

        assert!(store.save(&sample()));
        assert!(store.has_save());
        assert_eq!(store.load(), Some(sample()));

        store.delete_save().unwrap();
        assert!(!store.has_save());
        // Deleting twice is fine
        store.delete_save().unwrap();
    }

    #[test]
    fn test_color_serialized_by_name() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("Purple"));
    }

    #[test]
    fn test_newer_version_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveStore::new(dir.path());
        let mut save = sample();
        save.version = SAVE_VERSION + 1;
        store.try_save(&save).unwrap();
        assert_eq!(store.load(), None);
    }
}
