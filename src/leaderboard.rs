//! Local best-score leaderboard
//!
//! Persisted as JSON next to the save game, tracks top 10 scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::{Result, read_json, write_json_atomic};

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;
pub const LEADERBOARD_FILE: &str = "leaderboard.json";

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
    /// Unix seconds when achieved
    pub timestamp: u64,
}

/// Scores sorted descending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Create an empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a score if it qualifies. Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: u64, level: u32, timestamp: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries.insert(
            rank - 1,
            ScoreEntry {
                score,
                level,
                timestamp,
            },
        );
        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load from `dir`, starting fresh when missing or unreadable
    pub fn load(dir: &Path) -> Self {
        match read_json::<Leaderboard>(&dir.join(LEADERBOARD_FILE)) {
            Ok(Some(mut board)) => {
                board.entries.sort_by(|a, b| b.score.cmp(&a.score));
                board.entries.truncate(MAX_ENTRIES);
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            Ok(None) => {
                log::info!("No leaderboard found, starting fresh");
                Self::new()
            }
            Err(err) => {
                log::warn!("Failed to load leaderboard: {err}");
                Self::new()
            }
        }
    }

    /// Write the board to `dir`, creating the directory if needed
    pub fn try_save(&self, dir: &Path) -> Result<()> {
        crate::persistence::ensure_dir(dir)?;
        write_json_atomic(&dir.join(LEADERBOARD_FILE), self)
    }

    /// Same as [`Leaderboard::try_save`] but logs failures instead of returning them
    pub fn save(&self, dir: &Path) {
        match self.try_save(dir) {
            Ok(()) => log::info!("Leaderboard saved ({} entries)", self.entries.len()),
            Err(err) => log::warn!("Failed to save leaderboard: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_score_keeps_descending_order() {
        let mut board = Leaderboard::new();
        assert_eq!(board.add_score(100, 1, 0), Some(1));
        assert_eq!(board.add_score(300, 2, 0), Some(1));
        assert_eq!(board.add_score(200, 2, 0), Some(2));
        let scores: Vec<u64> = board.entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![300, 200, 100]);
        assert_eq!(board.top_score(), Some(300));
    }

    #[test]
    fn test_zero_never_qualifies() {
        let board = Leaderboard::new();
        assert!(!board.qualifies(0));
        assert_eq!(board.potential_rank(0), None);
    }

    #[test]
    fn test_full_board_requires_beating_last() {
        let mut board = Leaderboard::new();
        for i in 1..=MAX_ENTRIES as u64 {
            board.add_score(i * 10, 1, i);
        }
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert!(!board.qualifies(10));
        assert_eq!(board.potential_rank(15), Some(MAX_ENTRIES));
        assert_eq!(board.add_score(15, 1, 99), Some(MAX_ENTRIES));
        assert_eq!(board.entries.len(), MAX_ENTRIES);
        assert_eq!(board.entries.last().map(|e| e.score), Some(15));
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Leaderboard::load(dir.path()).is_empty());

        let mut board = Leaderboard::new();
        board.add_score(420, 3, 1_700_000_000);
        board.try_save(dir.path()).unwrap();
        assert_eq!(Leaderboard::load(dir.path()), board);
    }
}
