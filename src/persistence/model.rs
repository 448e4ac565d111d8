//! Storage for the learned Q-table

use std::path::{Path, PathBuf};

use super::{Result, ensure_dir, read_json, write_json_atomic};
use crate::ai::q_learning::QModel;

/// Fixed model identifier
pub const MODEL_FILE: &str = "q_learning_model.json";

/// Q-model file inside a model directory
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stored model, or `None` when nothing was saved yet
    pub fn try_load(&self) -> Result<Option<QModel>> {
        read_json(&self.path())
    }

    pub fn try_save(&self, model: &QModel) -> Result<()> {
        ensure_dir(&self.dir)?;
        write_json_atomic(&self.path(), model)
    }

    /// Stored model, falling back to an empty table with `default_epsilon`.
    /// Failures are logged, never returned.
    pub fn load_or_default(&self, default_epsilon: f64) -> QModel {
        match self.try_load() {
            Ok(Some(model)) => {
                log::info!(
                    "Loaded Q-learning model: {} states, epsilon {:.4}",
                    model.entries.len(),
                    model.epsilon
                );
                model
            }
            Ok(None) => {
                log::info!("No Q-learning model at {}, starting fresh", self.path().display());
                QModel::empty(default_epsilon)
            }
            Err(err) => {
                log::warn!("Failed to load Q-learning model: {err}");
                QModel::empty(default_epsilon)
            }
        }
    }

    /// Store the model. Returns whether it was written.
    pub fn save(&self, model: &QModel) -> bool {
        match self.try_save(model) {
            Ok(()) => {
                log::info!("Q-learning model saved ({} states)", model.entries.len());
                true
            }
            Err(err) => {
                log::warn!("Failed to save Q-learning model: {err}");
                false
            }
        }
    }
}
