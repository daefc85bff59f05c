//! Per-epoch loss history.

use std::path::Path;

use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// Losses of a single epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based epoch number.
    pub epoch: usize,
    pub train_loss: f64,
    pub valid_loss: f64,
    /// Whether this epoch produced the checkpointed model.
    pub improved: bool,
}

/// Result of a training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs: Vec<EpochRecord>,
    pub best_epoch: Option<usize>,
    pub best_valid_loss: Option<f64>,
    pub stopped_early: bool,
}

impl TrainingHistory {
    pub fn record(&mut self, record: EpochRecord) {
        if record.improved {
            self.best_epoch = Some(record.epoch);
            self.best_valid_loss = Some(record.valid_loss);
        }
        self.epochs.push(record);
    }

    pub fn train_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|r| r.train_loss).collect()
    }

    pub fn valid_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|r| r.valid_loss).collect()
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    /// Writes the history as pretty JSON, creating parent directories.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
