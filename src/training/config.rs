//! Training configuration.

use std::path::Path;

use super::Loss;
use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// Configuration for model training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Maximum number of training epochs.
    pub epochs: usize,
    /// Epochs without improvement before stopping. `None` disables early stopping.
    pub patience: Option<usize>,
    /// Minimum decrease of the validation loss that counts as an improvement.
    pub min_delta: f64,
    /// Learning rate for the optimizer.
    pub learning_rate: f64,
    /// Batch size for both data loaders.
    pub batch_size: usize,
    /// Worker threads used by each data loader. `0` loads batches on the
    /// training thread.
    pub num_workers: usize,
    /// Seed for shuffling the training loader.
    pub seed: u64,
    /// Loss function to use.
    pub loss: Loss,
    /// Whether to show progress bars during training.
    pub verbose: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            patience: None,
            min_delta: 0.0,
            learning_rate: 0.001,
            batch_size: 32,
            num_workers: 0,
            seed: 2021,
            loss: Loss::Mse,
            verbose: true,
        }
    }
}

impl TrainingConfig {
    /// Creates a new TrainingConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON config; missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        let config: TrainingConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would otherwise surface as panics or silent
    /// misbehaviour deep inside a training run.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.batch_size == 0 {
            return Err(ModelError::invalid_config("batch_size must be positive"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ModelError::invalid_config(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !self.min_delta.is_finite() || self.min_delta < 0.0 {
            return Err(ModelError::invalid_config(format!(
                "min_delta must be non-negative, got {}",
                self.min_delta
            )));
        }
        Ok(())
    }

    /// Sets the number of epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Enables early stopping after `patience` epochs without improvement.
    pub fn patience(mut self, patience: usize) -> Self {
        self.patience = Some(patience);
        self
    }

    /// Sets the minimum improvement threshold.
    pub fn min_delta(mut self, min_delta: f64) -> Self {
        self.min_delta = min_delta;
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Sets the number of data loader workers.
    pub fn num_workers(mut self, workers: usize) -> Self {
        self.num_workers = workers;
        self
    }

    /// Sets the shuffling seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the loss function.
    pub fn loss(mut self, loss: Loss) -> Self {
        self.loss = loss;
        self
    }

    /// Sets whether to show progress.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
