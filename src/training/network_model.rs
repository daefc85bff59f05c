//! Shared epoch loop for every wrapped network.

use std::path::{Path, PathBuf};

use super::{EarlyStopping, EpochOutcome, EpochRecord, TrainingConfig, TrainingHistory};
use crate::errors::ModelError;
use log::{info, warn};

/// A network bundled with its data loaders, loss and optimizer.
///
/// Implementors provide one training epoch, one validation epoch and
/// persistence; [`NetworkModel::train`] drives them with early stopping and
/// checkpoints the best epoch.
pub trait NetworkModel {
    /// Display name, also the checkpoint file stem.
    fn name(&self) -> &str;

    /// Where [`NetworkModel::save`] writes the network.
    fn model_path(&self) -> &Path;

    /// Runs one pass over the training loader, updating the network, and
    /// returns the mean batch loss.
    fn train_one_epoch(&mut self) -> Result<f64, ModelError>;

    /// Runs one pass over the validation loader without gradient tracking and
    /// returns the mean batch loss.
    fn validate_one_epoch(&self) -> Result<f64, ModelError>;

    /// Persists the network at [`NetworkModel::model_path`].
    fn save(&self) -> Result<(), ModelError>;

    /// Restores the network from [`NetworkModel::model_path`].
    fn load(&mut self) -> Result<(), ModelError>;

    /// Location of the JSON loss history written after training.
    fn history_path(&self) -> PathBuf {
        self.model_path().with_extension("history.json")
    }

    /// Trains for up to `epochs` epochs.
    ///
    /// After every epoch the validation loss is compared with the best one so
    /// far; an improvement larger than `min_delta` saves the model. Training
    /// stops once `patience` consecutive epochs fail to improve.
    fn train(
        &mut self,
        epochs: usize,
        patience: Option<usize>,
        min_delta: f64,
    ) -> Result<TrainingHistory, ModelError> {
        if !min_delta.is_finite() || min_delta < 0.0 {
            return Err(ModelError::invalid_config(format!(
                "min_delta must be non-negative, got {min_delta}"
            )));
        }

        let mut history = TrainingHistory::default();
        if epochs == 0 {
            return Ok(history);
        }

        info!(
            "Training {} for {} epochs (patience: {:?}, min_delta: {})",
            self.name(),
            epochs,
            patience,
            min_delta
        );

        let mut stopping = EarlyStopping::new(patience, min_delta);

        for epoch in 1..=epochs {
            let train_loss = self.train_one_epoch()?;
            if !train_loss.is_finite() {
                return Err(ModelError::NonFiniteLoss {
                    split: "train",
                    epoch,
                });
            }

            let valid_loss = self.validate_one_epoch()?;
            if !valid_loss.is_finite() {
                return Err(ModelError::NonFiniteLoss {
                    split: "valid",
                    epoch,
                });
            }

            info!(
                "Epoch {}/{}: train_loss = {:.6}, valid_loss = {:.6}",
                epoch, epochs, train_loss, valid_loss
            );

            let outcome = stopping.update(epoch, valid_loss);
            let improved = outcome == EpochOutcome::Improved;
            if improved {
                self.save()?;
            }

            history.record(EpochRecord {
                epoch,
                train_loss,
                valid_loss,
                improved,
            });

            if outcome == EpochOutcome::Stop {
                warn!(
                    "Early stopping at epoch {}: no improvement for {} epochs",
                    epoch,
                    stopping.wait()
                );
                history.stopped_early = true;
                break;
            }
        }

        if let (Some(best_epoch), Some(best_loss)) = (stopping.best_epoch(), stopping.best_loss()) {
            info!(
                "Best {} at epoch {} with valid_loss = {:.6}",
                self.name(),
                best_epoch,
                best_loss
            );
        }

        history.save_json(self.history_path())?;
        Ok(history)
    }

    /// [`NetworkModel::train`] with the epoch, patience and min-delta values
    /// of `config`.
    fn train_with(&mut self, config: &TrainingConfig) -> Result<TrainingHistory, ModelError> {
        config.validate()?;
        self.train(config.epochs, config.patience, config.min_delta)
    }
}
