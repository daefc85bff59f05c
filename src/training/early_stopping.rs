//! Early stopping on the validation loss.

use log::{debug, info};

/// What the driver loop should do after an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochOutcome {
    /// New best validation loss; the model should be checkpointed.
    Improved,
    /// No improvement, keep training.
    NoImprovement,
    /// No improvement for `patience` epochs in a row.
    Stop,
}

/// Tracks the best validation loss and the number of epochs since it was seen.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: Option<usize>,
    min_delta: f64,
    best_loss: f64,
    best_epoch: Option<usize>,
    wait: usize,
}

impl EarlyStopping {
    /// `patience = None` never stops but still reports improvements.
    pub fn new(patience: Option<usize>, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta,
            best_loss: f64::INFINITY,
            best_epoch: None,
            wait: 0,
        }
    }

    /// Records the validation loss of `epoch`.
    ///
    /// An epoch improves when its loss is lower than the best loss by more
    /// than `min_delta`. The first recorded epoch always improves.
    pub fn update(&mut self, epoch: usize, valid_loss: f64) -> EpochOutcome {
        if self.best_epoch.is_none() || valid_loss < self.best_loss - self.min_delta {
            info!(
                "Validation loss improved from {:.6} to {:.6}",
                self.best_loss, valid_loss
            );
            self.best_loss = valid_loss;
            self.best_epoch = Some(epoch);
            self.wait = 0;
            return EpochOutcome::Improved;
        }

        self.wait += 1;
        debug!(
            "No improvement for {} epoch(s), best {:.6} at epoch {:?}",
            self.wait, self.best_loss, self.best_epoch
        );

        match self.patience {
            Some(patience) if self.wait >= patience => EpochOutcome::Stop,
            _ => EpochOutcome::NoImprovement,
        }
    }

    pub fn best_loss(&self) -> Option<f64> {
        self.best_epoch.map(|_| self.best_loss)
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    /// Epochs since the last improvement.
    pub fn wait(&self) -> usize {
        self.wait
    }
}
