//! Training utilities shared by the model wrappers.
//!
//! This module provides:
//! - Loss functions (MSE, MAE, binary cross entropy)
//! - Training configuration
//! - Early stopping and loss history
//! - Checkpoint persistence
//! - The [`NetworkModel`] epoch loop

pub mod checkpoint;
mod config;
mod early_stopping;
mod epoch;
mod history;
mod loss;
mod network_model;

pub use config::TrainingConfig;
pub use early_stopping::{EarlyStopping, EpochOutcome};
pub use epoch::{flatten_output, mean_batch_loss};
pub use history::{EpochRecord, TrainingHistory};
pub use loss::Loss;
pub use network_model::NetworkModel;
