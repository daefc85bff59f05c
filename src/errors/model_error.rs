//! Model-related error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, training or persisting a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("The {split} data loader produced no batches")]
    EmptyDataLoader { split: &'static str },

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Non-finite {split} loss at epoch {epoch}")]
    NonFiniteLoss { split: &'static str, epoch: usize },

    #[error("Checkpoint error at {}: {message}", path.display())]
    Checkpoint { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Token id {token} is outside the vocabulary of {vocab_size}")]
    TokenOutOfRange { token: i64, vocab_size: usize },
}

impl ModelError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        ModelError::InvalidConfig {
            message: message.into(),
        }
    }
}
