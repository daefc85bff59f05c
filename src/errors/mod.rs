//! Error types for model training and persistence.

mod model_error;

pub use model_error::ModelError;
