//! Training wrappers that bind a network to its data, loss and optimizer.

mod conv_model;
mod pretrained_model;

pub use conv_model::{CONV_MODEL_NAME, ConvModel};
pub use pretrained_model::{PRETRAINED_MODEL_NAME, PretrainedModel};
