//! Neural network layer building blocks.
//!
//! Dense (fully connected) layers, 1D convolution blocks and the activation
//! functions they apply.

pub mod activation;
pub mod conv;
pub mod dense;

pub use activation::Activation;
pub use conv::{ConvBlock, ConvBlockConfig};
pub use dense::{Dense, DenseConfig};
