//! Network architectures driven by the training wrappers.
//!
//! - [`ConvNetwork`]: 1D convolutional regressor over `[batch, channels, length]`.
//! - [`EncoderNetwork`]: transformer encoder over token ids with an attention
//!   mask, whose weights can be restored from a pretrained record.

mod conv;
mod encoder;

pub use conv::{ConvNetwork, ConvNetworkConfig};
pub use encoder::{EncoderNetwork, EncoderNetworkConfig};
