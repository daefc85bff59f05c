//! # netmodel
//!
//! Epoch-level training and validation loops for neural network models built
//! on the Burn framework.
//!
//! Two wrappers share one driver loop ([`NetworkModel::train`]):
//!
//! - [`ConvModel`]: a 1D convolutional network over numeric feature sequences.
//! - [`PretrainedModel`]: a transformer encoder over token ids and an
//!   attention mask, fine-tuned from pretrained weights.
//!
//! Each epoch iterates the training loader (forward, loss, backward, optimizer
//! step), then the validation loader without gradient tracking. The mean batch
//! losses feed early stopping, and the best epoch is checkpointed.
//!
//! ## Features
//!
//! - **Burn Backend**: Uses the Burn framework with WGPU backend for GPU
//!   acceleration; tests run on the NdArray backend.
//! - **Early stopping**: patience and minimum-improvement thresholds.
//! - **Checkpoints**: best weights written with Burn's named MessagePack
//!   recorder, loss history as JSON.
//!
//! ## Example
//!
//! ```
//! use netmodel::prelude::*;
//! use burn::backend::NdArray;
//!
//! type Backend = NdArray;
//!
//! let device = <Backend as burn::tensor::backend::Backend>::Device::default();
//!
//! let network: ConvNetwork<Backend> = ConvNetworkConfig::new(2)
//!     .conv(8)
//!     .conv(4)
//!     .init(&device)
//!     .expect("Failed to build network");
//!
//! let input = burn::tensor::Tensor::<Backend, 3>::zeros([3, 2, 16], &device);
//! assert_eq!(network.forward(input).dims(), [3, 1]);
//! ```

pub mod data;
pub mod errors;
pub mod layers;
pub mod models;
pub mod networks;
pub mod training;

// Re-exports for convenience
pub use errors::ModelError;
pub use layers::activation::Activation;
pub use models::{ConvModel, PretrainedModel};
pub use training::{Loss, NetworkModel, TrainingConfig, TrainingHistory};

/// Backend type alias for WGPU with autodiff support.
pub type Backend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Backend type for inference (no autodiff).
pub type InferenceBackend = burn::backend::Wgpu;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::data::{
        DataLoaders, EncodedBatcher, EncodedItem, EncodedLoaders, SequenceBatcher, SequenceItem,
        SequenceLoaders, encoded_dataset, sequence_dataset,
    };
    pub use crate::errors::ModelError;
    pub use crate::layers::activation::Activation;
    pub use crate::models::{ConvModel, PretrainedModel};
    pub use crate::networks::{ConvNetwork, ConvNetworkConfig, EncoderNetwork, EncoderNetworkConfig};
    pub use crate::training::{Loss, NetworkModel, TrainingConfig, TrainingHistory};
    pub use crate::{Backend, InferenceBackend};
}
