//! One-dimensional convolution block.

use crate::layers::Activation;
use burn::{
    module::Module,
    nn::{
        PaddingConfig1d,
        conv::{Conv1d, Conv1dConfig},
    },
    tensor::{Tensor, backend::Backend},
};

/// Configuration for a [`ConvBlock`].
#[derive(Debug, Clone)]
pub struct ConvBlockConfig {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub activation: Activation,
}

impl ConvBlockConfig {
    /// Creates a block config with a ReLU activation.
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: usize) -> Self {
        Self {
            in_channels,
            out_channels,
            kernel_size,
            activation: Activation::Relu,
        }
    }

    /// Sets the activation function.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Initializes the block. Padding keeps the sequence length unchanged
    /// for odd kernel sizes.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ConvBlock<B> {
        let conv = Conv1dConfig::new(self.in_channels, self.out_channels, self.kernel_size)
            .with_padding(PaddingConfig1d::Explicit(self.kernel_size / 2))
            .init(device);

        ConvBlock {
            conv,
            out_channels: self.out_channels,
            activation_id: self.activation.to_id(),
        }
    }
}

/// `activation(conv1d(x))` over `[batch, channels, length]`.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv1d<B>,
    out_channels: usize,
    activation_id: u8,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let output = self.conv.forward(input);
        Activation::from_id(self.activation_id).apply(output)
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }
}
