//! 1D convolutional network.

use crate::errors::ModelError;
use crate::layers::{Activation, ConvBlock, ConvBlockConfig, Dense, DenseConfig};
use burn::{
    module::Module,
    nn::{Dropout, DropoutConfig},
    tensor::{Tensor, backend::Backend},
};
use serde::{Deserialize, Serialize};

/// Configuration for building a [`ConvNetwork`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvNetworkConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Output channels of each convolution block, in order.
    pub channels: Vec<usize>,
    /// Kernel size shared by all blocks. Must be odd.
    pub kernel_size: usize,
    /// Activation applied after each convolution.
    pub activation: Activation,
    /// Dropout probability before the head.
    pub dropout: f64,
    /// Width of the network output.
    pub output_size: usize,
    /// Activation applied to the head output.
    pub output_activation: Activation,
}

impl ConvNetworkConfig {
    /// Creates a config for `in_channels` inputs and a single output.
    pub fn new(in_channels: usize) -> Self {
        Self {
            in_channels,
            channels: Vec::new(),
            kernel_size: 3,
            activation: Activation::Relu,
            dropout: 0.0,
            output_size: 1,
            output_activation: Activation::None,
        }
    }

    /// Appends a convolution block with `out_channels` filters.
    pub fn conv(mut self, out_channels: usize) -> Self {
        self.channels.push(out_channels);
        self
    }

    pub fn with_kernel_size(mut self, kernel_size: usize) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_output(mut self, output_size: usize, activation: Activation) -> Self {
        self.output_size = output_size;
        self.output_activation = activation;
        self
    }

    /// Builds the network on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ConvNetwork<B>, ModelError> {
        if self.in_channels == 0 {
            return Err(ModelError::invalid_config("in_channels must be positive"));
        }
        if self.channels.is_empty() {
            return Err(ModelError::invalid_config(
                "at least one convolution block is required",
            ));
        }
        if self.channels.contains(&0) {
            return Err(ModelError::invalid_config("block channels must be positive"));
        }
        if self.kernel_size == 0 || self.kernel_size % 2 == 0 {
            return Err(ModelError::invalid_config(format!(
                "kernel_size must be odd, got {}",
                self.kernel_size
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ModelError::invalid_config(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        if self.output_size == 0 {
            return Err(ModelError::invalid_config("output_size must be positive"));
        }

        let mut blocks = Vec::with_capacity(self.channels.len());
        let mut in_channels = self.in_channels;
        for &out_channels in &self.channels {
            blocks.push(
                ConvBlockConfig::new(in_channels, out_channels, self.kernel_size)
                    .with_activation(self.activation)
                    .init(device),
            );
            in_channels = out_channels;
        }

        let head = DenseConfig::new(in_channels, self.output_size)
            .with_activation(self.output_activation)
            .init(device);

        Ok(ConvNetwork {
            blocks,
            dropout: DropoutConfig::new(self.dropout).init(),
            head,
            in_channels: self.in_channels,
        })
    }
}

/// Convolution blocks, global average pooling over the sequence axis, then a
/// dense head.
#[derive(Module, Debug)]
pub struct ConvNetwork<B: Backend> {
    blocks: Vec<ConvBlock<B>>,
    dropout: Dropout,
    head: Dense<B>,
    in_channels: usize,
}

impl<B: Backend> ConvNetwork<B> {
    /// Maps `[batch, in_channels, length]` to `[batch, output_size]`.
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let mut x = input;
        for block in &self.blocks {
            x = block.forward(x);
        }

        let [batch, channels, _] = x.dims();
        let pooled = x.mean_dim(2).reshape([batch, channels]);
        let pooled = self.dropout.forward(pooled);

        self.head.forward(pooled)
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    pub fn output_size(&self) -> usize {
        self.head.output_size()
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_conv_network_forward_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let network: ConvNetwork<TestBackend> = ConvNetworkConfig::new(3)
            .conv(8)
            .conv(4)
            .init(&device)
            .expect("Failed to build network");

        let input = Tensor::<TestBackend, 3>::zeros([5, 3, 12], &device);
        let output = network.forward(input);

        assert_eq!(output.dims(), [5, 1]);
        assert_eq!(network.in_channels(), 3);
        assert_eq!(network.num_blocks(), 2);
        assert_eq!(network.output_size(), 1);
    }

    #[test]
    fn test_conv_network_requires_blocks() {
        let device = <TestBackend as Backend>::Device::default();
        let result: Result<ConvNetwork<TestBackend>, _> = ConvNetworkConfig::new(1).init(&device);

        assert!(matches!(result, Err(ModelError::InvalidConfig { .. })));
    }

    #[test]
    fn test_conv_network_rejects_even_kernel() {
        let device = <TestBackend as Backend>::Device::default();
        let result: Result<ConvNetwork<TestBackend>, _> = ConvNetworkConfig::new(1)
            .conv(4)
            .with_kernel_size(4)
            .init(&device);

        assert!(matches!(result, Err(ModelError::InvalidConfig { .. })));
    }

    #[test]
    fn test_conv_network_config_from_json() {
        let json = r#"{
            "in_channels": 2,
            "channels": [16, 8],
            "kernel_size": 5,
            "activation": "gelu",
            "dropout": 0.1,
            "output_size": 1,
            "output_activation": "sigmoid"
        }"#;
        let config: ConvNetworkConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.channels, vec![16, 8]);
        assert_eq!(config.activation, Activation::Gelu);
        assert_eq!(config.output_activation, Activation::Sigmoid);
    }
}
