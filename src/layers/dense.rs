//! Dense (fully connected) layer implementation.

use crate::layers::Activation;
use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, backend::Backend},
};

/// Configuration for a Dense layer.
#[derive(Debug, Clone)]
pub struct DenseConfig {
    /// Number of input features.
    pub input_size: usize,
    /// Number of output features.
    pub output_size: usize,
    /// Activation function to apply after the linear transformation.
    pub activation: Activation,
}

impl DenseConfig {
    /// Creates a new DenseConfig.
    pub fn new(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            activation: Activation::None,
        }
    }

    /// Sets the activation function.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Initializes the Dense layer with the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Dense<B> {
        let linear = LinearConfig::new(self.input_size, self.output_size).init(device);

        Dense {
            linear,
            output_size: self.output_size,
            activation_id: self.activation.to_id(),
        }
    }
}

/// A dense (fully connected) layer with optional activation.
///
/// It performs: output = activation(input @ weights + bias)
#[derive(Module, Debug)]
pub struct Dense<B: Backend> {
    linear: Linear<B>,
    output_size: usize,
    /// Activation function ID, see [`Activation::to_id`].
    activation_id: u8,
}

impl<B: Backend> Dense<B> {
    /// Performs the forward pass on `[batch, input_size]`.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let output = self.linear.forward(input);
        Activation::from_id(self.activation_id).apply(output)
    }

    /// Returns the output size of this layer.
    pub fn output_size(&self) -> usize {
        self.output_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_dense_config_creation() {
        let config = DenseConfig::new(10, 5).with_activation(Activation::Relu);

        assert_eq!(config.input_size, 10);
        assert_eq!(config.output_size, 5);
        assert_eq!(config.activation, Activation::Relu);
    }

    #[test]
    fn test_dense_applies_activation() {
        let device = <TestBackend as Backend>::Device::default();
        let dense: Dense<TestBackend> = DenseConfig::new(4, 2)
            .with_activation(Activation::Sigmoid)
            .init(&device);

        let input = Tensor::<TestBackend, 2>::from_floats([[-30.0, 5.0, 0.5, 12.0]], &device);
        let output: Vec<f32> = dense.forward(input).to_data().to_vec().unwrap();

        assert_eq!(dense.output_size(), 2);
        assert!(output.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_dense_forward_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let dense: Dense<TestBackend> = DenseConfig::new(4, 2).init(&device);

        let input = Tensor::<TestBackend, 2>::zeros([3, 4], &device);
        let output = dense.forward(input);

        assert_eq!(output.dims(), [3, 2]);
    }
}
