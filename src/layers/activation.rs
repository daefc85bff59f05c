//! Activation functions for convolution blocks and dense heads.

use burn::tensor::{Tensor, backend::Backend};
use serde::{Deserialize, Serialize};

/// Supported activation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// No activation (identity function).
    #[default]
    None,
    /// Rectified Linear Unit: f(x) = max(0, x)
    Relu,
    /// Sigmoid: f(x) = 1 / (1 + exp(-x))
    Sigmoid,
    /// Hyperbolic tangent: f(x) = tanh(x)
    Tanh,
    /// Gaussian Error Linear Unit: f(x) = x * 0.5 * (1 + erf(x / sqrt(2)))
    Gelu,
}

impl Activation {
    /// Applies the activation function to a tensor.
    pub fn apply<B: Backend, const D: usize>(&self, tensor: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Activation::None => tensor,
            Activation::Relu => burn::tensor::activation::relu(tensor),
            Activation::Sigmoid => burn::tensor::activation::sigmoid(tensor),
            Activation::Tanh => burn::tensor::activation::tanh(tensor),
            Activation::Gelu => burn::tensor::activation::gelu(tensor),
        }
    }

    /// Converts activation to a numeric ID for storage in Module.
    pub fn to_id(&self) -> u8 {
        match self {
            Activation::None => 0,
            Activation::Relu => 1,
            Activation::Sigmoid => 2,
            Activation::Tanh => 3,
            Activation::Gelu => 4,
        }
    }

    /// Creates an Activation from a numeric ID.
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Activation::Relu,
            2 => Activation::Sigmoid,
            3 => Activation::Tanh,
            4 => Activation::Gelu,
            _ => Activation::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_activation_id_roundtrip() {
        for act in [
            Activation::None,
            Activation::Relu,
            Activation::Sigmoid,
            Activation::Tanh,
            Activation::Gelu,
        ] {
            assert_eq!(Activation::from_id(act.to_id()), act);
        }
    }

    #[test]
    fn test_activation_serde_names() {
        let json = serde_json::to_string(&Activation::Gelu).unwrap();
        assert_eq!(json, "\"gelu\"");
        let parsed: Activation = serde_json::from_str("\"relu\"").unwrap();
        assert_eq!(parsed, Activation::Relu);
        assert!(serde_json::from_str::<Activation>("\"swish\"").is_err());
    }

    #[test]
    fn test_relu_activation() {
        let device = <TestBackend as Backend>::Device::default();
        let input = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 2.5], &device);
        let result: Vec<f32> = Activation::Relu.apply(input).to_data().to_vec().unwrap();
        assert_eq!(result, vec![0.0, 0.0, 2.5]);
    }

    #[test]
    fn test_gelu_activation() {
        let device = <TestBackend as Backend>::Device::default();
        // GeLU(-1) ≈ -0.1587, GeLU(0) = 0, GeLU(1) ≈ 0.8413
        let input = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 1.0], &device);
        let result: Vec<f32> = Activation::Gelu.apply(input).to_data().to_vec().unwrap();
        assert!((result[0] - (-0.1587)).abs() < 1e-3);
        assert!(result[1].abs() < 1e-5);
        assert!((result[2] - 0.8413).abs() < 1e-3);
    }
}
