//! Loss functions for training.

use crate::errors::ModelError;
use burn::tensor::{Tensor, backend::Backend};
use serde::{Deserialize, Serialize};

/// Supported loss functions. Every variant reduces to the mean over all
/// elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// Mean Squared Error loss.
    #[default]
    Mse,
    /// Mean Absolute Error loss.
    Mae,
    /// Binary Cross Entropy on probabilities in (0, 1).
    BinaryCrossEntropy,
    /// Binary Cross Entropy on raw logits.
    BinaryCrossEntropyWithLogits,
}

impl Loss {
    /// Computes the loss between predictions and targets of the same shape.
    pub fn compute<B: Backend, const D: usize>(
        &self,
        predictions: Tensor<B, D>,
        targets: Tensor<B, D>,
    ) -> Result<Tensor<B, 1>, ModelError> {
        let expected = targets.shape().num_elements();
        let actual = predictions.shape().num_elements();
        if predictions.dims() != targets.dims() {
            return Err(ModelError::ShapeMismatch { expected, actual });
        }

        let loss = match self {
            Loss::Mse => {
                let diff = predictions - targets;
                let squared = diff.clone() * diff;
                squared.mean()
            }
            Loss::Mae => (predictions - targets).abs().mean(),
            Loss::BinaryCrossEntropy => {
                // BCE = -mean(y * log(p) + (1-y) * log(1-p))
                let epsilon = 1e-7;
                let ones = Tensor::ones_like(&predictions);
                let p_clipped = predictions.clamp(epsilon, 1.0 - epsilon);
                let log_p = p_clipped.clone().log();
                let log_1_minus_p = (ones.clone() - p_clipped).log();
                let bce = targets.clone() * log_p + (ones - targets) * log_1_minus_p;
                bce.neg().mean()
            }
            Loss::BinaryCrossEntropyWithLogits => {
                // max(x, 0) - x * y + log(1 + exp(-|x|))
                let softplus = (predictions.clone().abs().neg().exp() + 1.0).log();
                (predictions.clone().clamp_min(0.0) - predictions * targets + softplus).mean()
            }
        };

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_mse_loss_zero() {
        let device = <TestBackend as Backend>::Device::default();
        let predictions = Tensor::<TestBackend, 2>::from_floats([[1.0, 2.0], [3.0, 4.0]], &device);
        let targets = predictions.clone();

        let loss = Loss::Mse.compute(predictions, targets).unwrap();
        let loss_value: f32 = loss.into_scalar();

        assert!(
            loss_value.abs() < 1e-6,
            "MSE of identical tensors should be 0"
        );
    }

    #[test]
    fn test_mse_loss_nonzero() {
        let device = <TestBackend as Backend>::Device::default();
        let predictions = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0], &device);
        let targets = Tensor::<TestBackend, 1>::from_floats([2.0, 2.0], &device);

        let loss_value: f32 = Loss::Mse.compute(predictions, targets).unwrap().into_scalar();

        // MSE = mean((1-2)^2 + (2-2)^2) = 0.5
        assert!((loss_value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_mae_loss() {
        let device = <TestBackend as Backend>::Device::default();
        let predictions = Tensor::<TestBackend, 1>::from_floats([1.0, -1.0, 3.0], &device);
        let targets = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 3.0], &device);

        let loss_value: f32 = Loss::Mae.compute(predictions, targets).unwrap().into_scalar();

        // mean(1 + 2 + 0) = 1
        assert!((loss_value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bce_loss_perfect_prediction() {
        let device = <TestBackend as Backend>::Device::default();
        let predictions = Tensor::<TestBackend, 1>::from_floats([0.99, 0.01], &device);
        let targets = Tensor::<TestBackend, 1>::from_floats([1.0, 0.0], &device);

        let loss_value: f32 = Loss::BinaryCrossEntropy
            .compute(predictions, targets)
            .unwrap()
            .into_scalar();

        assert!(loss_value < 0.1);
    }

    #[test]
    fn test_bce_with_logits_matches_bce_on_sigmoid() {
        let device = <TestBackend as Backend>::Device::default();
        let logits = Tensor::<TestBackend, 1>::from_floats([-2.0, 0.5, 3.0], &device);
        let targets = Tensor::<TestBackend, 1>::from_floats([0.0, 1.0, 1.0], &device);

        let from_logits: f32 = Loss::BinaryCrossEntropyWithLogits
            .compute(logits.clone(), targets.clone())
            .unwrap()
            .into_scalar();
        let from_probs: f32 = Loss::BinaryCrossEntropy
            .compute(burn::tensor::activation::sigmoid(logits), targets)
            .unwrap()
            .into_scalar();

        assert!((from_logits - from_probs).abs() < 1e-4);
    }

    #[test]
    fn test_shape_mismatch() {
        let device = <TestBackend as Backend>::Device::default();
        let predictions = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0, 3.0], &device);
        let targets = Tensor::<TestBackend, 1>::from_floats([1.0, 2.0], &device);

        let result = Loss::Mse.compute(predictions, targets);

        assert!(matches!(
            result,
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_loss_serde_names() {
        let loss: Loss = serde_json::from_str("\"binary_cross_entropy_with_logits\"").unwrap();
        assert_eq!(loss, Loss::BinaryCrossEntropyWithLogits);
        assert_eq!(serde_json::to_string(&Loss::Mae).unwrap(), "\"mae\"");
    }
}
