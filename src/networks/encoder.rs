//! Transformer encoder network with pretrained weight loading.

use std::path::Path;

use crate::errors::ModelError;
use crate::layers::{Activation, Dense, DenseConfig};
use crate::training::checkpoint;
use burn::{
    module::Module,
    nn::{
        Dropout, DropoutConfig, Embedding, EmbeddingConfig,
        transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput},
    },
    tensor::{Int, Tensor, backend::Backend},
};
use serde::{Deserialize, Serialize};

/// Configuration for building an [`EncoderNetwork`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderNetworkConfig {
    pub vocab_size: usize,
    /// Longest accepted sequence, including special tokens.
    pub max_seq_len: usize,
    pub d_model: usize,
    pub d_ff: usize,
    pub n_heads: usize,
    pub n_layers: usize,
    pub dropout: f64,
    pub output_size: usize,
    pub output_activation: Activation,
}

impl EncoderNetworkConfig {
    /// Creates a small encoder config with a single output.
    pub fn new(vocab_size: usize, max_seq_len: usize) -> Self {
        Self {
            vocab_size,
            max_seq_len,
            d_model: 128,
            d_ff: 512,
            n_heads: 4,
            n_layers: 2,
            dropout: 0.1,
            output_size: 1,
            output_activation: Activation::None,
        }
    }

    /// Sets model width, feed-forward width, head count and depth.
    pub fn with_dims(mut self, d_model: usize, d_ff: usize, n_heads: usize, n_layers: usize) -> Self {
        self.d_model = d_model;
        self.d_ff = d_ff;
        self.n_heads = n_heads;
        self.n_layers = n_layers;
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

    fn validate(&self) -> Result<(), ModelError> {
        if self.vocab_size == 0 || self.max_seq_len == 0 {
            return Err(ModelError::invalid_config(
                "vocab_size and max_seq_len must be positive",
            ));
        }
        if self.n_heads == 0 || self.d_model % self.n_heads != 0 {
            return Err(ModelError::invalid_config(format!(
                "d_model ({}) must be divisible by n_heads ({})",
                self.d_model, self.n_heads
            )));
        }
        if self.n_layers == 0 || self.d_ff == 0 {
            return Err(ModelError::invalid_config(
                "n_layers and d_ff must be positive",
            ));
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
        Ok(())
    }

    /// Builds a randomly initialized network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<EncoderNetwork<B>, ModelError> {
        self.validate()?;

        let encoder =
            TransformerEncoderConfig::new(self.d_model, self.d_ff, self.n_heads, self.n_layers)
                .with_dropout(self.dropout)
                .with_norm_first(true)
                .init(device);

        Ok(EncoderNetwork {
            token_embedding: EmbeddingConfig::new(self.vocab_size, self.d_model).init(device),
            position_embedding: EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device),
            encoder,
            pooler: DenseConfig::new(self.d_model, self.d_model)
                .with_activation(Activation::Tanh)
                .init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            head: DenseConfig::new(self.d_model, self.output_size)
                .with_activation(self.output_activation)
                .init(device),
            vocab_size: self.vocab_size,
            max_seq_len: self.max_seq_len,
            d_model: self.d_model,
        })
    }

    /// Builds the network and restores pretrained weights from a record file
    /// previously written with [`checkpoint::save_module`].
    pub fn init_pretrained<B: Backend>(
        &self,
        path: &Path,
        device: &B::Device,
    ) -> Result<EncoderNetwork<B>, ModelError> {
        let network = self.init(device)?;
        log::info!("Loading pretrained encoder weights from {}", path.display());
        checkpoint::load_module(network, path, device)
    }
}

/// Token + position embeddings, a transformer encoder, a tanh pooler over
/// the first token, and a dense head.
#[derive(Module, Debug)]
pub struct EncoderNetwork<B: Backend> {
    token_embedding: Embedding<B>,
    position_embedding: Embedding<B>,
    encoder: TransformerEncoder<B>,
    pooler: Dense<B>,
    dropout: Dropout,
    head: Dense<B>,
    vocab_size: usize,
    max_seq_len: usize,
    d_model: usize,
}

impl<B: Backend> EncoderNetwork<B> {
    /// Maps token ids and attention mask (`1` = token, `0` = padding), both
    /// `[batch, seq_len]`, to `[batch, output_size]`.
    pub fn forward(
        &self,
        input_ids: Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let device = input_ids.device();
        let [batch, seq_len] = input_ids.dims();

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .reshape([1, seq_len])
            .repeat_dim(0, batch);

        let embedded =
            self.token_embedding.forward(input_ids) + self.position_embedding.forward(positions);

        let mask_pad = attention_mask.equal_elem(0);
        let encoded = self
            .encoder
            .forward(TransformerEncoderInput::new(embedded).mask_pad(mask_pad));

        let first_token = encoded
            .slice([0..batch, 0..1, 0..self.d_model])
            .reshape([batch, self.d_model]);
        let pooled = self.dropout.forward(self.pooler.forward(first_token));

        self.head.forward(pooled)
    }

    /// Token ids must be below this.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    pub fn output_size(&self) -> usize {
        self.head.output_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    fn small_config() -> EncoderNetworkConfig {
        EncoderNetworkConfig::new(20, 8)
            .with_dims(16, 32, 2, 1)
            .with_dropout(0.0)
    }

    #[test]
    fn test_encoder_forward_shape() {
        let device = <TestBackend as Backend>::Device::default();
        let network: EncoderNetwork<TestBackend> = small_config().init(&device).unwrap();

        let ids = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![1i64, 5, 7, 0, 2, 3, 0, 0], [2, 4]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![1i64, 1, 1, 0, 1, 1, 0, 0], [2, 4]),
            &device,
        );

        let output = network.forward(ids, mask);

        assert_eq!(output.dims(), [2, 1]);
        assert_eq!(network.vocab_size(), 20);
        assert_eq!(network.max_seq_len(), 8);
        assert_eq!(network.output_size(), 1);
    }

    #[test]
    fn test_encoder_rejects_indivisible_heads() {
        let device = <TestBackend as Backend>::Device::default();
        let result: Result<EncoderNetwork<TestBackend>, _> = EncoderNetworkConfig::new(20, 8)
            .with_dims(10, 32, 3, 1)
            .init(&device);

        assert!(matches!(result, Err(ModelError::InvalidConfig { .. })));
    }

    #[test]
    fn test_init_pretrained_restores_weights() {
        let device = <TestBackend as Backend>::Device::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("encoder");

        let original: EncoderNetwork<TestBackend> = small_config().init(&device).unwrap();
        checkpoint::save_module(&original, &path).unwrap();

        let restored: EncoderNetwork<TestBackend> =
            small_config().init_pretrained(&path, &device).unwrap();

        let ids = Tensor::<TestBackend, 2, Int>::from_data(
            TensorData::new(vec![3i64, 4, 5], [1, 3]),
            &device,
        );
        let mask = Tensor::<TestBackend, 2, Int>::ones([1, 3], &device);

        let expected: Vec<f32> = original
            .forward(ids.clone(), mask.clone())
            .to_data()
            .to_vec()
            .unwrap();
        let actual: Vec<f32> = restored.forward(ids, mask).to_data().to_vec().unwrap();

        for (e, a) in expected.iter().zip(actual.iter()) {
            assert!((e - a).abs() < 1e-5, "expected {e}, got {a}");
        }
    }

    #[test]
    fn test_init_pretrained_missing_file() {
        let device = <TestBackend as Backend>::Device::default();
        let dir = tempfile::tempdir().unwrap();

        let result: Result<EncoderNetwork<TestBackend>, _> =
            small_config().init_pretrained(&dir.path().join("missing"), &device);

        assert!(matches!(result, Err(ModelError::Checkpoint { .. })));
    }
}
