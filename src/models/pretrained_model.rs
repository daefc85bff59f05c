//! Fine-tuning wrapper for the pretrained encoder network.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::{EncodedBatch, EncodedBatcher, EncodedItem, EncodedLoaders, check_items};
use crate::errors::ModelError;
use crate::networks::EncoderNetwork;
use crate::training::{
    Loss, NetworkModel, TrainingConfig, checkpoint, flatten_output, mean_batch_loss,
};
use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    tensor::{
        ElementConversion, Int, Tensor,
        backend::{AutodiffBackend, Backend},
    },
};
use log::info;

/// Display name and checkpoint file stem.
pub const PRETRAINED_MODEL_NAME: &str = "Pretrained_bert_model";

/// Rejects batches the encoder's embedding tables cannot look up.
fn check_input_ids<B: Backend>(
    input_ids: &Tensor<B, 2, Int>,
    max_seq_len: usize,
    vocab_size: usize,
) -> Result<(), ModelError> {
    let [batch, seq_len] = input_ids.dims();
    if seq_len > max_seq_len {
        return Err(ModelError::ShapeMismatch {
            expected: max_seq_len,
            actual: seq_len,
        });
    }
    if batch == 0 || seq_len == 0 {
        return Ok(());
    }

    let smallest: i64 = input_ids.clone().min().into_scalar().elem();
    let largest: i64 = input_ids.clone().max().into_scalar().elem();
    for token in [smallest, largest] {
        if token < 0 || token as usize >= vocab_size {
            return Err(ModelError::TokenOutOfRange { token, vocab_size });
        }
    }
    Ok(())
}

/// An [`EncoderNetwork`] fine-tuned on `(input_ids, attention_mask, target)`
/// batches.
///
/// Training and validation unpack batches the same way: both feed ids and
/// mask to the network and compare against float targets.
pub struct PretrainedModel<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<EncoderNetwork<B>, B>,
{
    name: String,
    network: EncoderNetwork<B>,
    dataloaders: EncodedLoaders<B>,
    loss: Loss,
    optimizer: O,
    learning_rate: f64,
    model_path: PathBuf,
    device: B::Device,
    show_progress: bool,
}

impl<B, O> PretrainedModel<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<EncoderNetwork<B>, B>,
{
    /// Wraps `network`. The model is saved as `save_dir/Pretrained_bert_model`.
    pub fn new(
        network: EncoderNetwork<B>,
        dataloaders: EncodedLoaders<B>,
        loss: Loss,
        optimizer: O,
        learning_rate: f64,
        save_dir: impl AsRef<Path>,
        device: B::Device,
    ) -> Self {
        Self {
            name: PRETRAINED_MODEL_NAME.to_string(),
            network,
            dataloaders,
            loss,
            optimizer,
            learning_rate,
            model_path: checkpoint::save_path(save_dir, PRETRAINED_MODEL_NAME),
            device,
            show_progress: true,
        }
    }

    /// Wraps `network` with the loss, learning rate and verbosity of `config`.
    pub fn from_config(
        network: EncoderNetwork<B>,
        dataloaders: EncodedLoaders<B>,
        optimizer: O,
        config: &TrainingConfig,
        save_dir: impl AsRef<Path>,
        device: B::Device,
    ) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self::new(
            network,
            dataloaders,
            config.loss,
            optimizer,
            config.learning_rate,
            save_dir,
            device,
        )
        .with_progress(config.verbose))
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Forward pass without gradient tracking, one value per sequence.
    pub fn predict(
        &self,
        input_ids: Tensor<B::InnerBackend, 2, Int>,
        attention_mask: Tensor<B::InnerBackend, 2, Int>,
    ) -> Result<Vec<f32>, ModelError> {
        let network = self.network.valid();
        check_input_ids(&input_ids, network.max_seq_len(), network.vocab_size())?;

        let output = flatten_output(network.forward(input_ids, attention_mask))?;
        Ok(output.into_data().iter::<f32>().collect())
    }

    /// [`PretrainedModel::predict`] on tokenized items, padded with id `0`.
    pub fn predict_items(&self, items: Vec<EncodedItem>) -> Result<Vec<f32>, ModelError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        check_items(&items)?;
        let batch: EncodedBatch<B::InnerBackend> =
            EncodedBatcher::default().batch(items, &self.device);
        self.predict(batch.input_ids, batch.attention_mask)
    }

    pub fn network(&self) -> &EncoderNetwork<B> {
        &self.network
    }

    pub fn into_network(self) -> EncoderNetwork<B> {
        self.network
    }
}

impl<B, O> NetworkModel for PretrainedModel<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<EncoderNetwork<B>, B>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn train_one_epoch(&mut self) -> Result<f64, ModelError> {
        let loader = Arc::clone(&self.dataloaders.train);

        mean_batch_loss(
            loader.as_ref(),
            "train",
            "Training",
            self.show_progress,
            |batch| {
                check_input_ids(
                    &batch.input_ids,
                    self.network.max_seq_len(),
                    self.network.vocab_size(),
                )?;

                let output = self.network.forward(batch.input_ids, batch.attention_mask);
                let loss = self.loss.compute(flatten_output(output)?, batch.targets)?;
                let loss_value: f64 = loss.clone().into_scalar().elem();

                let grads = GradientsParams::from_grads(loss.backward(), &self.network);
                self.network =
                    self.optimizer
                        .step(self.learning_rate, self.network.clone(), grads);

                Ok(loss_value)
            },
        )
    }

    fn validate_one_epoch(&self) -> Result<f64, ModelError> {
        let network = self.network.valid();

        mean_batch_loss(
            self.dataloaders.valid.as_ref(),
            "valid",
            "Validation",
            self.show_progress,
            |batch| {
                check_input_ids(&batch.input_ids, network.max_seq_len(), network.vocab_size())?;

                let output = network.forward(batch.input_ids, batch.attention_mask);
                let loss = self.loss.compute(flatten_output(output)?, batch.targets)?;
                Ok(loss.into_scalar().elem())
            },
        )
    }

    fn save(&self) -> Result<(), ModelError> {
        info!("Saving {} at {}", self.name, self.model_path.display());
        checkpoint::save_module(&self.network, &self.model_path)
    }

    fn load(&mut self) -> Result<(), ModelError> {
        info!("Loading {} from {}", self.name, self.model_path.display());
        self.network = checkpoint::load_module(self.network.clone(), &self.model_path, &self.device)?;
        Ok(())
    }
}
