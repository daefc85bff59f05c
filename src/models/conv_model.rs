//! Training wrapper for the 1D convolutional network.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::{SequenceBatch, SequenceBatcher, SequenceItem, SequenceLoaders, check_items};
use crate::errors::ModelError;
use crate::networks::ConvNetwork;
use crate::training::{
    Loss, NetworkModel, TrainingConfig, checkpoint, flatten_output, mean_batch_loss,
};
use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    tensor::{
        ElementConversion, Tensor,
        backend::{AutodiffBackend, Backend},
    },
};
use log::info;

/// Display name and checkpoint file stem.
pub const CONV_MODEL_NAME: &str = "Conv_1D_Model";

fn check_channels<B: Backend>(features: &Tensor<B, 3>, in_channels: usize) -> Result<(), ModelError> {
    let [_, channels, _] = features.dims();
    if channels != in_channels {
        return Err(ModelError::ShapeMismatch {
            expected: in_channels,
            actual: channels,
        });
    }
    Ok(())
}

/// A [`ConvNetwork`] trained on `(features, label)` batches.
pub struct ConvModel<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<ConvNetwork<B>, B>,
{
    name: String,
    network: ConvNetwork<B>,
    dataloaders: SequenceLoaders<B>,
    loss: Loss,
    optimizer: O,
    learning_rate: f64,
    model_path: PathBuf,
    device: B::Device,
    show_progress: bool,
}

impl<B, O> ConvModel<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<ConvNetwork<B>, B>,
{
    /// Wraps `network`. The model is saved as `save_dir/Conv_1D_Model`.
    pub fn new(
        network: ConvNetwork<B>,
        dataloaders: SequenceLoaders<B>,
        loss: Loss,
        optimizer: O,
        learning_rate: f64,
        save_dir: impl AsRef<Path>,
        device: B::Device,
    ) -> Self {
        Self {
            name: CONV_MODEL_NAME.to_string(),
            network,
            dataloaders,
            loss,
            optimizer,
            learning_rate,
            model_path: checkpoint::save_path(save_dir, CONV_MODEL_NAME),
            device,
            show_progress: true,
        }
    }

    /// Wraps `network` with the loss, learning rate and verbosity of `config`.
    pub fn from_config(
        network: ConvNetwork<B>,
        dataloaders: SequenceLoaders<B>,
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

    /// Shows or hides the per-epoch progress bars.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Forward pass without gradient tracking on `[batch, channels, length]`,
    /// returning one value per sample.
    pub fn predict(&self, x: Tensor<B::InnerBackend, 3>) -> Result<Vec<f32>, ModelError> {
        let network = self.network.valid();
        check_channels(&x, network.in_channels())?;

        let output = flatten_output(network.forward(x))?;
        Ok(output.into_data().iter::<f32>().collect())
    }

    /// [`ConvModel::predict`] on raw items, which must share one shape.
    pub fn predict_items(&self, items: Vec<SequenceItem>) -> Result<Vec<f32>, ModelError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        check_items(&items)?;
        let batch: SequenceBatch<B::InnerBackend> = SequenceBatcher.batch(items, &self.device);
        self.predict(batch.features)
    }

    pub fn network(&self) -> &ConvNetwork<B> {
        &self.network
    }

    pub fn into_network(self) -> ConvNetwork<B> {
        self.network
    }
}

impl<B, O> NetworkModel for ConvModel<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<ConvNetwork<B>, B>,
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
                check_channels(&batch.features, self.network.in_channels())?;

                let output = flatten_output(self.network.forward(batch.features))?;
                let loss = self.loss.compute(output, batch.targets)?;
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
                check_channels(&batch.features, network.in_channels())?;

                let output = flatten_output(network.forward(batch.features))?;
                let loss = self.loss.compute(output, batch.targets)?;
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
