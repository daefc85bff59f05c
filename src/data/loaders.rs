//! Train/valid data loader pair.

use std::sync::Arc;

use super::{BatchItem, EncodedBatch, SequenceBatch, check_dataset};
use crate::errors::ModelError;
use crate::training::TrainingConfig;
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder, batcher::Batcher},
        dataset::Dataset,
    },
    tensor::backend::AutodiffBackend,
};

/// Loaders a model iterates over each epoch.
///
/// Validation batches live on the inner backend so that no autodiff graph is
/// recorded for them.
pub struct DataLoaders<B: AutodiffBackend, T, V> {
    pub train: Arc<dyn DataLoader<B, T>>,
    pub valid: Arc<dyn DataLoader<B::InnerBackend, V>>,
}

/// Loaders of [`SequenceBatch`]es.
pub type SequenceLoaders<B> =
    DataLoaders<B, SequenceBatch<B>, SequenceBatch<<B as AutodiffBackend>::InnerBackend>>;

/// Loaders of [`EncodedBatch`]es.
pub type EncodedLoaders<B> =
    DataLoaders<B, EncodedBatch<B>, EncodedBatch<<B as AutodiffBackend>::InnerBackend>>;

impl<B: AutodiffBackend, T, V> Clone for DataLoaders<B, T, V> {
    fn clone(&self) -> Self {
        Self {
            train: Arc::clone(&self.train),
            valid: Arc::clone(&self.valid),
        }
    }
}

impl<B, T, V> DataLoaders<B, T, V>
where
    B: AutodiffBackend,
    T: Send + Clone + std::fmt::Debug + 'static,
    V: Send + Clone + std::fmt::Debug + 'static,
{
    pub fn new(
        train: Arc<dyn DataLoader<B, T>>,
        valid: Arc<dyn DataLoader<B::InnerBackend, V>>,
    ) -> Self {
        Self { train, valid }
    }

    /// Builds both loaders with the batch size, worker count and shuffle
    /// seed of `config`. Only the training loader is shuffled.
    ///
    /// Every item of both datasets is shape-checked first, since a batcher
    /// cannot report a bad item.
    pub fn from_datasets<I, Bt, DT, DV>(
        batcher: Bt,
        train: DT,
        valid: DV,
        config: &TrainingConfig,
        device: &B::Device,
    ) -> Result<Self, ModelError>
    where
        I: BatchItem + Send + Sync + Clone + std::fmt::Debug + 'static,
        Bt: Batcher<B, I, T> + Batcher<B::InnerBackend, I, V> + Clone + 'static,
        DT: Dataset<I> + 'static,
        DV: Dataset<I> + 'static,
    {
        config.validate()?;
        if train.is_empty() {
            return Err(ModelError::EmptyDataLoader { split: "train" });
        }
        if valid.is_empty() {
            return Err(ModelError::EmptyDataLoader { split: "valid" });
        }
        check_dataset(&train)?;
        check_dataset(&valid)?;

        log::debug!(
            "Building data loaders: {} train / {} valid items, batch size {}",
            train.len(),
            valid.len(),
            config.batch_size
        );

        let mut train_builder = DataLoaderBuilder::<B, I, T>::new(batcher.clone())
            .batch_size(config.batch_size)
            .shuffle(config.seed)
            .set_device(device.clone());
        let mut valid_builder = DataLoaderBuilder::<B::InnerBackend, I, V>::new(batcher)
            .batch_size(config.batch_size)
            .set_device(device.clone());

        if config.num_workers > 0 {
            train_builder = train_builder.num_workers(config.num_workers);
            valid_builder = valid_builder.num_workers(config.num_workers);
        }

        Ok(Self {
            train: train_builder.build(train),
            valid: valid_builder.build(valid),
        })
    }
}
