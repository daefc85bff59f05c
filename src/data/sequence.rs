//! Numeric feature sequences.

use super::{BatchItem, check_items};
use crate::errors::ModelError;
use burn::{
    data::{dataloader::batcher::Batcher, dataset::InMemDataset},
    tensor::{Tensor, TensorData, backend::Backend},
};
use serde::{Deserialize, Serialize};

/// One sample: `channels × length` features and a numeric label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceItem {
    pub features: Vec<Vec<f32>>,
    pub label: f32,
}

impl SequenceItem {
    pub fn new(features: Vec<Vec<f32>>, label: f32) -> Self {
        Self { features, label }
    }

    /// A single-channel sequence.
    pub fn univariate(values: Vec<f32>, label: f32) -> Self {
        Self {
            features: vec![values],
            label,
        }
    }

    pub fn channels(&self) -> usize {
        self.features.len()
    }

    pub fn length(&self) -> usize {
        self.features.first().map(Vec::len).unwrap_or(0)
    }
}

impl BatchItem for SequenceItem {
    /// Every item needs the channel count and length of `first`, with rows of
    /// equal length.
    fn check_against(&self, first: &Self) -> Result<(), ModelError> {
        let channels = first.channels();
        let length = first.length();
        if channels == 0 || length == 0 {
            return Err(ModelError::invalid_config(
                "sequence items need at least one channel and one step",
            ));
        }

        if self.channels() != channels {
            return Err(ModelError::ShapeMismatch {
                expected: channels,
                actual: self.channels(),
            });
        }
        if let Some(row) = self.features.iter().find(|row| row.len() != length) {
            return Err(ModelError::ShapeMismatch {
                expected: length,
                actual: row.len(),
            });
        }
        Ok(())
    }
}

/// Builds an in-memory dataset, checking that every item has the same
/// number of channels and the same length.
pub fn sequence_dataset(items: Vec<SequenceItem>) -> Result<InMemDataset<SequenceItem>, ModelError> {
    check_items(&items)?;
    Ok(InMemDataset::new(items))
}

/// A batch of sequences.
#[derive(Clone, Debug)]
pub struct SequenceBatch<B: Backend> {
    /// `[batch, channels, length]`
    pub features: Tensor<B, 3>,
    /// `[batch]`, labels cast to float.
    pub targets: Tensor<B, 1>,
}

/// Stacks [`SequenceItem`]s that share one shape; see [`check_items`].
#[derive(Clone, Debug, Default)]
pub struct SequenceBatcher;

impl<B: Backend> Batcher<B, SequenceItem, SequenceBatch<B>> for SequenceBatcher {
    fn batch(&self, items: Vec<SequenceItem>, device: &B::Device) -> SequenceBatch<B> {
        let batch_size = items.len();
        let channels = items.first().map(SequenceItem::channels).unwrap_or(0);
        let length = items.first().map(SequenceItem::length).unwrap_or(0);

        let features: Vec<f32> = items
            .iter()
            .flat_map(|item| item.features.iter().flatten().copied())
            .collect();
        let targets: Vec<f32> = items.iter().map(|item| item.label).collect();

        SequenceBatch {
            features: Tensor::from_data(
                TensorData::new(features, [batch_size, channels, length]),
                device,
            ),
            targets: Tensor::from_data(TensorData::new(targets, [batch_size]), device),
        }
    }
}
