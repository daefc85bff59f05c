//! Tokenized text samples for the encoder model.

use super::{BatchItem, check_items};
use crate::errors::ModelError;
use burn::{
    data::{dataloader::batcher::Batcher, dataset::InMemDataset},
    tensor::{Int, Tensor, TensorData, backend::Backend},
};
use serde::{Deserialize, Serialize};

/// One tokenized sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedItem {
    pub input_ids: Vec<u32>,
    /// `1` for real tokens, `0` for padding. Same length as `input_ids`.
    pub attention_mask: Vec<u8>,
    pub target: f32,
}

impl EncodedItem {
    /// An item whose tokens are all attended to.
    pub fn new(input_ids: Vec<u32>, target: f32) -> Self {
        let attention_mask = vec![1; input_ids.len()];
        Self {
            input_ids,
            attention_mask,
            target,
        }
    }

    pub fn with_mask(input_ids: Vec<u32>, attention_mask: Vec<u8>, target: f32) -> Self {
        Self {
            input_ids,
            attention_mask,
            target,
        }
    }
}

impl BatchItem for EncodedItem {
    /// Items pad to each other, so only the item itself is checked.
    fn check_against(&self, _first: &Self) -> Result<(), ModelError> {
        if self.input_ids.is_empty() {
            return Err(ModelError::invalid_config("encoded items need at least one token"));
        }
        if self.attention_mask.len() != self.input_ids.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.input_ids.len(),
                actual: self.attention_mask.len(),
            });
        }
        Ok(())
    }
}

/// Builds an in-memory dataset, checking that every item has tokens and a
/// mask of matching length.
pub fn encoded_dataset(items: Vec<EncodedItem>) -> Result<InMemDataset<EncodedItem>, ModelError> {
    check_items(&items)?;
    Ok(InMemDataset::new(items))
}

/// A padded batch of tokenized samples.
#[derive(Clone, Debug)]
pub struct EncodedBatch<B: Backend> {
    /// `[batch, seq_len]`
    pub input_ids: Tensor<B, 2, Int>,
    /// `[batch, seq_len]`, `0` on padding.
    pub attention_mask: Tensor<B, 2, Int>,
    /// `[batch]`
    pub targets: Tensor<B, 1>,
}

/// Right-pads every item to the longest sequence of the batch, truncating
/// to `max_len` when set.
#[derive(Clone, Debug, Default)]
pub struct EncodedBatcher {
    pad_id: u32,
    max_len: Option<usize>,
}

impl EncodedBatcher {
    pub fn new(pad_id: u32) -> Self {
        Self {
            pad_id,
            max_len: None,
        }
    }

    /// Truncates sequences longer than `max_len`.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

impl<B: Backend> Batcher<B, EncodedItem, EncodedBatch<B>> for EncodedBatcher {
    fn batch(&self, items: Vec<EncodedItem>, device: &B::Device) -> EncodedBatch<B> {
        let batch_size = items.len();
        let longest = items.iter().map(|item| item.input_ids.len()).max().unwrap_or(0);
        let seq_len = self.max_len.map_or(longest, |max| longest.min(max));

        let mut input_ids = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask = Vec::with_capacity(batch_size * seq_len);

        for item in &items {
            for position in 0..seq_len {
                match item.input_ids.get(position) {
                    Some(&id) => {
                        input_ids.push(id as i64);
                        attention_mask
                            .push(item.attention_mask.get(position).copied().unwrap_or(1) as i64);
                    }
                    None => {
                        input_ids.push(self.pad_id as i64);
                        attention_mask.push(0);
                    }
                }
            }
        }

        let targets: Vec<f32> = items.iter().map(|item| item.target).collect();

        EncodedBatch {
            input_ids: Tensor::from_data(TensorData::new(input_ids, [batch_size, seq_len]), device),
            attention_mask: Tensor::from_data(
                TensorData::new(attention_mask, [batch_size, seq_len]),
                device,
            ),
            targets: Tensor::from_data(TensorData::new(targets, [batch_size]), device),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_pads_to_longest() {
        let device = <TestBackend as Backend>::Device::default();
        let items = vec![
            EncodedItem::new(vec![101, 7, 102], 1.0),
            EncodedItem::new(vec![101, 102], 0.0),
        ];

        let batch: EncodedBatch<TestBackend> = EncodedBatcher::new(0).batch(items, &device);

        assert_eq!(batch.input_ids.dims(), [2, 3]);
        let ids: Vec<i64> = batch.input_ids.to_data().convert::<i64>().to_vec().unwrap();
        let mask: Vec<i64> = batch
            .attention_mask
            .to_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(ids, vec![101, 7, 102, 101, 102, 0]);
        assert_eq!(mask, vec![1, 1, 1, 1, 1, 0]);

        let targets: Vec<f32> = batch.targets.to_data().to_vec().unwrap();
        assert_eq!(targets, vec![1.0, 0.0]);
    }

    #[test]
    fn test_batch_keeps_explicit_mask() {
        let device = <TestBackend as Backend>::Device::default();
        let items = vec![EncodedItem::with_mask(vec![5, 6, 0], vec![1, 1, 0], 0.5)];

        let batch: EncodedBatch<TestBackend> = EncodedBatcher::default().batch(items, &device);

        let mask: Vec<i64> = batch
            .attention_mask
            .to_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(mask, vec![1, 1, 0]);
    }

    #[test]
    fn test_batch_truncates_to_max_len() {
        let device = <TestBackend as Backend>::Device::default();
        let items = vec![EncodedItem::new(vec![1, 2, 3, 4, 5], 0.0)];

        let batch: EncodedBatch<TestBackend> =
            EncodedBatcher::new(0).with_max_len(3).batch(items, &device);

        assert_eq!(batch.input_ids.dims(), [1, 3]);
    }

    #[test]
    fn test_encoded_dataset_validates_items() {
        assert!(encoded_dataset(vec![EncodedItem::new(vec![1, 2], 0.0)]).is_ok());
        assert!(matches!(
            encoded_dataset(vec![EncodedItem::new(vec![], 0.0)]),
            Err(ModelError::InvalidConfig { .. })
        ));
        assert!(matches!(
            encoded_dataset(vec![EncodedItem::with_mask(vec![1, 2], vec![1], 0.0)]),
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
