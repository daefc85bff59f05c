//! Dataset items, batchers and data loader construction.
//!
//! - [`SequenceItem`] / [`SequenceBatcher`]: numeric feature sequences with a
//!   scalar label, for the convolutional model.
//! - [`EncodedItem`] / [`EncodedBatcher`]: tokenized text with an attention
//!   mask and a scalar target, for the pretrained encoder model.
//! - [`DataLoaders`]: the train/valid loader pair a model iterates over.
//!
//! Items are shape-checked through [`BatchItem`] before they are batched.

mod encoded;
mod item;
mod loaders;
mod sequence;

pub use encoded::{EncodedBatch, EncodedBatcher, EncodedItem, encoded_dataset};
pub use item::{BatchItem, check_dataset, check_items};
pub use loaders::{DataLoaders, EncodedLoaders, SequenceLoaders};
pub use sequence::{SequenceBatch, SequenceBatcher, SequenceItem, sequence_dataset};
