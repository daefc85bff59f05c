//! Shape checks run before items reach a batcher.

use crate::errors::ModelError;
use burn::data::dataset::Dataset;

/// An item a batcher can stack with others.
///
/// Batchers cannot fail, so every item is checked against the first one of
/// its collection before it is batched.
pub trait BatchItem {
    /// Checks `self` on its own and against `first`.
    fn check_against(&self, first: &Self) -> Result<(), ModelError>;
}

/// Checks every item of `items` against the first one.
pub fn check_items<I: BatchItem>(items: &[I]) -> Result<(), ModelError> {
    if let Some(first) = items.first() {
        for item in items {
            item.check_against(first)?;
        }
    }
    Ok(())
}

/// [`check_items`] over a dataset of any kind.
pub fn check_dataset<I: BatchItem, D: Dataset<I>>(dataset: &D) -> Result<(), ModelError> {
    let mut items = dataset.iter();
    if let Some(first) = items.next() {
        first.check_against(&first)?;
        for item in items {
            item.check_against(&first)?;
        }
    }
    Ok(())
}
