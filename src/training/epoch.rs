//! Batch iteration shared by every training and validation epoch.

use crate::errors::ModelError;
use burn::{
    data::dataloader::{DataLoader, DataLoaderIterator},
    tensor::{Tensor, backend::Backend},
};
use indicatif::{ProgressBar, ProgressStyle};

fn progress_bar(label: &str, total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{prefix:<11} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    bar.set_style(style);
    bar.set_prefix(label.to_string());
    bar
}

/// Runs `step` on every batch of `loader` and returns the mean of the scalar
/// losses it reports.
///
/// `split` names the loader in errors, `label` prefixes the progress bar.
pub fn mean_batch_loss<B, O, F>(
    loader: &dyn DataLoader<B, O>,
    split: &'static str,
    label: &str,
    show_progress: bool,
    mut step: F,
) -> Result<f64, ModelError>
where
    B: Backend,
    F: FnMut(O) -> Result<f64, ModelError>,
{
    let bar = progress_bar(label, loader.num_items(), show_progress);
    let mut losses = Vec::new();

    let mut batches = loader.iter();
    while let Some(batch) = batches.next() {
        let loss = step(batch)?;
        losses.push(loss);

        bar.set_position(batches.progress().items_processed as u64);
        bar.set_message(format!("loss {loss:.4}"));
    }
    bar.finish_and_clear();

    if losses.is_empty() {
        return Err(ModelError::EmptyDataLoader { split });
    }

    Ok(losses.iter().sum::<f64>() / losses.len() as f64)
}

/// Drops the singleton output dimension: `[batch, 1]` becomes `[batch]`.
pub fn flatten_output<B: Backend>(output: Tensor<B, 2>) -> Result<Tensor<B, 1>, ModelError> {
    let [batch, width] = output.dims();
    if width != 1 {
        return Err(ModelError::ShapeMismatch {
            expected: 1,
            actual: width,
        });
    }
    Ok(output.reshape([batch]))
}
