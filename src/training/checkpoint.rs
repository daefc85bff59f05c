//! Module checkpoint persistence.

use std::path::{Path, PathBuf};

use crate::errors::ModelError;
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::backend::Backend,
};

/// Recorder used for every checkpoint. The recorder appends its own file
/// extension to the paths given here.
pub type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Resolves where a model named `name` is persisted under `save_dir`.
pub fn save_path(save_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    save_dir.as_ref().join(name)
}

/// Writes the module's parameters to `path`, creating parent directories.
pub fn save_module<B: Backend, M: Module<B>>(module: &M, path: &Path) -> Result<(), ModelError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    module
        .clone()
        .save_file(path, &CheckpointRecorder::new())
        .map_err(|e| ModelError::Checkpoint {
            path: path.to_path_buf(),
            message: format!("{e:?}"),
        })
}

/// Loads parameters recorded at `path` into `module`.
pub fn load_module<B: Backend, M: Module<B>>(
    module: M,
    path: &Path,
    device: &B::Device,
) -> Result<M, ModelError> {
    module
        .load_file(path, &CheckpointRecorder::new(), device)
        .map_err(|e| ModelError::Checkpoint {
            path: path.to_path_buf(),
            message: format!("{e:?}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::{Dense, DenseConfig};
    use burn::backend::NdArray;
    use burn::tensor::Tensor;

    type TestBackend = NdArray;

    #[test]
    fn test_save_path_joins_name() {
        let path = save_path("models/run1", "Conv_1D_Model");
        assert_eq!(path, PathBuf::from("models/run1/Conv_1D_Model"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let device = <TestBackend as Backend>::Device::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dense");

        let original: Dense<TestBackend> = DenseConfig::new(3, 2).init(&device);
        save_module(&original, &path).unwrap();

        let fresh: Dense<TestBackend> = DenseConfig::new(3, 2).init(&device);
        let loaded = load_module(fresh, &path, &device).unwrap();

        let input = Tensor::<TestBackend, 2>::from_floats([[1.0, -2.0, 0.5]], &device);
        let expected: Vec<f32> = original.forward(input.clone()).to_data().to_vec().unwrap();
        let actual: Vec<f32> = loaded.forward(input).to_data().to_vec().unwrap();

        assert_eq!(expected, actual);
    }
}
