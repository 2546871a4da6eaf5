use std::path::PathBuf;

use burn::config::ConfigError;
use burn::record::RecorderError;
use image_classifier_dataset::DatasetError;
use thiserror::Error;

/// Errors of the training and classification drivers.
#[derive(Error, Debug)]
pub enum MnistError {
    /// Dataset listing or image decoding failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The validation folder does not have the same labels as the training folder.
    #[error("Validation labels {validation:?} do not match training labels {training:?}")]
    LabelMismatch {
        /// Labels of the training folder.
        training: Vec<String>,
        /// Labels of the validation folder.
        validation: Vec<String>,
    },

    /// The label file does not have one label per network output.
    #[error("Label file has {labels} labels but the network has {outputs} outputs")]
    LabelCountMismatch {
        /// Number of labels in the label file.
        labels: usize,
        /// Output size of the network.
        outputs: usize,
    },

    /// An image does not have the shape the network was trained with.
    #[error("Image `{}` has shape {found:?}, expected {expected:?}", .path.display())]
    UnexpectedShape {
        /// Image file.
        path: PathBuf,
        /// Shape the network expects, `[width, height, channels]`.
        expected: [usize; 3],
        /// Shape of the decoded image.
        found: [usize; 3],
    },

    /// Training configuration could not be loaded.
    #[error("Cannot load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Model weights could not be saved or loaded.
    #[error("Cannot save or load model weights: {0}")]
    Recorder(#[from] RecorderError),

    /// Label file could not be read or written.
    #[error("Invalid label file: {0}")]
    Labels(#[from] serde_json::Error),

    /// Input folders could not be walked.
    #[error("Cannot list input files: {0}")]
    Walk(#[from] globwalk::GlobError),

    /// I/O operation error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
