use std::path::PathBuf;

use thiserror::Error;

/// Error type for [ImageClassifierDataset](crate::ImageClassifierDataset).
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset root does not exist, is not a directory or cannot be listed.
    #[error("Cannot read from folder `{}`: {reason}", .path.display())]
    InvalidRoot {
        /// Root folder given to the dataset.
        path: PathBuf,
        /// Why the folder was rejected.
        reason: String,
    },

    /// The dataset root has no eligible label subfolder.
    #[error("Folder `{}` contains no label subfolders", .0.display())]
    EmptyDataset(PathBuf),

    /// The label was never registered.
    #[error("Unknown label: `{0}`")]
    UnknownLabel(String),

    /// A label list that is not sorted or contains duplicates.
    #[error("Labels should be sorted and unique, got {0:?}")]
    InvalidLabels(Vec<String>),

    /// A sample index or class id outside of the valid range.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of valid entries.
        len: usize,
    },

    /// The file could not be opened or decoded as an image.
    #[error("Cannot decode image `{}`: {source}", .path.display())]
    UnreadableImage {
        /// Image file.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },
}
