#![warn(missing_docs)]

//! # Image Classifier Dataset
//!
//! Image classification dataset read from a folder with one subfolder per label.
//!
//! - [LabeledFileIndex] lists the images of the label subfolders in a deterministic order.
//! - [LabelRegistry] maps label names to dense class ids, in sorted label order.
//! - [normalize] decodes an image into a `[width, height, channels]` tensor in `[0, 1]`.
//! - [ImageClassifierDataset] gives random access to `(tensor, class id)` samples.

mod dataset;
mod error;
mod index;
mod normalizer;
mod registry;

pub use dataset::*;
pub use error::*;
pub use index::*;
pub use normalizer::*;
pub use registry::*;
