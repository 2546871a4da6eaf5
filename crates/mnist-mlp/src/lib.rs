//! Fully connected MNIST classifier trained on folders of labeled images.
//!
//! Images are read with [image_classifier_dataset], batched by [data], trained with the burn
//! learner in [training] and classified in [inference].

pub mod backend;
pub mod cli;
pub mod data;
pub mod inference;
pub mod logger;
pub mod model;
pub mod training;
pub mod translator;

mod error;

pub use error::*;
