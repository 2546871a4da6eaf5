use std::path::PathBuf;

use clap::Parser;

use crate::training::TrainingConfig;

/// Train a fully connected network on a folder of labeled digit images.
#[derive(Parser, Debug)]
#[command(name = "mnist-train", version, about)]
pub struct TrainArgs {
    /// Number of images per batch.
    #[arg(short, long, default_value_t = 256)]
    pub batch_size: usize,

    /// Number of epochs to train for.
    #[arg(short, long, default_value_t = 3)]
    pub epochs: usize,

    /// Folder with one subfolder of images per label.
    #[arg(short, long, default_value = "mnist/train")]
    pub training_folder: PathBuf,

    /// Folder with the validation images, labeled like the training folder.
    #[arg(short, long, default_value = "mnist/valid")]
    pub validation_folder: PathBuf,

    /// Folder the configuration, checkpoints and trained model are written to.
    #[arg(short, long, default_value = "MnistTrainer")]
    pub model_folder: String,

    /// Number of data loader workers.
    #[arg(short = 'w', long, default_value_t = 4)]
    pub num_workers: usize,

    /// Seed of the weight initialization and of the shuffling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 1e-3)]
    pub learning_rate: f64,
}

impl TrainArgs {
    /// MNIST training configuration with the values given on the command line.
    pub fn config(&self) -> TrainingConfig {
        TrainingConfig::mnist()
            .with_batch_size(self.batch_size)
            .with_num_epochs(self.epochs)
            .with_num_workers(self.num_workers)
            .with_seed(self.seed)
            .with_learning_rate(self.learning_rate)
    }
}

/// Classify digit images with a model trained by `mnist-train`.
#[derive(Parser, Debug)]
#[command(name = "mnist-classify", version, about)]
pub struct ClassifyArgs {
    /// Folder of the trained model.
    #[arg(short, long, default_value = "MnistTrainer")]
    pub model_folder: String,

    /// Print each image as text before its classification.
    #[arg(long)]
    pub preview: bool,

    /// Image files, or folders walked for image files.
    pub inputs: Vec<PathBuf>,
}
