use std::fs;
use std::path::Path;
use std::time::Instant;

use burn::{
    data::dataloader::DataLoaderBuilder,
    nn::loss::CrossEntropyLossConfig,
    optim::AdamConfig,
    prelude::*,
    record::CompactRecorder,
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LossMetric},
        ClassificationOutput, LearnerBuilder, TrainOutput, TrainStep, ValidStep,
    },
};
use image_classifier_dataset::{
    ColorMode, ImageClassifierDataset, ImageClassifierDatasetConfig, LabelRegistry,
};

use crate::{
    data::{ImageClassificationBatch, ImageClassificationBatcher, LabeledImages},
    model::{FullyConnectedNetwork, FullyConnectedNetworkConfig},
    MnistError,
};

/// Training configuration, relative to the model folder.
pub const CONFIG_FILE: &str = "config.json";
/// Label list, relative to the model folder.
pub const LABELS_FILE: &str = "labels.json";
/// Model weights without the recorder extension, relative to the model folder.
pub const MODEL_FILE: &str = "model";

impl<B: Backend> FullyConnectedNetwork<B> {
    pub fn forward_classification(
        &self,
        images: Tensor<B, 4>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B> {
        let output = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput::new(loss, output, targets)
    }
}

impl<B: AutodiffBackend> TrainStep<ImageClassificationBatch<B>, ClassificationOutput<B>>
    for FullyConnectedNetwork<B>
{
    fn step(&self, batch: ImageClassificationBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        let item = self.forward_classification(batch.images, batch.targets);

        TrainOutput::new(self, item.loss.backward(), item)
    }
}

impl<B: Backend> ValidStep<ImageClassificationBatch<B>, ClassificationOutput<B>>
    for FullyConnectedNetwork<B>
{
    fn step(&self, batch: ImageClassificationBatch<B>) -> ClassificationOutput<B> {
        self.forward_classification(batch.images, batch.targets)
    }
}

#[derive(Config)]
pub struct TrainingConfig {
    pub model: FullyConnectedNetworkConfig,
    pub optimizer: AdamConfig,
    #[config(default = 3)]
    pub num_epochs: usize,
    #[config(default = 256)]
    pub batch_size: usize,
    #[config(default = 4)]
    pub num_workers: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 1e-3)]
    pub learning_rate: f64,
}

impl TrainingConfig {
    /// MNIST network trained with Adam.
    pub fn mnist() -> Self {
        Self::new(FullyConnectedNetworkConfig::mnist(), AdamConfig::new())
    }
}

/// Write the label list of a registry as a JSON array.
pub fn save_labels(registry: &LabelRegistry, path: &Path) -> Result<(), MnistError> {
    let json = serde_json::to_string_pretty(registry)?;
    fs::write(path, json)?;

    Ok(())
}

/// Read a label list written by [save_labels].
pub fn load_labels(path: &Path) -> Result<LabelRegistry, MnistError> {
    let json = fs::read_to_string(path)?;

    Ok(serde_json::from_str(&json)?)
}

fn grayscale_dataset(folder: &Path) -> Result<ImageClassifierDataset, MnistError> {
    let config = ImageClassifierDatasetConfig::new(folder).with_color_mode(ColorMode::Grayscale);

    Ok(ImageClassifierDataset::new(config)?)
}

/// Train a network on the images of `training_folder`, validated on `validation_folder`.
///
/// The network gets one output per label of the training folder, whatever the output size of
/// `config`. The configuration, the label list, checkpoints and the final weights are written
/// to `artifact_dir`.
pub fn train<B: AutodiffBackend>(
    artifact_dir: &str,
    mut config: TrainingConfig,
    training_folder: &Path,
    validation_folder: &Path,
    device: B::Device,
) -> Result<(), MnistError> {
    let artifact_path = Path::new(artifact_dir);

    log::info!("Training folder: {}", training_folder.display());
    log::info!("Validation folder: {}", validation_folder.display());
    log::info!(
        "Epochs: {}, batch size: {}, workers: {}",
        config.num_epochs,
        config.batch_size,
        config.num_workers
    );
    log::info!("Model folder: {artifact_dir}");

    fs::create_dir_all(artifact_path)?;

    let dataset_train = grayscale_dataset(training_folder)?;
    let dataset_valid = grayscale_dataset(validation_folder)?;

    if dataset_train.labels() != dataset_valid.labels() {
        return Err(MnistError::LabelMismatch {
            training: dataset_train.labels().to_vec(),
            validation: dataset_valid.labels().to_vec(),
        });
    }
    log::info!(
        "{} training images, {} validation images, labels {:?}",
        dataset_train.len(),
        dataset_valid.len(),
        dataset_train.labels()
    );

    let num_classes = dataset_train.registry().len();
    if config.model.output_size != num_classes {
        log::info!(
            "Network output size set to {num_classes} instead of {}",
            config.model.output_size
        );
        config.model.output_size = num_classes;
    }

    config.save(artifact_path.join(CONFIG_FILE))?;
    save_labels(dataset_train.registry(), &artifact_path.join(LABELS_FILE))?;

    B::seed(config.seed);

    let batcher = ImageClassificationBatcher;

    let dataloader_train = DataLoaderBuilder::new(batcher.clone())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(LabeledImages::new(dataset_train));

    let dataloader_valid = DataLoaderBuilder::new(batcher)
        .batch_size(config.batch_size)
        .num_workers(config.num_workers)
        .build(LabeledImages::new(dataset_valid));

    let learner = LearnerBuilder::new(artifact_dir)
        .metric_train_numeric(AccuracyMetric::new())
        .metric_valid_numeric(AccuracyMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(vec![device.clone()])
        .num_epochs(config.num_epochs)
        .summary()
        .build(
            config.model.init::<B>(&device),
            config.optimizer.init(),
            config.learning_rate,
        );

    let now = Instant::now();
    let model_trained = learner.fit(dataloader_train, dataloader_valid);
    let elapsed = now.elapsed().as_secs();
    log::info!("Training completed in {}m{}s", elapsed / 60, elapsed % 60);

    model_trained.save_file(artifact_path.join(MODEL_FILE), &CompactRecorder::new())?;

    Ok(())
}
