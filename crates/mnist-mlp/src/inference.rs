use std::path::{Path, PathBuf};

use burn::{prelude::*, record::CompactRecorder};
use image_classifier_dataset::NormalizedTensor;

use crate::{
    model::FullyConnectedNetwork,
    training::{load_labels, TrainingConfig, CONFIG_FILE, LABELS_FILE, MODEL_FILE},
    translator::{ClassificationTranslator, Classifications},
    MnistError,
};

/// A trained network with the translator of its model folder.
pub struct Classifier<B: Backend> {
    model: FullyConnectedNetwork<B>,
    translator: ClassificationTranslator,
    device: B::Device,
}

impl<B: Backend> Classifier<B> {
    /// Load the network, its weights and its labels from a model folder written by
    /// [train](crate::training::train).
    ///
    /// Without a label file, the labels are the digits `"0"` to `"9"`.
    pub fn load(artifact_dir: &str, device: B::Device) -> Result<Self, MnistError> {
        let artifact_path = Path::new(artifact_dir);
        let config = TrainingConfig::load(artifact_path.join(CONFIG_FILE))?;

        let labels_path = artifact_path.join(LABELS_FILE);
        let translator = if labels_path.is_file() {
            ClassificationTranslator::new(load_labels(&labels_path)?.labels().to_vec())
        } else {
            log::warn!("No label file in `{artifact_dir}`, using the digits as labels");
            ClassificationTranslator::digits()
        };

        let num_labels = translator.labels().len();
        if num_labels != config.model.output_size {
            return Err(MnistError::LabelCountMismatch {
                labels: num_labels,
                outputs: config.model.output_size,
            });
        }

        let model = config.model.init::<B>(&device).load_file(
            artifact_path.join(MODEL_FILE),
            &CompactRecorder::new(),
            &device,
        )?;

        Ok(Self::new(model, translator, device))
    }

    pub fn new(
        model: FullyConnectedNetwork<B>,
        translator: ClassificationTranslator,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            translator,
            device,
        }
    }

    /// Classify the image file at `path`.
    pub fn classify(&self, path: &Path) -> Result<Classifications, MnistError> {
        let image = self.translator.load_image(path)?;

        Ok(self.classify_image(image))
    }

    /// Classify an image already loaded by the translator.
    pub fn classify_image(&self, image: NormalizedTensor) -> Classifications {
        let input = self.translator.process_input::<B>(image, &self.device);
        let logits = self.model.forward(input);

        self.translator.process_output(logits)
    }

    pub fn translator(&self) -> &ClassificationTranslator {
        &self.translator
    }
}

/// Expand the inputs into image files.
///
/// Files are kept as given, folders are walked recursively and their files listed in sorted
/// order. Other inputs are skipped with a warning.
pub fn list_image_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, MnistError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found = globwalk::GlobWalkerBuilder::from_patterns(input, &["**/*"])
                .follow_links(true)
                .file_type(globwalk::FileType::FILE)
                .build()?
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry.into_path()),
                    Err(err) => {
                        log::warn!("Skipping an entry of `{}`: {err}", input.display());
                        None
                    }
                })
                .collect::<Vec<_>>();
            found.sort();
            files.extend(found);
        } else {
            log::warn!("Skipping `{}`, it is neither a file nor a folder", input.display());
        }
    }

    Ok(files)
}
