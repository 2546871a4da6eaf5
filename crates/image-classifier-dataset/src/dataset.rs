use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::index::{label_of_path, LabeledFile, LabeledFileIndex};
use crate::{ColorMode, DatasetError, ImageDecoder, ImageNormalizer, LabelRegistry, NormalizedTensor};

/// Configuration of an [ImageClassifierDataset].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageClassifierDatasetConfig {
    /// Folder containing one subfolder per label.
    pub root: PathBuf,
    /// Whether images are loaded in color or grayscale.
    #[serde(default)]
    pub color_mode: ColorMode,
}

impl ImageClassifierDatasetConfig {
    /// Create a config for the given root folder, loading images in color.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            color_mode: ColorMode::default(),
        }
    }

    /// Set the color mode.
    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.color_mode = color_mode;
        self
    }
}

/// Image with the class id of its label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    /// Normalized image, shape `[width, height, channels]`.
    pub image: NormalizedTensor,
    /// Class id of the image label.
    pub class_id: usize,
}

/// Image classification dataset backed by a folder tree.
///
/// ```text
/// root/
///   label_a/
///     image_1.png
///     image_2.png
///   label_b/
///     image_3.png
/// ```
///
/// Every immediate, non-hidden subfolder of the root is a label and every file inside it an
/// image of that label. The folder tree is listed once at construction, images are decoded on
/// each [get](ImageClassifierDataset::get). The dataset is immutable, so it can be shared
/// between loader threads.
#[derive(Debug)]
pub struct ImageClassifierDataset<D = ImageNormalizer> {
    root: PathBuf,
    color_mode: ColorMode,
    registry: LabelRegistry,
    files: Vec<LabeledFile>,
    decoder: D,
}

impl ImageClassifierDataset {
    /// Create a dataset from the config, decoding images with the `image` crate.
    pub fn new(config: ImageClassifierDatasetConfig) -> Result<Self, DatasetError> {
        Self::with_decoder(config, ImageNormalizer)
    }
}

impl<D: ImageDecoder> ImageClassifierDataset<D> {
    /// Create a dataset from the config, decoding images with the given decoder.
    pub fn with_decoder(
        config: ImageClassifierDatasetConfig,
        decoder: D,
    ) -> Result<Self, DatasetError> {
        let (labels, files) = LabeledFileIndex::scan(&config.root)?.into_parts();

        Ok(Self {
            root: config.root,
            color_mode: config.color_mode,
            registry: LabelRegistry::try_new(labels)?,
            files,
            decoder,
        })
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Checks if the dataset has no image.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Decode the image at `index` and pair it with its class id.
    pub fn get(&self, index: usize) -> Result<LabeledSample, DatasetError> {
        let file = self.sample(index)?;
        let label = label_of_path(&file.path)
            .ok_or_else(|| DatasetError::UnknownLabel(file.path.display().to_string()))?;
        let class_id = self.registry.id_of(&label)?;
        let image = self.decoder.decode(&file.path, self.color_mode)?;

        Ok(LabeledSample { image, class_id })
    }

    /// File and label at `index`, without decoding the image.
    pub fn sample(&self, index: usize) -> Result<&LabeledFile, DatasetError> {
        self.files.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: self.files.len(),
        })
    }

    /// Decode every image in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = Result<LabeledSample, DatasetError>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }

    /// Label registry of the dataset.
    pub fn registry(&self) -> &LabelRegistry {
        &self.registry
    }

    /// All labels, indexed by class id.
    pub fn labels(&self) -> &[String] {
        self.registry.labels()
    }

    /// Class id of a label.
    pub fn class_id(&self, label: &str) -> Result<usize, DatasetError> {
        self.registry.id_of(label)
    }

    /// Label of a class id.
    pub fn label(&self, class_id: usize) -> Result<&str, DatasetError> {
        self.registry.label_of(class_id)
    }

    /// Root folder the dataset was listed from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Color mode images are decoded with.
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::{tempdir, TempDir};

    /// Decoder returning a 1x1 image whose value is the length of the file name.
    fn fake_decoder(path: &Path, mode: ColorMode) -> Result<NormalizedTensor, DatasetError> {
        let len = path.file_name().unwrap().len() as f32;
        Ok(NormalizedTensor::new(
            vec![len; mode.channels()],
            [1, 1, mode.channels()],
        ))
    }

    fn tree(files: &[&str]) -> TempDir {
        let dir = tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"").unwrap();
        }
        dir
    }

    #[test]
    fn class_ids_follow_parent_folder() {
        let dir = tree(&["b/x.png", "a/xx.png", "a/xxx.png"]);
        let config = ImageClassifierDatasetConfig::new(dir.path());

        let dataset = ImageClassifierDataset::with_decoder(config, fake_decoder).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.labels(), ["a", "b"]);
        for index in 0..dataset.len() {
            let sample = dataset.get(index).unwrap();
            let label = &dataset.sample(index).unwrap().label;
            assert_eq!(sample.class_id, dataset.class_id(label).unwrap());
        }
        assert_eq!(dataset.get(0).unwrap().image.as_slice(), [6.0, 6.0, 6.0]);
        assert_eq!(dataset.get(2).unwrap().class_id, 1);
    }

    #[test]
    fn out_of_range_index() {
        let dir = tree(&["a/x.png"]);
        let config = ImageClassifierDatasetConfig::new(dir.path());
        let dataset = ImageClassifierDataset::with_decoder(config, fake_decoder).unwrap();

        match dataset.get(dataset.len()) {
            Err(DatasetError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 1);
                assert_eq!(len, 1);
            }
            other => panic!("Expected out of range error, got {other:?}"),
        }
        assert!(dataset.get(usize::MAX).is_err());
    }

    #[test]
    fn decoder_receives_color_mode() {
        let dir = tree(&["a/x.png"]);
        let config =
            ImageClassifierDatasetConfig::new(dir.path()).with_color_mode(ColorMode::Grayscale);
        let dataset = ImageClassifierDataset::with_decoder(config, fake_decoder).unwrap();

        assert_eq!(dataset.color_mode(), ColorMode::Grayscale);
        assert_eq!(dataset.get(0).unwrap().image.shape(), [1, 1, 1]);
    }

    #[test]
    fn images_are_decoded_on_every_access() {
        let dir = tree(&["a/x.png"]);
        let calls = AtomicUsize::new(0);
        let decoder = |path: &Path, mode: ColorMode| {
            calls.fetch_add(1, Ordering::SeqCst);
            fake_decoder(path, mode)
        };
        let config = ImageClassifierDatasetConfig::new(dir.path());
        let dataset = ImageClassifierDataset::with_decoder(config, decoder).unwrap();

        dataset.get(0).unwrap();
        dataset.get(0).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn decoder_errors_are_propagated() {
        let dir = tree(&["a/x.png"]);
        let decoder = |path: &Path, _mode: ColorMode| -> Result<NormalizedTensor, DatasetError> {
            Err(DatasetError::UnreadableImage {
                path: path.to_path_buf(),
                source: image::ImageError::IoError(std::io::ErrorKind::InvalidData.into()),
            })
        };
        let config = ImageClassifierDatasetConfig::new(dir.path());
        let dataset = ImageClassifierDataset::with_decoder(config, decoder).unwrap();

        assert!(matches!(
            dataset.get(0),
            Err(DatasetError::UnreadableImage { .. })
        ));
    }

    #[test]
    fn config_defaults_to_color() {
        let config: ImageClassifierDatasetConfig =
            serde_json::from_str(r#"{ "root": "mnist/train" }"#).unwrap();

        assert_eq!(config.root, PathBuf::from("mnist/train"));
        assert_eq!(config.color_mode, ColorMode::Color);
    }
}
