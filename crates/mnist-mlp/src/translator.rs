use std::fmt;
use std::path::Path;

use burn::{prelude::*, tensor::activation::softmax};
use image_classifier_dataset::{normalize, ColorMode, NormalizedTensor};

use crate::{data::image_to_tensor, MnistError};

/// Shape of an MNIST digit, `[width, height, channels]`.
pub const MNIST_SHAPE: [usize; 3] = [28, 28, 1];

/// Number of classifications shown when displayed.
const DISPLAY_TOP_K: usize = 5;

/// Converts image files to network inputs and logits to labeled probabilities.
#[derive(Debug, Clone)]
pub struct ClassificationTranslator {
    labels: Vec<String>,
    input_shape: [usize; 3],
}

impl ClassificationTranslator {
    /// Create a translator for grayscale 28x28 images with the given labels.
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            input_shape: MNIST_SHAPE,
        }
    }

    /// Translator with the labels `"0"` to `"9"`.
    pub fn digits() -> Self {
        Self::new((0..10).map(|digit| digit.to_string()).collect())
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Decode an image file in grayscale and check it has the expected shape.
    pub fn load_image(&self, path: &Path) -> Result<NormalizedTensor, MnistError> {
        let color_mode = match self.input_shape[2] {
            1 => ColorMode::Grayscale,
            _ => ColorMode::Color,
        };
        let image = normalize(path, color_mode)?;

        if image.shape() != self.input_shape {
            return Err(MnistError::UnexpectedShape {
                path: path.to_path_buf(),
                expected: self.input_shape,
                found: image.shape(),
            });
        }

        Ok(image)
    }

    /// Batch of one image, shape `[1, width, height, channels]`.
    pub fn process_input<B: Backend>(
        &self,
        image: NormalizedTensor,
        device: &B::Device,
    ) -> Tensor<B, 4> {
        image_to_tensor::<B>(image, device).unsqueeze::<4>()
    }

    /// Ranks the labels of the first item of a batch of logits.
    pub fn process_output<B: Backend>(&self, logits: Tensor<B, 2>) -> Classifications {
        let [_, num_classes] = logits.dims();
        let probabilities = softmax(logits.slice([0..1, 0..num_classes]), 1)
            .into_data()
            .iter::<f32>()
            .collect::<Vec<_>>();

        let items = probabilities
            .into_iter()
            .enumerate()
            .map(|(class_id, probability)| Classification {
                label: self
                    .labels
                    .get(class_id)
                    .cloned()
                    .unwrap_or_else(|| class_id.to_string()),
                probability,
            })
            .collect();

        Classifications::new(items)
    }
}

/// Probability of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub probability: f32,
}

/// Labels ranked by descending probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Classifications {
    items: Vec<Classification>,
}

impl Classifications {
    pub fn new(mut items: Vec<Classification>) -> Self {
        items.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        Self { items }
    }

    /// Most probable label.
    pub fn best(&self) -> Option<&Classification> {
        self.items.first()
    }

    /// The `k` most probable labels.
    pub fn top_k(&self, k: usize) -> &[Classification] {
        &self.items[..k.min(self.items.len())]
    }

    pub fn items(&self) -> &[Classification] {
        &self.items
    }
}

impl fmt::Display for Classifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for item in self.top_k(DISPLAY_TOP_K) {
            writeln!(
                f,
                "\tclass: \"{}\", probability: {:.5}",
                item.label, item.probability
            )?;
        }
        write!(f, "]")
    }
}

/// Renders the first channel of an image as text, one line per row.
pub fn ascii_preview(image: &NormalizedTensor) -> String {
    let mut preview = String::with_capacity((image.width() + 1) * image.height());

    for y in 0..image.height() {
        for x in 0..image.width() {
            let value = image.value(x, y, 0);
            preview.push(if value < 0.33 {
                ' '
            } else if value < 0.66 {
                'x'
            } else {
                'X'
            });
        }
        preview.push('\n');
    }

    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{GrayImage, Luma, RgbImage};
    use rstest::rstest;
    use tempfile::tempdir;

    type TestBackend = NdArray;

    #[test]
    fn probabilities_sum_to_one_and_are_sorted() {
        let device = Default::default();
        let translator = ClassificationTranslator::new(vec!["a".into(), "b".into(), "c".into()]);
        let logits = Tensor::<TestBackend, 2>::from_floats([[1.0, 3.0, 2.0]], &device);

        let classifications = translator.process_output(logits);

        let labels = classifications
            .items()
            .iter()
            .map(|item| item.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["b", "c", "a"]);
        let sum = classifications
            .items()
            .iter()
            .map(|item| item.probability)
            .sum::<f32>();
        assert!((sum - 1.0).abs() < 1e-5);
        assert_eq!(classifications.best().unwrap().label, "b");
        assert_eq!(classifications.top_k(2).len(), 2);
        assert_eq!(classifications.top_k(10).len(), 3);
    }

    #[test]
    fn display_lists_top_five() {
        let translator = ClassificationTranslator::digits();
        let device = Default::default();
        let logits = Tensor::<TestBackend, 2>::zeros([1, 10], &device);

        let display = translator.process_output(logits).to_string();

        assert_eq!(display.lines().count(), 7);
        assert!(display.contains("probability: 0.10000"));
    }

    #[test]
    fn input_is_a_batch_of_one() {
        let device = Default::default();
        let translator = ClassificationTranslator::digits();
        let image = NormalizedTensor::new(vec![0.5; 28 * 28], MNIST_SHAPE);

        let input = translator.process_input::<TestBackend>(image, &device);

        assert_eq!(input.dims(), [1, 28, 28, 1]);
    }

    #[test]
    fn load_image_checks_shape() {
        let dir = tempdir().unwrap();
        let digit = dir.path().join("digit.png");
        let small = dir.path().join("small.png");
        GrayImage::from_pixel(28, 28, Luma([255])).save(&digit).unwrap();
        RgbImage::new(14, 28).save(&small).unwrap();
        let translator = ClassificationTranslator::digits();

        let image = translator.load_image(&digit).unwrap();

        assert_eq!(image.shape(), MNIST_SHAPE);
        match translator.load_image(&small) {
            Err(MnistError::UnexpectedShape { expected, found, .. }) => {
                assert_eq!(expected, MNIST_SHAPE);
                assert_eq!(found, [14, 28, 1]);
            }
            other => panic!("Expected unexpected shape error, got {other:?}"),
        }
    }

    #[rstest]
    #[case(0.0, ' ')]
    #[case(0.32, ' ')]
    #[case(0.33, 'x')]
    #[case(0.65, 'x')]
    #[case(0.66, 'X')]
    #[case(1.0, 'X')]
    fn preview_thresholds(#[case] value: f32, #[case] expected: char) {
        let image = NormalizedTensor::new(vec![value], [1, 1, 1]);

        assert_eq!(ascii_preview(&image), format!("{expected}\n"));
    }

    #[test]
    fn preview_is_row_by_row() {
        // Column 0 is white, column 1 is black.
        let image = NormalizedTensor::new(vec![1.0, 1.0, 0.0, 0.0], [2, 2, 1]);

        assert_eq!(ascii_preview(&image), "X \nX \n");
    }
}
