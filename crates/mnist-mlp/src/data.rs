use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    prelude::*,
    tensor::ElementConversion,
};
use image_classifier_dataset::{ImageClassifierDataset, LabeledSample, NormalizedTensor};

/// [ImageClassifierDataset] exposed as a burn [Dataset].
///
/// The burn dataset interface has no error channel, and an item missing in the middle of an
/// epoch would silently shrink the training set, so a sample that cannot be loaded aborts the
/// loader with a panic.
pub struct LabeledImages {
    dataset: ImageClassifierDataset,
}

impl LabeledImages {
    pub fn new(dataset: ImageClassifierDataset) -> Self {
        Self { dataset }
    }
}

impl Dataset<LabeledSample> for LabeledImages {
    fn get(&self, index: usize) -> Option<LabeledSample> {
        if index >= self.dataset.len() {
            return None;
        }

        match self.dataset.get(index) {
            Ok(sample) => Some(sample),
            Err(err) => panic!(
                "Sample {index} of `{}` cannot be loaded: {err}",
                self.dataset.root().display()
            ),
        }
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

/// Converts a normalized image to a tensor of shape `[width, height, channels]`.
pub fn image_to_tensor<B: Backend>(image: NormalizedTensor, device: &B::Device) -> Tensor<B, 3> {
    let shape = image.shape();
    let data = TensorData::new(image.into_vec(), shape);

    Tensor::<B, 3>::from_data(data.convert::<B::FloatElem>(), device)
}

#[derive(Clone, Default)]
pub struct ImageClassificationBatcher;

#[derive(Clone, Debug)]
pub struct ImageClassificationBatch<B: Backend> {
    /// Images with shape `[batch_size, width, height, channels]`.
    pub images: Tensor<B, 4>,
    /// Class ids with shape `[batch_size]`.
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> Batcher<B, LabeledSample, ImageClassificationBatch<B>>
    for ImageClassificationBatcher
{
    fn batch(&self, items: Vec<LabeledSample>, device: &B::Device) -> ImageClassificationBatch<B> {
        let targets = items
            .iter()
            .map(|item| {
                Tensor::<B, 1, Int>::from_data(
                    TensorData::from([(item.class_id as i64).elem::<B::IntElem>()]),
                    device,
                )
            })
            .collect();

        let images = items
            .into_iter()
            .map(|item| image_to_tensor::<B>(item.image, device))
            .collect();

        let images = Tensor::stack(images, 0);
        let targets = Tensor::cat(targets, 0);

        ImageClassificationBatch { images, targets }
    }
}
