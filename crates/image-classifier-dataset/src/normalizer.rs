use std::path::Path;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Largest intensity of an 8-bit channel.
const MAX_INTENSITY: f32 = 255.0;

/// How images are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// One luminance channel.
    Grayscale,
    /// Three channels: red, green and blue.
    #[default]
    Color,
}

impl ColorMode {
    /// Number of channels produced for this mode.
    pub fn channels(&self) -> usize {
        match self {
            ColorMode::Grayscale => 1,
            ColorMode::Color => 3,
        }
    }
}

/// A decoded image as 32-bit floats in `[0, 1]` with shape `[width, height, channels]`.
///
/// The element `(x, y, c)` is stored at offset `(x * height + y) * channels + c`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f32>,
    shape: [usize; 3],
}

impl NormalizedTensor {
    /// Create a tensor from raw values.
    ///
    /// # Panics
    ///
    /// Panics if the number of values does not match the shape.
    pub fn new(data: Vec<f32>, shape: [usize; 3]) -> Self {
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "Tensor data should match shape {shape:?}"
        );
        Self { data, shape }
    }

    /// Shape as `[width, height, channels]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.shape[0]
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.shape[1]
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.shape[2]
    }

    /// Value of channel `c` of the pixel at column `x` and row `y`.
    pub fn value(&self, x: usize, y: usize, c: usize) -> f32 {
        let [_, height, channels] = self.shape;
        self.data[(x * height + y) * channels + c]
    }

    /// Values in storage order.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consume the tensor, returning its values in storage order.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

/// Decoding strategy used by the dataset to turn an image file into a tensor.
///
/// Any `Fn(&Path, ColorMode) -> Result<NormalizedTensor, DatasetError>` closure is a decoder.
pub trait ImageDecoder: Send + Sync {
    /// Decode the file at `path` using the given color mode.
    fn decode(&self, path: &Path, color_mode: ColorMode) -> Result<NormalizedTensor, DatasetError>;
}

impl<F> ImageDecoder for F
where
    F: Fn(&Path, ColorMode) -> Result<NormalizedTensor, DatasetError> + Send + Sync,
{
    fn decode(&self, path: &Path, color_mode: ColorMode) -> Result<NormalizedTensor, DatasetError> {
        self(path, color_mode)
    }
}

/// Default decoder: reads the file with the `image` crate and rescales intensities to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageNormalizer;

impl ImageDecoder for ImageNormalizer {
    fn decode(&self, path: &Path, color_mode: ColorMode) -> Result<NormalizedTensor, DatasetError> {
        normalize(path, color_mode)
    }
}

/// Decode the image file at `path` and rescale it to `[0, 1]`.
///
/// The file handle is released before returning, whether decoding succeeded or not.
pub fn normalize(path: &Path, color_mode: ColorMode) -> Result<NormalizedTensor, DatasetError> {
    let image = image::open(path).map_err(|source| DatasetError::UnreadableImage {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(normalize_image(&image, color_mode))
}

/// Convert an already decoded image to a `[width, height, channels]` tensor in `[0, 1]`.
pub fn normalize_image(image: &DynamicImage, color_mode: ColorMode) -> NormalizedTensor {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let channels = color_mode.channels();

    // Decoded buffers are row major ([height, width, channels]).
    let raw = match color_mode {
        ColorMode::Grayscale => image.to_luma8().into_raw(),
        ColorMode::Color => image.to_rgb8().into_raw(),
    };

    let mut data = vec![0.0; raw.len()];
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let intensity = raw[(y * width + x) * channels + c];
                data[(x * height + y) * channels + c] = intensity as f32 / MAX_INTENSITY;
            }
        }
    }

    NormalizedTensor::new(data, [width, height, channels])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use rstest::rstest;

    #[rstest]
    #[case(ColorMode::Grayscale, 1)]
    #[case(ColorMode::Color, 3)]
    fn channels_per_mode(#[case] mode: ColorMode, #[case] channels: usize) {
        assert_eq!(mode.channels(), channels);
    }

    #[test]
    fn black_image_is_all_zeros() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([0])));

        let tensor = normalize_image(&image, ColorMode::Grayscale);

        assert_eq!(tensor.shape(), [4, 3, 1]);
        assert!(tensor.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn white_image_is_all_ones() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 5, Rgb([255, 255, 255])));

        let tensor = normalize_image(&image, ColorMode::Color);

        assert_eq!(tensor.shape(), [2, 5, 3]);
        assert!(tensor.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn layout_is_width_height_channels() {
        let mut image = RgbImage::new(3, 2);
        image.put_pixel(2, 0, Rgb([255, 0, 51]));
        image.put_pixel(0, 1, Rgb([0, 102, 0]));
        let image = DynamicImage::ImageRgb8(image);

        let tensor = normalize_image(&image, ColorMode::Color);

        assert_eq!(tensor.width(), 3);
        assert_eq!(tensor.height(), 2);
        assert_eq!(tensor.channels(), 3);
        assert_eq!(tensor.value(2, 0, 0), 1.0);
        assert_eq!(tensor.value(2, 0, 1), 0.0);
        assert_eq!(tensor.value(2, 0, 2), 0.2);
        assert_eq!(tensor.value(0, 1, 1), 0.4);
        assert_eq!(tensor.value(1, 1, 0), 0.0);
    }

    #[test]
    fn color_image_in_grayscale_mode_has_one_channel() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([255, 255, 255])));

        let tensor = normalize_image(&image, ColorMode::Grayscale);

        assert_eq!(tensor.shape(), [2, 2, 1]);
        assert!(tensor.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let path = Path::new("does/not/exist.png");

        match normalize(path, ColorMode::Grayscale) {
            Err(DatasetError::UnreadableImage { path: failed, .. }) => assert_eq!(failed, path),
            other => panic!("Expected unreadable image error, got {other:?}"),
        }
    }

    #[test]
    #[should_panic]
    fn tensor_shape_mismatch() {
        let _ = NormalizedTensor::new(vec![0.0; 5], [2, 2, 1]);
    }
}
