//! Average Hash (aHash) implementation.
//!
//! aHash works by:
//! 1. Resizing the image to width x height
//! 2. Converting to grayscale
//! 3. Computing the average brightness
//! 4. For each pixel: if brighter than average, set bit to 1, else 0

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{mean, Interpolation};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Configuration for [`AverageHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageConfig {
    pub resize: ResizeOptions,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for AverageConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(8, 8, Interpolation::Bilinear),
            distance: None,
        }
    }
}

impl AverageConfig {
    resize_setters!();
    distance_setter!();

    /// Validate and build the hasher
    pub fn build(self) -> Result<AverageHasher, ConfigError> {
        self.resize.validate()?;
        Ok(AverageHasher::from_config(self))
    }
}

/// Average Hash (aHash) implementation
#[derive(Debug, Clone)]
pub struct AverageHasher {
    config: AverageConfig,
    metric: Metric,
}

impl AverageHasher {
    /// Create a hasher with the default 8x8 configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AverageConfig {
        AverageConfig::default()
    }

    fn from_config(config: AverageConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self { config, metric }
    }

    pub fn config(&self) -> &AverageConfig {
        &self.config
    }
}

impl Default for AverageHasher {
    fn default() -> Self {
        Self::from_config(AverageConfig::default())
    }
}

impl HashAlgorithm for AverageHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let average = mean(&gray);
        let hash = threshold_bits(gray.as_raw().iter().map(|&p| p as f64 > average))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Average
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, self.config.resize.pixel_count().div_ceil(8))
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};

    fn create_solid_image(r: u8, g: u8, b: u8) -> DynamicImage {
        let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([r, g, b]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_produce_identical_hash() {
        let hasher = AverageHasher::new();
        let image = create_solid_image(128, 128, 128);

        let hash1 = hasher.calculate(&image).unwrap();
        let hash2 = hasher.calculate(&image).unwrap();

        assert_eq!(hasher.compare(&hash1, &hash2).unwrap(), 0.0);
    }

    #[test]
    fn solid_image_produces_empty_hash() {
        let hash = AverageHasher::new()
            .calculate(&create_solid_image(128, 128, 128))
            .unwrap();
        let bytes = hash.as_binary().unwrap().as_bytes();
        assert_eq!(bytes.len(), 8);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn bright_half_sets_its_bits() {
        let img = ImageBuffer::from_fn(64, 64, |_, y| Luma([if y < 32 { 250u8 } else { 10 }]));
        let hash = AverageHasher::new()
            .calculate(&DynamicImage::ImageLuma8(img))
            .unwrap();
        assert_eq!(hash.as_binary().unwrap().as_bytes(), &[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0]);
    }

    #[test]
    fn odd_sizes_round_up_to_whole_bytes() {
        let hasher = AverageHasher::builder().size(3, 3).build().unwrap();
        let hash = hasher.calculate(&create_solid_image(1, 2, 3)).unwrap();
        assert_eq!(hasher.shape(), (HashVariant::Binary, 2));
        assert_eq!(hash.as_binary().unwrap().as_bytes().len(), 2);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(
            AverageHasher::builder().size(0, 8).build().unwrap_err(),
            ConfigError::InvalidSize { width: 0, height: 8 }
        );
    }

    #[test]
    fn empty_image_is_nil() {
        let empty = DynamicImage::ImageRgb8(ImageBuffer::new(0, 0));
        assert!(matches!(
            AverageHasher::new().calculate(&empty),
            Err(HashError::ImageIsNil)
        ));
    }

    #[test]
    fn kind_returns_average() {
        let hasher = AverageHasher::new();
        assert_eq!(hasher.kind(), HashAlgorithmKind::Average);
    }
}
