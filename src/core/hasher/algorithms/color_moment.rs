//! Color Moment Hash implementation.
//!
//! Hu invariants of each channel in HSV and YCrCb space: 7 values per
//! channel, 42 values in total.

use super::super::options::{distance_setter, resize_setters, validate_kernel, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{Float64Hash, HashValue, HashVariant};
use crate::core::imgproc::{gaussian_blur, hsv, hu_moments, image_moments, ycrcb, Interpolation};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

const HASH_LEN: usize = 42;

/// Hu invariants of a three-channel image with channel records 0 and 2 swapped.
fn channel_invariants(img: &RgbImage) -> Vec<f64> {
    let mut moments = image_moments(img);
    moments.swap(0, 2);
    hu_moments(&moments)
}

/// Configuration for [`ColorMomentHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorMomentConfig {
    pub resize: ResizeOptions,
    pub kernel_size: u32,
    pub sigma: f64,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for ColorMomentConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(512, 512, Interpolation::Bicubic),
            kernel_size: 3,
            sigma: 0.0,
            distance: None,
        }
    }
}

impl ColorMomentConfig {
    resize_setters!();
    distance_setter!();

    /// Set the Gaussian blur applied after resizing
    pub fn gaussian(mut self, kernel_size: u32, sigma: f64) -> Self {
        self.kernel_size = kernel_size;
        self.sigma = sigma;
        self
    }

    pub fn build(self) -> Result<ColorMomentHasher, ConfigError> {
        self.resize.validate()?;
        validate_kernel(self.kernel_size, self.sigma)?;
        Ok(ColorMomentHasher::from_config(self))
    }
}

/// Color Moment Hash implementation
#[derive(Debug, Clone)]
pub struct ColorMomentHasher {
    config: ColorMomentConfig,
    metric: Metric,
}

impl ColorMomentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ColorMomentConfig {
        ColorMomentConfig::default()
    }

    fn from_config(config: ColorMomentConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::L2);
        Self { config, metric }
    }
}

impl Default for ColorMomentHasher {
    fn default() -> Self {
        Self::from_config(ColorMomentConfig::default())
    }
}

impl HashAlgorithm for ColorMomentHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let resized = self.config.resize.apply(image)?.to_rgba8();
        let blurred = gaussian_blur(&resized, self.config.kernel_size, self.config.sigma)?;

        let mut values = channel_invariants(&hsv(&blurred)?);
        values.extend(channel_invariants(&ycrcb(&blurred)?));
        Ok(HashValue::Float64(Float64Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::ColorMoment
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Float64, HASH_LEN)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn colourful(size: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
            Rgb([(x * 255 / size) as u8, (y * 255 / size) as u8, ((x + y) * 127 / size) as u8])
        }))
    }

    #[test]
    fn produces_42_finite_values() {
        let hasher = ColorMomentHasher::builder().size(64, 64).build().unwrap();
        let hash = hasher.calculate(&colourful(80)).unwrap();
        let values = hash.as_float64().unwrap().as_slice();
        assert_eq!(values.len(), HASH_LEN);
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(values.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn similar_images_are_closer_than_different_ones() {
        let hasher = ColorMomentHasher::builder().size(64, 64).build().unwrap();
        let a = hasher.calculate(&colourful(80)).unwrap();
        let b = hasher.calculate(&colourful(96)).unwrap();
        let other = hasher
            .calculate(&DynamicImage::ImageRgb8(RgbImage::from_fn(80, 80, |x, _| {
                Rgb([0, if x < 40 { 255 } else { 0 }, 200])
            })))
            .unwrap();
        assert!(hasher.compare(&a, &b).unwrap() < hasher.compare(&a, &other).unwrap());
    }

    #[test]
    fn even_kernel_is_rejected() {
        assert_eq!(
            ColorMomentHasher::builder().gaussian(2, 0.0).build().unwrap_err(),
            ConfigError::InvalidKernelSize(2)
        );
    }
}
