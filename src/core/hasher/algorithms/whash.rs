//! Wavelet Hash (wHash) implementation.
//!
//! The image is resized to `2^level` times the hash grid, decomposed with a
//! Haar wavelet, and the LL band is thresholded against its median.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{haar2d, median_of, Interpolation, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Configuration for [`WHashHasher`]; `resize` holds the hash grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WHashConfig {
    pub resize: ResizeOptions,
    pub level: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for WHashConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(8, 8, Interpolation::Bilinear),
            level: 3,
            distance: None,
        }
    }
}

impl WHashConfig {
    resize_setters!();
    distance_setter!();

    /// Set the number of wavelet decomposition levels
    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn build(self) -> Result<WHashHasher, ConfigError> {
        self.resize.validate()?;
        if self.level == 0 {
            return Err(ConfigError::InvalidLevel(self.level));
        }
        if self.working_size().is_none() {
            return Err(ConfigError::InvalidLevel(self.level));
        }
        Ok(WHashHasher::from_config(self))
    }

    /// Size of the image fed to the wavelet transform.
    fn working_size(&self) -> Option<(u32, u32)> {
        let factor = 1u32.checked_shl(self.level)?;
        Some((
            self.resize.width.checked_mul(factor)?,
            self.resize.height.checked_mul(factor)?,
        ))
    }
}

/// Wavelet Hash (wHash) implementation
#[derive(Debug, Clone)]
pub struct WHashHasher {
    config: WHashConfig,
    working: ResizeOptions,
    metric: Metric,
}

impl WHashHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> WHashConfig {
        WHashConfig::default()
    }

    /// Expects a validated configuration.
    fn from_config(config: WHashConfig) -> Self {
        let (width, height) = config
            .working_size()
            .unwrap_or((config.resize.width, config.resize.height));
        let working = ResizeOptions::new(width, height, config.resize.interpolation);
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self {
            config,
            working,
            metric,
        }
    }
}

impl Default for WHashHasher {
    fn default() -> Self {
        Self::from_config(WHashConfig::default())
    }
}

impl HashAlgorithm for WHashHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.working.apply_gray(image)?;
        let mut coefficients = Matrix::<f32>::from_gray(&gray);
        haar2d(&mut coefficients, self.config.level);

        let ll = coefficients.crop(
            0,
            0,
            self.config.resize.height as usize,
            self.config.resize.width as usize,
        );
        let median = median_of(ll.as_slice());
        let hash = threshold_bits(ll.as_slice().iter().map(|&v| v > median))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::WHash
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
    use image::{GrayImage, Luma};

    #[test]
    fn left_half_bright_sets_left_columns() {
        let img = GrayImage::from_fn(64, 64, |x, _| Luma([if x < 32 { 220 } else { 30 }]));
        let hash = WHashHasher::new()
            .calculate(&DynamicImage::ImageLuma8(img))
            .unwrap();
        // columns 0..4 of each row: low nibble of every byte
        assert_eq!(hash.as_binary().unwrap().as_bytes(), &[0x0F; 8]);
    }

    #[test]
    fn level_is_validated() {
        assert_eq!(
            WHashHasher::builder().level(0).build().unwrap_err(),
            ConfigError::InvalidLevel(0)
        );
        assert_eq!(
            WHashHasher::builder().level(40).build().unwrap_err(),
            ConfigError::InvalidLevel(40)
        );
    }

    #[test]
    fn custom_grid_changes_length() {
        let hasher = WHashHasher::builder().size(16, 16).level(2).build().unwrap();
        assert_eq!(hasher.shape(), (HashVariant::Binary, 32));
    }
}
