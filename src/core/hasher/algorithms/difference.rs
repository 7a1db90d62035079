//! Difference Hash (dHash) implementation.
//!
//! dHash works by:
//! 1. Resizing the image to (width+1) x height
//! 2. Converting to grayscale
//! 3. Comparing each pixel to the one on its left
//! 4. If the pixel is brighter than its left neighbour, set bit to 1, else 0
//!
//! This captures the relative gradient of brightness changes.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::Interpolation;
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Configuration for [`DifferenceHasher`]; `resize` holds the hash grid,
/// the image is resized one column wider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferenceConfig {
    pub resize: ResizeOptions,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for DifferenceConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(8, 8, Interpolation::Bilinear),
            distance: None,
        }
    }
}

impl DifferenceConfig {
    resize_setters!();
    distance_setter!();

    pub fn build(self) -> Result<DifferenceHasher, ConfigError> {
        self.resize.validate()?;
        Ok(DifferenceHasher::from_config(self))
    }
}

/// Difference Hash (dHash) implementation
#[derive(Debug, Clone)]
pub struct DifferenceHasher {
    config: DifferenceConfig,
    metric: Metric,
}

impl DifferenceHasher {
    /// Create a dHash hasher producing 64 bits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DifferenceConfig {
        DifferenceConfig::default()
    }

    fn from_config(config: DifferenceConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self { config, metric }
    }
}

impl Default for DifferenceHasher {
    fn default() -> Self {
        Self::from_config(DifferenceConfig::default())
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let grid = self.config.resize;
        // one extra column to compute differences
        let wide = ResizeOptions::new(grid.width + 1, grid.height, grid.interpolation);
        let gray = wide.apply_gray(image)?;

        let (width, height) = (grid.width as usize, grid.height as usize);
        let stride = width + 1;
        let pixels = gray.as_raw();
        let bits = (0..width * height).map(|i| {
            let (y, x) = (i / width, i % width);
            pixels[y * stride + x + 1] > pixels[y * stride + x]
        });
        Ok(HashValue::Binary(threshold_bits(bits)?))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Difference
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, self.config.resize.pixel_count().div_ceil(8))
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
