//! Perceptual Hash (pHash) implementation.
//!
//! pHash uses the Discrete Cosine Transform (DCT) to extract
//! frequency information from the image. This makes it more
//! robust to:
//! - Scaling
//! - Brightness/contrast changes
//! - Compression artifacts
//!
//! The hash keeps the lowest 8x8 frequencies, drops the DC term and
//! thresholds the rest against their mean.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{dct2d, Interpolation, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Side of the retained low-frequency block.
const BLOCK: usize = 8;
const HASH_BYTES: usize = BLOCK * BLOCK / 8;

/// Configuration for [`PerceptualHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PHashConfig {
    pub resize: ResizeOptions,
    /// Optional per-byte weights; when set, `compare` uses weighted Hamming.
    pub weights: Option<Vec<f64>>,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for PHashConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(32, 32, Interpolation::BilinearExact),
            weights: None,
            distance: None,
        }
    }
}

impl PHashConfig {
    resize_setters!();
    distance_setter!();

    /// Set one weight per hash byte
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn build(self) -> Result<PerceptualHasher, ConfigError> {
        self.resize.validate()?;
        if (self.resize.width as usize) < BLOCK || (self.resize.height as usize) < BLOCK {
            return Err(ConfigError::InvalidSize {
                width: self.resize.width,
                height: self.resize.height,
            });
        }
        if let Some(weights) = &self.weights {
            if weights.len() != HASH_BYTES || weights.iter().any(|w| !w.is_finite()) {
                return Err(ConfigError::InvalidWeights {
                    expected: HASH_BYTES,
                    found: weights.len(),
                });
            }
        }
        Ok(PerceptualHasher::from_config(self))
    }
}

/// Perceptual Hash (pHash) implementation using DCT
#[derive(Debug, Clone)]
pub struct PerceptualHasher {
    config: PHashConfig,
    metric: Metric,
}

impl PerceptualHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PHashConfig {
        PHashConfig::default()
    }

    fn from_config(config: PHashConfig) -> Self {
        let metric = match (&config.distance, &config.weights) {
            (Some(metric), _) => metric.clone(),
            (None, Some(weights)) => Metric::WeightedHamming(weights.clone()),
            (None, None) => Metric::Hamming,
        };
        Self { config, metric }
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::from_config(PHashConfig::default())
    }
}

impl HashAlgorithm for PerceptualHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let coefficients = dct2d(&Matrix::<f32>::from_gray(&gray));

        let mut block = coefficients.crop(0, 0, BLOCK, BLOCK);
        block[(0, 0)] = 0.0;
        let values = block.as_slice();
        let mean = values.iter().sum::<f32>() / values.len() as f32;

        let hash = threshold_bits(values.iter().map(|&v| v > mean))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::PHash
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, HASH_BYTES)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
