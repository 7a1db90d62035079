//! PDQ hash implementation.
//!
//! Box-filtered luminance, 2-D DCT, and the 16x16 lowest frequencies
//! thresholded against their median: 256 bits.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{box_filter, dct2d, median_of, Interpolation, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

const BLOCK: usize = 16;
const HASH_BYTES: usize = BLOCK * BLOCK / 8;
const BOX_HALF_WINDOW: usize = 2;
const BOX_REPS: usize = 2;

/// Configuration for [`PdqHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdqConfig {
    pub resize: ResizeOptions,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for PdqConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(64, 64, Interpolation::Bilinear),
            distance: None,
        }
    }
}

impl PdqConfig {
    resize_setters!();
    distance_setter!();

    pub fn build(self) -> Result<PdqHasher, ConfigError> {
        self.resize.validate()?;
        if (self.resize.width as usize) < BLOCK || (self.resize.height as usize) < BLOCK {
            return Err(ConfigError::InvalidSize {
                width: self.resize.width,
                height: self.resize.height,
            });
        }
        Ok(PdqHasher::from_config(self))
    }
}

/// PDQ hash implementation
#[derive(Debug, Clone)]
pub struct PdqHasher {
    config: PdqConfig,
    metric: Metric,
}

impl PdqHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PdqConfig {
        PdqConfig::default()
    }

    fn from_config(config: PdqConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self { config, metric }
    }
}

impl Default for PdqHasher {
    fn default() -> Self {
        Self::from_config(PdqConfig::default())
    }
}

impl HashAlgorithm for PdqHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let mut luma = Matrix::<f32>::from_gray(&gray);
        box_filter(&mut luma, BOX_HALF_WINDOW, BOX_REPS);

        let block = dct2d(&luma).crop(0, 0, BLOCK, BLOCK);
        let median = median_of(block.as_slice());
        let hash = threshold_bits(block.as_slice().iter().map(|&v| v > median))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Pdq
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, HASH_BYTES)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
