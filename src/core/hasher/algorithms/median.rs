//! Median Hash (mHash): aHash with the median as threshold.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{median, Interpolation};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Configuration for [`MedianHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianConfig {
    pub resize: ResizeOptions,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for MedianConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(8, 8, Interpolation::Bilinear),
            distance: None,
        }
    }
}

impl MedianConfig {
    resize_setters!();
    distance_setter!();

    pub fn build(self) -> Result<MedianHasher, ConfigError> {
        self.resize.validate()?;
        Ok(MedianHasher::from_config(self))
    }
}

/// Median Hash (mHash) implementation
#[derive(Debug, Clone)]
pub struct MedianHasher {
    config: MedianConfig,
    metric: Metric,
}

impl MedianHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MedianConfig {
        MedianConfig::default()
    }

    fn from_config(config: MedianConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self { config, metric }
    }
}

impl Default for MedianHasher {
    fn default() -> Self {
        Self::from_config(MedianConfig::default())
    }
}

impl HashAlgorithm for MedianHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let threshold = median(&gray);
        let hash = threshold_bits(gray.as_raw().iter().map(|&p| p as f64 > threshold))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Median
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, self.config.resize.pixel_count().div_ceil(8))
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
