//! Bag of Visual Words (BoVW) hash.
//!
//! Local binary descriptors are quantized into a fixed vocabulary of visual
//! words and the resulting word histogram is stored in one of three forms.
//!
//! ## Storage
//! - **Histogram** - L2-normalized word counts, compared with cosine
//! - **MinHash** - min-wise signature of the word set, compared position-wise
//! - **SimHash** - count-weighted bit signature, compared with Jaccard

mod features;
mod signature;

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{Float64Hash, HashValue, HashVariant};
use crate::core::imgproc::Interpolation;
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Local feature detector and descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BoVWFeatureType {
    /// FAST corners with steered BRIEF descriptors
    #[default]
    Orb = 0,
    /// Hessian blobs with patch-mean descriptors
    Akaze = 1,
}

impl BoVWFeatureType {
    pub const ALL: [BoVWFeatureType; 2] = [BoVWFeatureType::Orb, BoVWFeatureType::Akaze];

    pub fn name(self) -> &'static str {
        match self {
            BoVWFeatureType::Orb => "ORB",
            BoVWFeatureType::Akaze => "AKAZE",
        }
    }
}

impl fmt::Display for BoVWFeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoVWFeatureType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoVWFeatureType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidBoVWFeatureType(s.to_string()))
    }
}

impl TryFrom<u8> for BoVWFeatureType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BoVWFeatureType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ConfigError::InvalidBoVWFeatureType(value.to_string()))
    }
}

/// Encoding of the visual-word histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BoVWStorageType {
    #[default]
    Histogram = 0,
    MinHash = 1,
    SimHash = 2,
}

impl BoVWStorageType {
    pub const ALL: [BoVWStorageType; 3] = [
        BoVWStorageType::Histogram,
        BoVWStorageType::MinHash,
        BoVWStorageType::SimHash,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoVWStorageType::Histogram => "Histogram",
            BoVWStorageType::MinHash => "MinHash",
            BoVWStorageType::SimHash => "SimHash",
        }
    }
}

impl fmt::Display for BoVWStorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoVWStorageType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoVWStorageType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidBoVWStorageType(s.to_string()))
    }
}

impl TryFrom<u8> for BoVWStorageType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BoVWStorageType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ConfigError::InvalidBoVWStorageType(value.to_string()))
    }
}

/// Configuration for [`BoVWHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoVWConfig {
    pub resize: ResizeOptions,
    pub feature_type: BoVWFeatureType,
    pub storage_type: BoVWStorageType,
    pub vocabulary_size: u32,
    pub max_keypoints: u32,
    pub min_hash_size: u32,
    pub sim_hash_bits: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for BoVWConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(256, 256, Interpolation::Bilinear),
            feature_type: BoVWFeatureType::Orb,
            storage_type: BoVWStorageType::Histogram,
            vocabulary_size: 256,
            max_keypoints: 500,
            min_hash_size: 64,
            sim_hash_bits: 128,
            distance: None,
        }
    }
}

impl BoVWConfig {
    resize_setters!();
    distance_setter!();

    pub fn feature_type(mut self, feature_type: BoVWFeatureType) -> Self {
        self.feature_type = feature_type;
        self
    }

    pub fn storage_type(mut self, storage_type: BoVWStorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    pub fn vocabulary_size(mut self, size: u32) -> Self {
        self.vocabulary_size = size;
        self
    }

    pub fn max_keypoints(mut self, count: u32) -> Self {
        self.max_keypoints = count;
        self
    }

    pub fn min_hash_size(mut self, size: u32) -> Self {
        self.min_hash_size = size;
        self
    }

    /// Set the SimHash width; must be a positive multiple of 8
    pub fn sim_hash_bits(mut self, bits: u32) -> Self {
        self.sim_hash_bits = bits;
        self
    }

    pub fn build(self) -> Result<BoVWHasher, ConfigError> {
        self.resize.validate()?;
        if self.vocabulary_size == 0 {
            return Err(ConfigError::InvalidVocabularySize(self.vocabulary_size));
        }
        if self.max_keypoints == 0 {
            return Err(ConfigError::InvalidKeypoints(self.max_keypoints));
        }
        if self.min_hash_size == 0 {
            return Err(ConfigError::InvalidSignatureSize(self.min_hash_size));
        }
        if self.sim_hash_bits == 0 || self.sim_hash_bits % 8 != 0 {
            return Err(ConfigError::InvalidSignatureSize(self.sim_hash_bits));
        }
        Ok(BoVWHasher::from_config(self))
    }
}

/// BoVW hash implementation
#[derive(Debug, Clone)]
pub struct BoVWHasher {
    config: BoVWConfig,
    metric: Metric,
}

impl BoVWHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> BoVWConfig {
        BoVWConfig::default()
    }

    fn from_config(config: BoVWConfig) -> Self {
        let default_metric = match config.storage_type {
            BoVWStorageType::Histogram => Metric::Cosine,
            BoVWStorageType::MinHash => Metric::JaccardSignature,
            BoVWStorageType::SimHash => Metric::Jaccard,
        };
        let metric = config.distance.clone().unwrap_or(default_metric);
        Self { config, metric }
    }
}

impl Default for BoVWHasher {
    fn default() -> Self {
        Self::from_config(BoVWConfig::default())
    }
}

impl HashAlgorithm for BoVWHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let max_keypoints = self.config.max_keypoints as usize;
        let described = match self.config.feature_type {
            BoVWFeatureType::Orb => features::orb(&gray, max_keypoints),
            BoVWFeatureType::Akaze => features::akaze(&gray, max_keypoints)?,
        };
        debug!(
            feature = %self.config.feature_type,
            keypoints = described.len(),
            "bovw keypoints detected"
        );

        let counts = signature::word_histogram(
            described.iter().map(|(_, descriptor)| descriptor),
            self.config.vocabulary_size as usize,
        );
        let hash = match self.config.storage_type {
            BoVWStorageType::Histogram => {
                HashValue::Float64(Float64Hash::new(signature::normalized(&counts)))
            }
            BoVWStorageType::MinHash => HashValue::Float64(Float64Hash::new(
                signature::min_hash(&counts, self.config.min_hash_size as usize),
            )),
            BoVWStorageType::SimHash => HashValue::Binary(signature::sim_hash(
                &counts,
                self.config.sim_hash_bits as usize,
            )?),
        };
        Ok(hash)
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::BoVW
    }

    fn shape(&self) -> (HashVariant, usize) {
        match self.config.storage_type {
            BoVWStorageType::Histogram => (HashVariant::Float64, self.config.vocabulary_size as usize),
            BoVWStorageType::MinHash => (HashVariant::Float64, self.config.min_hash_size as usize),
            BoVWStorageType::SimHash => (HashVariant::Binary, self.config.sim_hash_bits as usize / 8),
        }
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::Descriptor;
    use image::{GrayImage, Luma};

    fn texture() -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(256, 256, |x, y| {
            let checker = ((x / 16) + (y / 16)) % 2 == 0;
            let dot = (x % 37 < 3) && (y % 29 < 3);
            Luma([match (checker, dot) {
                (_, true) => 255,
                (true, false) => 180,
                (false, false) => 40,
            }])
        }))
    }

    #[test]
    fn enums_parse_and_convert() {
        assert_eq!("orb".parse::<BoVWFeatureType>().unwrap(), BoVWFeatureType::Orb);
        assert_eq!(BoVWFeatureType::try_from(1).unwrap(), BoVWFeatureType::Akaze);
        assert_eq!(
            "sift".parse::<BoVWFeatureType>().unwrap_err(),
            ConfigError::InvalidBoVWFeatureType("sift".into())
        );
        assert_eq!("minhash".parse::<BoVWStorageType>().unwrap(), BoVWStorageType::MinHash);
        assert_eq!(
            BoVWStorageType::try_from(3).unwrap_err(),
            ConfigError::InvalidBoVWStorageType("3".into())
        );
    }

    #[test]
    fn validation() {
        assert_eq!(
            BoVWHasher::builder().vocabulary_size(0).build().unwrap_err(),
            ConfigError::InvalidVocabularySize(0)
        );
        assert_eq!(
            BoVWHasher::builder().max_keypoints(0).build().unwrap_err(),
            ConfigError::InvalidKeypoints(0)
        );
        assert_eq!(
            BoVWHasher::builder().sim_hash_bits(12).build().unwrap_err(),
            ConfigError::InvalidSignatureSize(12)
        );
    }

    #[test]
    fn histogram_is_unit_length() {
        let hasher = BoVWHasher::new();
        let hash = hasher.calculate(&texture()).unwrap();
        let values = hash.as_float64().unwrap().as_slice();
        assert_eq!(values.len(), 256);
        let norm: f64 = values.iter().map(|v| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-9);
        assert!(hasher.compare(&hash, &hash).unwrap().abs() < 1e-9);
    }

    #[test]
    fn storage_types_shape_the_output() {
        for storage in BoVWStorageType::ALL {
            for feature in BoVWFeatureType::ALL {
                let hasher = BoVWHasher::builder()
                    .feature_type(feature)
                    .storage_type(storage)
                    .build()
                    .unwrap();
                let hash = hasher.calculate(&texture()).unwrap();
                let (variant, len) = hasher.shape();
                assert_eq!(hash.variant(), variant);
                assert_eq!(hash.len(), len, "{} / {}", feature, storage);
                assert!(hasher.compare(&hash, &hash).unwrap().abs() < 1e-9);
            }
        }
    }

    #[test]
    fn flat_image_has_empty_signatures() {
        let flat = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([100])));
        let hasher = BoVWHasher::builder()
            .storage_type(BoVWStorageType::MinHash)
            .build()
            .unwrap();
        let hash = hasher.calculate(&flat).unwrap();
        let values = hash.as_float64().unwrap().as_slice();
        assert!(values.iter().all(|&v| v == signature::MINHASH_PRIME as f64));
    }
}
