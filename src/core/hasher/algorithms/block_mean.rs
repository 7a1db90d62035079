//! Block Mean Hash implementation.
//!
//! The resized grayscale image is tiled into blocks; each bit says whether a
//! block is at least as bright as the whole image.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{mean, Interpolation};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How blocks are laid out over the image.
///
/// The rotation methods currently tile exactly like their non-rotating
/// counterparts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockMeanMethod {
    /// Non-overlapping blocks
    #[default]
    Direct = 0,
    /// Blocks advance by half a block
    Overlap = 1,
    Rotation = 2,
    RotationOverlap = 3,
}

impl BlockMeanMethod {
    pub const ALL: [BlockMeanMethod; 4] = [
        BlockMeanMethod::Direct,
        BlockMeanMethod::Overlap,
        BlockMeanMethod::Rotation,
        BlockMeanMethod::RotationOverlap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockMeanMethod::Direct => "Direct",
            BlockMeanMethod::Overlap => "Overlap",
            BlockMeanMethod::Rotation => "Rotation",
            BlockMeanMethod::RotationOverlap => "RotationOverlap",
        }
    }

    fn overlaps(self) -> bool {
        matches!(self, BlockMeanMethod::Overlap | BlockMeanMethod::RotationOverlap)
    }
}

impl fmt::Display for BlockMeanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockMeanMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockMeanMethod::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidBlockMeanMethod(s.to_string()))
    }
}

impl TryFrom<u8> for BlockMeanMethod {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BlockMeanMethod::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ConfigError::InvalidBlockMeanMethod(value.to_string()))
    }
}

/// Block origins along one axis.
fn block_origins(extent: u32, block: u32, overlap: bool) -> Vec<u32> {
    let count = extent / block;
    if overlap {
        let stride = (block / 2).max(1);
        (0..(2 * count).saturating_sub(1)).map(|i| i * stride).collect()
    } else {
        (0..count).map(|i| i * block).collect()
    }
}

fn block_mean(gray: &GrayImage, x0: u32, y0: u32, width: u32, height: u32) -> f64 {
    let mut sum = 0u64;
    for y in y0..y0 + height {
        for x in x0..x0 + width {
            sum += gray.get_pixel(x, y)[0] as u64;
        }
    }
    sum as f64 / (width as u64 * height as u64) as f64
}

/// Configuration for [`BlockMeanHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockMeanConfig {
    pub resize: ResizeOptions,
    pub block_width: u32,
    pub block_height: u32,
    pub method: BlockMeanMethod,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for BlockMeanConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(256, 256, Interpolation::BilinearExact),
            block_width: 16,
            block_height: 16,
            method: BlockMeanMethod::Direct,
            distance: None,
        }
    }
}

impl BlockMeanConfig {
    resize_setters!();
    distance_setter!();

    pub fn block_size(mut self, width: u32, height: u32) -> Self {
        self.block_width = width;
        self.block_height = height;
        self
    }

    pub fn method(mut self, method: BlockMeanMethod) -> Self {
        self.method = method;
        self
    }

    pub fn build(self) -> Result<BlockMeanHasher, ConfigError> {
        self.resize.validate()?;
        if self.block_width == 0
            || self.block_height == 0
            || self.block_width > self.resize.width
            || self.block_height > self.resize.height
        {
            return Err(ConfigError::InvalidBlockSize {
                width: self.block_width,
                height: self.block_height,
            });
        }
        Ok(BlockMeanHasher::from_config(self))
    }

    fn origins(&self) -> (Vec<u32>, Vec<u32>) {
        let overlap = self.method.overlaps();
        (
            block_origins(self.resize.width, self.block_width, overlap),
            block_origins(self.resize.height, self.block_height, overlap),
        )
    }
}

/// Block Mean Hash implementation
#[derive(Debug, Clone)]
pub struct BlockMeanHasher {
    config: BlockMeanConfig,
    metric: Metric,
}

impl BlockMeanHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> BlockMeanConfig {
        BlockMeanConfig::default()
    }

    fn from_config(config: BlockMeanConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self { config, metric }
    }
}

impl Default for BlockMeanHasher {
    fn default() -> Self {
        Self::from_config(BlockMeanConfig::default())
    }
}

impl HashAlgorithm for BlockMeanHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let image_mean = mean(&gray);

        let (xs, ys) = self.config.origins();
        let (bw, bh) = (self.config.block_width, self.config.block_height);
        let means: Vec<f64> = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .map(|(x, y)| block_mean(&gray, x, y, bw, bh))
            .collect();

        let hash = threshold_bits(means.iter().map(|&m| m >= image_mean))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::BlockMean
    }

    fn shape(&self) -> (HashVariant, usize) {
        let (xs, ys) = self.config.origins();
        (HashVariant::Binary, (xs.len() * ys.len()).div_ceil(8))
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
