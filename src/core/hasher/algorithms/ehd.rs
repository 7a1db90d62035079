//! MPEG-7 Edge Histogram Descriptor.
//!
//! The image is split into a 4x4 grid. Inside each cell every 2x2 pixel
//! block is classified as a vertical, horizontal, 45 degree, 135 degree or
//! non-directional edge (or no edge), and the normalized counts are
//! quantized to 3 bits with the standard MPEG-7 tables.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{HashValue, HashVariant, UInt8Hash};
use crate::core::imgproc::Interpolation;
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

const GRID: usize = 4;
const BINS: usize = 5;
const HASH_LEN: usize = GRID * GRID * BINS;
/// Minimum edge response for a block to count.
const EDGE_THRESHOLD: f64 = 11.0;

/// Reconstruction levels per bin: vertical, horizontal, 45, 135, non-directional.
const QUANT_TABLE: [[f64; 8]; BINS] = [
    [0.010867, 0.057915, 0.099526, 0.144849, 0.195573, 0.260504, 0.358031, 0.530128],
    [0.012266, 0.069934, 0.125879, 0.182307, 0.243396, 0.314563, 0.411728, 0.564319],
    [0.004193, 0.025852, 0.046860, 0.068519, 0.093286, 0.123490, 0.161505, 0.228960],
    [0.004174, 0.025924, 0.046232, 0.067163, 0.089655, 0.115391, 0.151904, 0.217745],
    [0.006778, 0.051667, 0.108650, 0.166257, 0.224226, 0.285691, 0.356895, 0.450972],
];

/// Edge strengths of a 2x2 block with corners `a b / c d`.
fn edge_responses(a: f64, b: f64, c: f64, d: f64) -> [f64; BINS] {
    [
        (a - b + c - d).abs(),
        (a + b - c - d).abs(),
        (SQRT_2 * (a - d)).abs(),
        (SQRT_2 * (b - c)).abs(),
        (2.0 * (a - b - c + d)).abs(),
    ]
}

/// Index of the nearest reconstruction level.
fn quantize(bin: usize, value: f64) -> u8 {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, level) in QUANT_TABLE[bin].iter().enumerate() {
        let distance = (value - level).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best as u8
}

fn cell_histogram(gray: &GrayImage, x0: u32, y0: u32, width: u32, height: u32) -> [f64; BINS] {
    let mut histogram = [0.0; BINS];
    let mut blocks = 0usize;
    let at = |x: u32, y: u32| gray.get_pixel(x, y)[0] as f64;

    for by in 0..height / 2 {
        for bx in 0..width / 2 {
            let (x, y) = (x0 + 2 * bx, y0 + 2 * by);
            let responses = edge_responses(at(x, y), at(x + 1, y), at(x, y + 1), at(x + 1, y + 1));
            blocks += 1;

            let (strongest, &max) = responses
                .iter()
                .enumerate()
                .fold((0, &responses[0]), |best, (i, r)| if *r > *best.1 { (i, r) } else { best });
            if max >= EDGE_THRESHOLD {
                histogram[strongest] += 1.0;
            }
        }
    }

    if blocks > 0 {
        histogram.iter_mut().for_each(|h| *h /= blocks as f64);
    }
    histogram
}

/// Configuration for [`EhdHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EhdConfig {
    pub resize: ResizeOptions,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for EhdConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(256, 256, Interpolation::Bilinear),
            distance: None,
        }
    }
}

impl EhdConfig {
    resize_setters!();
    distance_setter!();

    pub fn build(self) -> Result<EhdHasher, ConfigError> {
        self.resize.validate()?;
        // every cell needs at least one 2x2 block
        if (self.resize.width as usize) < 2 * GRID || (self.resize.height as usize) < 2 * GRID {
            return Err(ConfigError::InvalidSize {
                width: self.resize.width,
                height: self.resize.height,
            });
        }
        Ok(EhdHasher::from_config(self))
    }
}

/// Edge Histogram Descriptor implementation
#[derive(Debug, Clone)]
pub struct EhdHasher {
    config: EhdConfig,
    metric: Metric,
}

impl EhdHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EhdConfig {
        EhdConfig::default()
    }

    fn from_config(config: EhdConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::L1);
        Self { config, metric }
    }
}

impl Default for EhdHasher {
    fn default() -> Self {
        Self::from_config(EhdConfig::default())
    }
}

impl HashAlgorithm for EhdHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let cell_w = gray.width() / GRID as u32;
        let cell_h = gray.height() / GRID as u32;

        let mut values = Vec::with_capacity(HASH_LEN);
        for gy in 0..GRID as u32 {
            for gx in 0..GRID as u32 {
                let histogram = cell_histogram(&gray, gx * cell_w, gy * cell_h, cell_w, cell_h);
                values.extend(histogram.iter().enumerate().map(|(bin, &v)| quantize(bin, v)));
            }
        }
        Ok(HashValue::UInt8(UInt8Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Ehd
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::UInt8, HASH_LEN)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
