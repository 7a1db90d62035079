//! Histogram of Oriented Gradients Hash implementation.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{HashValue, HashVariant, UInt8Hash};
use crate::core::imgproc::{Interpolation, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

/// Gradient magnitude and unsigned orientation in degrees, `[0, 180)`.
fn gradients(gray: &GrayImage) -> (Matrix<f64>, Matrix<f64>) {
    let m = Matrix::<f64>::from_gray(gray);
    let (rows, cols) = (m.rows(), m.cols());

    // central differences inside, one-sided at the borders
    let diff = |len: usize, i: usize, at: &dyn Fn(usize) -> f64| -> f64 {
        if len < 2 {
            0.0
        } else if i == 0 {
            at(1) - at(0)
        } else if i == len - 1 {
            at(i) - at(i - 1)
        } else {
            at(i + 1) - at(i - 1)
        }
    };

    let mut magnitude = Matrix::filled(rows, cols, 0.0);
    let mut orientation = Matrix::filled(rows, cols, 0.0);
    for r in 0..rows {
        for c in 0..cols {
            let gx = diff(cols, c, &|i| m[(r, i)]);
            let gy = diff(rows, r, &|i| m[(i, c)]);
            magnitude[(r, c)] = (gx * gx + gy * gy).sqrt();
            let angle = gy.atan2(gx).to_degrees().rem_euclid(180.0);
            orientation[(r, c)] = if angle >= 180.0 { 0.0 } else { angle };
        }
    }
    (magnitude, orientation)
}

/// Configuration for [`HogHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HogConfig {
    pub resize: ResizeOptions,
    pub cell_size: u32,
    pub num_bins: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for HogConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(256, 256, Interpolation::Bilinear),
            cell_size: 16,
            num_bins: 9,
            distance: None,
        }
    }
}

impl HogConfig {
    resize_setters!();
    distance_setter!();

    pub fn cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn num_bins(mut self, num_bins: u32) -> Self {
        self.num_bins = num_bins;
        self
    }

    pub fn build(self) -> Result<HogHasher, ConfigError> {
        self.resize.validate()?;
        if self.cell_size == 0
            || self.cell_size > self.resize.width
            || self.cell_size > self.resize.height
        {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.num_bins == 0 {
            return Err(ConfigError::InvalidNumBins(self.num_bins));
        }
        Ok(HogHasher::from_config(self))
    }

    fn cells(&self) -> (usize, usize) {
        (
            (self.resize.width / self.cell_size) as usize,
            (self.resize.height / self.cell_size) as usize,
        )
    }
}

/// HOG Hash implementation
#[derive(Debug, Clone)]
pub struct HogHasher {
    config: HogConfig,
    metric: Metric,
}

impl HogHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> HogConfig {
        HogConfig::default()
    }

    fn from_config(config: HogConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Cosine);
        Self { config, metric }
    }
}

impl Default for HogHasher {
    fn default() -> Self {
        Self::from_config(HogConfig::default())
    }
}

impl HashAlgorithm for HogHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let (magnitude, orientation) = gradients(&gray);

        let cell = self.config.cell_size as usize;
        let bins = self.config.num_bins as usize;
        let bin_width = 180.0 / bins as f64;
        let (cells_x, cells_y) = self.config.cells();

        let mut values = Vec::with_capacity(cells_x * cells_y * bins);
        let mut histogram = vec![0.0f64; bins];
        for cy in 0..cells_y {
            for cx in 0..cells_x {
                histogram.iter_mut().for_each(|h| *h = 0.0);
                for r in cy * cell..(cy + 1) * cell {
                    for c in cx * cell..(cx + 1) * cell {
                        let bin = ((orientation[(r, c)] / bin_width) as usize).min(bins - 1);
                        histogram[bin] += magnitude[(r, c)];
                    }
                }

                let max = histogram.iter().copied().fold(0.0, f64::max);
                values.extend(histogram.iter().map(|&h| {
                    if max > 0.0 {
                        (h / max * 255.0).round() as u8
                    } else {
                        0
                    }
                }));
            }
        }
        Ok(HashValue::UInt8(UInt8Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Hog
    }

    fn shape(&self) -> (HashVariant, usize) {
        let (cells_x, cells_y) = self.config.cells();
        (HashVariant::UInt8, cells_x * cells_y * self.config.num_bins as usize)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
