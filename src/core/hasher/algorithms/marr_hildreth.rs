//! Marr-Hildreth Hash implementation.
//!
//! Edge energy from a Laplacian-of-Gaussian filter is summed over 16x16
//! pixel blocks; 3x3 neighbourhoods of those sums are thresholded against
//! their own average, giving 9 bits per neighbourhood.

use super::super::options::{distance_setter, resize_setters, validate_kernel, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{BinaryHash, HashValue, HashVariant};
use crate::core::imgproc::{
    convolve, equalize_histogram, gaussian_blur, grayscale, resize_gray, Interpolation, Matrix,
};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Pixels per side of a summed block.
const BLOCK: usize = 16;
/// Neighbourhood side and stride over the block grid.
const WINDOW: usize = 3;
const STRIDE: usize = 4;

/// Builds the Laplacian-of-Gaussian kernel for `alpha` and `scale`.
fn marr_hildreth_kernel(alpha: f64, scale: f64) -> Matrix<f64> {
    let sigma = (4.0 * alpha.powf(scale)) as usize;
    let ratio = alpha.powf(-scale);
    let size = 2 * sigma + 1;
    Matrix::from_fn(size, size, |y, x| {
        let dx = ratio * (x as f64 - sigma as f64);
        let dy = ratio * (y as f64 - sigma as f64);
        let a = dx * dx + dy * dy;
        (2.0 - a) * (-a / 2.0).exp()
    })
}

/// Configuration for [`MarrHildrethHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarrHildrethConfig {
    pub resize: ResizeOptions,
    pub kernel_size: u32,
    pub sigma: f64,
    pub scale: f64,
    pub alpha: f64,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for MarrHildrethConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(512, 512, Interpolation::Bilinear),
            kernel_size: 7,
            sigma: 1.0,
            scale: 1.0,
            alpha: 2.0,
            distance: None,
        }
    }
}

impl MarrHildrethConfig {
    resize_setters!();
    distance_setter!();

    /// Set the pre-blur Gaussian kernel
    pub fn gaussian(mut self, kernel_size: u32, sigma: f64) -> Self {
        self.kernel_size = kernel_size;
        self.sigma = sigma;
        self
    }

    /// Set the LoG level exponent
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn build(self) -> Result<MarrHildrethHasher, ConfigError> {
        self.resize.validate()?;
        if (self.resize.width.min(self.resize.height) as usize) < BLOCK * (WINDOW + 1) {
            return Err(ConfigError::InvalidSize {
                width: self.resize.width,
                height: self.resize.height,
            });
        }
        validate_kernel(self.kernel_size, self.sigma)?;
        if self.scale <= 0.0 || !self.scale.is_finite() {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if self.alpha <= 0.0 || !self.alpha.is_finite() {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }
        Ok(MarrHildrethHasher::from_config(self))
    }

    /// Side of the block-sum grid; the last partial block is dropped.
    fn grid(&self) -> usize {
        self.resize.width.min(self.resize.height) as usize / BLOCK - 1
    }

    /// Neighbourhood positions per axis.
    fn positions(&self) -> usize {
        (self.grid() - WINDOW) / STRIDE + 1
    }

    fn bit_count(&self) -> usize {
        self.positions() * self.positions() * WINDOW * WINDOW
    }
}

/// Marr-Hildreth Hash implementation
#[derive(Debug, Clone)]
pub struct MarrHildrethHasher {
    config: MarrHildrethConfig,
    kernel: Matrix<f64>,
    metric: Metric,
}

impl MarrHildrethHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MarrHildrethConfig {
        MarrHildrethConfig::default()
    }

    fn from_config(config: MarrHildrethConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        let kernel = marr_hildreth_kernel(config.alpha, config.scale);
        Self {
            config,
            kernel,
            metric,
        }
    }
}

impl Default for MarrHildrethHasher {
    fn default() -> Self {
        Self::from_config(MarrHildrethConfig::default())
    }
}

impl HashAlgorithm for MarrHildrethHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let config = &self.config;
        let gray = grayscale(image)?;
        let blurred = gaussian_blur(&gray, config.kernel_size, config.sigma)?;
        let resized = resize_gray(
            &blurred,
            config.resize.width,
            config.resize.height,
            config.resize.interpolation,
        )?;
        let equalized = equalize_histogram(&resized)?;
        let edges = convolve(&Matrix::<f64>::from_gray(&equalized), &self.kernel);

        let grid = config.grid();
        let blocks = Matrix::from_fn(grid, grid, |i, j| {
            let mut sum = 0.0;
            for r in i * BLOCK..(i + 1) * BLOCK {
                sum += edges.row(r)[j * BLOCK..(j + 1) * BLOCK].iter().sum::<f64>();
            }
            sum
        });

        let mut hash = BinaryHash::new(config.bit_count());
        let mut bit = 0;
        for r0 in (0..=grid - WINDOW).step_by(STRIDE) {
            for c0 in (0..=grid - WINDOW).step_by(STRIDE) {
                // neighbourhood read transposed: blocks[j][i]
                let mut window = [0.0; WINDOW * WINDOW];
                for (k, value) in window.iter_mut().enumerate() {
                    let (i, j) = (r0 + k / WINDOW, c0 + k % WINDOW);
                    *value = blocks[(j, i)];
                }
                let average = window.iter().sum::<f64>() / window.len() as f64;
                for value in window {
                    if value > average {
                        hash.set_reverse(bit)?;
                    }
                    bit += 1;
                }
            }
        }

        trace!(width = image.width(), height = image.height(), bits = bit, "marr-hildreth hash");
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::MarrHildreth
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, self.config.bit_count().div_ceil(8))
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
