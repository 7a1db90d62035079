//! GIST descriptor.
//!
//! Energy of a Gabor filter bank, three scales by several orientations,
//! averaged over a coarse spatial grid.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{Float64Hash, HashValue, HashVariant};
use crate::core::imgproc::{convolve, Interpolation, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

/// Orientations per scale.
const ORIENTATIONS: [usize; 3] = [8, 8, 4];
/// Wavelength per scale, in pixels.
const WAVELENGTHS: [f64; 3] = [4.0, 8.0, 12.0];
const SIGMA_RATIO: f64 = 0.56;
const GAMMA: f64 = 0.5;
const MIN_KERNEL: usize = 7;
const MAX_KERNEL: usize = 19;
const STD_EPSILON: f64 = 1e-8;

/// Real and imaginary parts of one complex Gabor kernel.
#[derive(Debug, Clone)]
struct Gabor {
    real: Matrix<f64>,
    imag: Matrix<f64>,
}

impl Gabor {
    fn new(lambda: f64, theta: f64) -> Self {
        let sigma = SIGMA_RATIO * lambda;
        let size = (2 * (2.0 * sigma).ceil() as usize + 1).clamp(MIN_KERNEL, MAX_KERNEL);
        let half = (size / 2) as f64;
        let (sin, cos) = theta.sin_cos();

        let envelope_and_phase = |r: usize, c: usize| {
            let (x, y) = (c as f64 - half, r as f64 - half);
            let xr = x * cos + y * sin;
            let yr = -x * sin + y * cos;
            let envelope = (-(xr * xr + GAMMA * GAMMA * yr * yr) / (2.0 * sigma * sigma)).exp();
            (envelope, 2.0 * PI * xr / lambda)
        };

        Self {
            real: Matrix::from_fn(size, size, |r, c| {
                let (envelope, phase) = envelope_and_phase(r, c);
                envelope * phase.cos()
            }),
            imag: Matrix::from_fn(size, size, |r, c| {
                let (envelope, phase) = envelope_and_phase(r, c);
                envelope * phase.sin()
            }),
        }
    }

    /// Per-pixel magnitude of the complex response.
    fn magnitude(&self, src: &Matrix<f64>) -> Matrix<f64> {
        let re = convolve(src, &self.real);
        let im = convolve(src, &self.imag);
        Matrix::from_fn(src.rows(), src.cols(), |r, c| re[(r, c)].hypot(im[(r, c)]))
    }
}

/// The full bank, scale by scale.
fn filter_bank() -> Vec<Gabor> {
    ORIENTATIONS
        .iter()
        .zip(WAVELENGTHS)
        .flat_map(|(&count, lambda)| {
            (0..count).map(move |k| Gabor::new(lambda, k as f64 * PI / count as f64))
        })
        .collect()
}

/// Intensities scaled to `[0, 1]`, then shifted to zero mean and unit variance.
fn standardize(gray: &image::GrayImage) -> Matrix<f64> {
    let mut m = Matrix::<f64>::from_gray(gray);
    let n = m.as_slice().len() as f64;
    m.as_mut_slice().iter_mut().for_each(|v| *v /= 255.0);

    let mean = m.as_slice().iter().sum::<f64>() / n;
    let variance = m.as_slice().iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    let scale = if std < STD_EPSILON { 1.0 } else { std };
    m.as_mut_slice()
        .iter_mut()
        .for_each(|v| *v = (*v - mean) / scale);
    m
}

/// Mean of `response` over each cell of a `grid_x` by `grid_y` grid, row-major.
fn pool(response: &Matrix<f64>, grid_x: usize, grid_y: usize, out: &mut Vec<f64>) {
    let (rows, cols) = (response.rows(), response.cols());
    let mut sums = vec![0.0; grid_x * grid_y];
    let mut counts = vec![0usize; grid_x * grid_y];
    for r in 0..rows {
        let gy = r * grid_y / rows;
        for c in 0..cols {
            let gx = c * grid_x / cols;
            sums[gy * grid_x + gx] += response[(r, c)];
            counts[gy * grid_x + gx] += 1;
        }
    }
    out.extend(
        sums.iter()
            .zip(&counts)
            .map(|(&s, &n)| if n == 0 { 0.0 } else { s / n as f64 }),
    );
}

/// Configuration for [`GistHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistConfig {
    pub resize: ResizeOptions,
    pub grid_x: u32,
    pub grid_y: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(64, 64, Interpolation::Bilinear),
            grid_x: 4,
            grid_y: 4,
            distance: None,
        }
    }
}

impl GistConfig {
    resize_setters!();
    distance_setter!();

    /// Set the pooling grid
    pub fn grid_size(mut self, x: u32, y: u32) -> Self {
        self.grid_x = x;
        self.grid_y = y;
        self
    }

    pub fn build(self) -> Result<GistHasher, ConfigError> {
        self.resize.validate()?;
        if self.grid_x == 0
            || self.grid_y == 0
            || self.grid_x > self.resize.width
            || self.grid_y > self.resize.height
        {
            return Err(ConfigError::InvalidGridSize {
                x: self.grid_x,
                y: self.grid_y,
            });
        }
        Ok(GistHasher::from_config(self))
    }
}

/// GIST implementation
#[derive(Debug, Clone)]
pub struct GistHasher {
    config: GistConfig,
    bank: Vec<Gabor>,
    metric: Metric,
}

impl GistHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> GistConfig {
        GistConfig::default()
    }

    fn from_config(config: GistConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Cosine);
        Self {
            config,
            bank: filter_bank(),
            metric,
        }
    }
}

impl Default for GistHasher {
    fn default() -> Self {
        Self::from_config(GistConfig::default())
    }
}

impl HashAlgorithm for GistHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let src = standardize(&gray);
        let (grid_x, grid_y) = (self.config.grid_x as usize, self.config.grid_y as usize);

        let mut values = Vec::with_capacity(self.bank.len() * grid_x * grid_y);
        for filter in &self.bank {
            pool(&filter.magnitude(&src), grid_x, grid_y, &mut values);
        }

        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }

        trace!(
            width = image.width(),
            height = image.height(),
            len = values.len(),
            "gist descriptor"
        );
        Ok(HashValue::Float64(Float64Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Gist
    }

    fn shape(&self) -> (HashVariant, usize) {
        let cells = (self.config.grid_x * self.config.grid_y) as usize;
        (HashVariant::Float64, cells * self.bank.len())
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
    fn kernel_sizes_follow_wavelength() {
        let bank = filter_bank();
        assert_eq!(bank.len(), 20);
        assert_eq!(bank[0].real.rows(), 11);
        assert_eq!(bank[8].real.rows(), 19);
        assert_eq!(bank[19].real.rows(), 19);
    }

    #[test]
    fn flat_image_is_all_zeros() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([90])));
        let hash = GistHasher::new().calculate(&img).unwrap();
        let values = hash.as_float64().unwrap().as_slice();
        assert_eq!(values.len(), 320);
        assert!(values.iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn vertical_stripes_excite_the_horizontal_filter() {
        let img = GrayImage::from_fn(64, 64, |x, _| Luma([if x % 4 < 2 { 200 } else { 40 }]));
        let hash = GistHasher::new()
            .calculate(&DynamicImage::ImageLuma8(img))
            .unwrap();
        let values = hash.as_float64().unwrap().as_slice();

        let norm: f64 = values.iter().map(|v| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-9);

        // filter 0 is theta = 0, filter 4 is theta = pi/2, both at wavelength 4
        let along: f64 = values[0..16].iter().sum();
        let across: f64 = values[64..80].iter().sum();
        assert!(along > 10.0 * across);
    }

    #[test]
    fn grid_changes_length() {
        let hasher = GistHasher::builder().grid_size(2, 2).build().unwrap();
        assert_eq!(hasher.shape(), (HashVariant::Float64, 80));
        assert_eq!(
            GistHasher::builder().grid_size(0, 4).build().unwrap_err(),
            ConfigError::InvalidGridSize { x: 0, y: 4 }
        );
    }
}
