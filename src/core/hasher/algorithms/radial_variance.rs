//! Radial Variance Hash implementation.
//!
//! Pixel values are sampled along lines through the image centre, one line
//! per angle. The variance along each line forms a feature vector whose
//! low-frequency DCT coefficients, scaled to bytes, are the hash. Because a
//! rotation only shifts the feature vector cyclically, the default metric is
//! peak cross-correlation.

use super::super::options::{distance_setter, validate_sigma};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{HashValue, HashVariant, UInt8Hash};
use crate::core::imgproc::{gaussian_blur, grayscale, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

/// Number of DCT coefficients kept.
const COEFFICIENTS: usize = 40;
/// Added to line pixel counts so empty lines do not divide by zero.
const COUNT_EPSILON: f64 = 0.00001;

/// Projections of the image along `angles` lines through its centre.
struct Projections {
    /// `angles x max(width, height)` sampled pixel values
    values: Matrix<u8>,
    /// pixels sampled per line
    counts: Vec<u32>,
}

/// Rounds half away from zero, then floors.
fn round_index(v: f64) -> i64 {
    let offset = if v >= 0.0 { 0.5 } else { -0.5 };
    (v + offset).floor() as i64
}

fn radon_projections(img: &GrayImage, angles: usize) -> Projections {
    let width = img.width() as i64;
    let height = img.height() as i64;
    let d = width.max(height) as usize;
    let x_off = round_index(width as f64 / 2.0);
    let y_off = round_index(height as f64 / 2.0);

    let mut values = Matrix::filled(angles, d, 0u8);
    let mut counts = vec![0u32; angles];
    let pixel = |x: i64, y: i64| img.get_pixel(x as u32, y as u32)[0];

    // lines within 45 degrees of horizontal, mirrored into their vertical twins
    for k in 0..angles / 4 + 1 {
        let slope = (k as f64 * PI / angles as f64).tan();
        for x in 0..d as i64 {
            let yd = round_index(slope * (x - x_off) as f64);
            if yd + y_off >= 0 && yd + y_off < height && x < width {
                values[(k, x as usize)] = pixel(x, yd + y_off);
                counts[k] += 1;
            }
            let twin = angles / 2 - k;
            if yd + x_off >= 0 && yd + x_off < width && k != angles / 4 && x < height && twin < angles {
                values[(twin, x as usize)] = pixel(yd + x_off, x);
                counts[twin] += 1;
            }
        }
    }

    // the remaining quadrant, mirrored the other way
    for (step, k) in (3 * angles / 4..angles).enumerate() {
        let slope = (k as f64 * PI / angles as f64).tan();
        let twin = k - 2 * step;
        for x in 0..d as i64 {
            let yd = round_index(slope * (x - x_off) as f64);
            if yd + y_off >= 0 && yd + y_off < height && x < width {
                values[(k, x as usize)] = pixel(x, yd + y_off);
                counts[k] += 1;
            }
            let (sx, sy) = (y_off - yd, 2 * y_off - x);
            if sx >= 0 && sx < width && sy >= 0 && sy < height && k != 3 * angles / 4 {
                values[(twin, x as usize)] = pixel(sx, sy);
                counts[twin] += 1;
            }
        }
    }

    Projections { values, counts }
}

/// Standardized per-line variance.
fn feature_vector(projections: &Projections) -> Vec<f64> {
    let mut features: Vec<f64> = projections
        .counts
        .iter()
        .enumerate()
        .map(|(k, &count)| {
            let (sum, sum_sq) = projections.values.row(k).iter().fold((0.0, 0.0), |(s, q), &v| {
                let v = v as f64;
                (s + v, q + v * v)
            });
            let n = count as f64 + COUNT_EPSILON;
            sum_sq / n - (sum * sum) / (n * n)
        })
        .collect();

    let n = features.len() as f64;
    let sum: f64 = features.iter().sum();
    let sum_sq: f64 = features.iter().map(|f| f * f).sum();
    let mean = sum / n;
    let std = (sum_sq / n - mean * mean).max(0.0).sqrt();
    for f in features.iter_mut() {
        *f = if std > f64::EPSILON { (*f - mean) / std } else { 0.0 };
    }
    features
}

/// First `COEFFICIENTS` orthonormal DCT-II coefficients, scaled to `0..=255`.
fn dct_bytes(features: &[f64]) -> Vec<u8> {
    let n = features.len() as f64;
    let coefficients: Vec<f64> = (0..COEFFICIENTS)
        .map(|k| {
            let sum: f64 = features
                .iter()
                .enumerate()
                .map(|(i, f)| f * (PI * (2 * i + 1) as f64 * k as f64 / (2.0 * n)).cos())
                .sum();
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            sum * scale
        })
        .collect();

    let min = coefficients.iter().copied().fold(f64::INFINITY, f64::min);
    let max = coefficients.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min <= f64::EPSILON {
        return vec![0; COEFFICIENTS];
    }
    coefficients
        .iter()
        .map(|c| (255.0 * (c - min) / (max - min)) as u8)
        .collect()
}

/// Configuration for [`RadialVarianceHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadialVarianceConfig {
    pub sigma: f64,
    pub angles: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for RadialVarianceConfig {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            angles: 180,
            distance: None,
        }
    }
}

impl RadialVarianceConfig {
    distance_setter!();

    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn angles(mut self, angles: u32) -> Self {
        self.angles = angles;
        self
    }

    pub fn build(self) -> Result<RadialVarianceHasher, ConfigError> {
        validate_sigma(self.sigma)?;
        if self.angles == 0 {
            return Err(ConfigError::InvalidAngles(self.angles));
        }
        Ok(RadialVarianceHasher::from_config(self))
    }
}

/// Radial Variance Hash implementation
#[derive(Debug, Clone)]
pub struct RadialVarianceHasher {
    config: RadialVarianceConfig,
    metric: Metric,
}

impl RadialVarianceHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RadialVarianceConfig {
        RadialVarianceConfig::default()
    }

    fn from_config(config: RadialVarianceConfig) -> Self {
        let metric = config
            .distance
            .clone()
            .unwrap_or(Metric::PeakCrossCorrelation);
        Self { config, metric }
    }
}

impl Default for RadialVarianceHasher {
    fn default() -> Self {
        Self::from_config(RadialVarianceConfig::default())
    }
}

impl HashAlgorithm for RadialVarianceHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = grayscale(image)?;
        let blurred = gaussian_blur(&gray, 0, self.config.sigma)?;
        let projections = radon_projections(&blurred, self.config.angles as usize);
        let features = feature_vector(&projections);
        let bytes = dct_bytes(&features);

        trace!(
            width = image.width(),
            height = image.height(),
            angles = self.config.angles,
            "radial variance hash"
        );
        Ok(HashValue::UInt8(UInt8Hash::new(bytes)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::RadialVariance
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::UInt8, COEFFICIENTS)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
