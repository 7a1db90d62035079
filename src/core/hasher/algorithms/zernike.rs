//! Zernike moment hash.
//!
//! Magnitudes of the complex Zernike moments over the disk inscribed in the
//! image. A rotation only changes the phase of each moment, so the
//! magnitudes are rotation invariant.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{Float64Hash, HashValue, HashVariant};
use crate::core::imgproc::Interpolation;
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

const DC_EPSILON: f64 = 1e-12;

/// One `(n, m)` order with the coefficients of its radial polynomial,
/// `terms[s]` multiplying `rho^(n - 2s)`.
#[derive(Debug, Clone)]
struct Order {
    n: u32,
    m: u32,
    terms: Vec<f64>,
}

impl Order {
    fn new(n: u32, m: u32) -> Self {
        let ln_fact = |k: u32| (1..=k).map(|i| (i as f64).ln()).sum::<f64>();
        let (plus, minus) = ((n + m) / 2, (n - m) / 2);
        let terms = (0..=minus)
            .map(|s| {
                let magnitude =
                    (ln_fact(n) - ln_fact(s) - ln_fact(plus - s) - ln_fact(minus - s)).exp();
                if s % 2 == 0 {
                    magnitude
                } else {
                    -magnitude
                }
            })
            .collect();
        Self { n, m, terms }
    }

    fn radial(&self, rho: f64) -> f64 {
        self.terms
            .iter()
            .enumerate()
            .map(|(s, c)| c * rho.powi((self.n - 2 * s as u32) as i32))
            .sum()
    }
}

/// All orders up to `degree`: `0 <= m <= n`, `m` with the parity of `n`.
fn orders(degree: u32) -> Vec<Order> {
    (0..=degree)
        .flat_map(|n| (n % 2..=n).step_by(2).map(move |m| Order::new(n, m)))
        .collect()
}

/// Moment magnitudes `|A(n, m)|` in order sequence.
fn moment_magnitudes(gray: &GrayImage, orders: &[Order]) -> Vec<f64> {
    let (width, height) = gray.dimensions();
    let cx = (width as f64 - 1.0) / 2.0;
    let cy = (height as f64 - 1.0) / 2.0;
    let radius = width.min(height) as f64 / 2.0;

    let mut re = vec![0.0; orders.len()];
    let mut im = vec![0.0; orders.len()];
    for (x, y, px) in gray.enumerate_pixels() {
        let (dx, dy) = (x as f64 - cx, y as f64 - cy);
        let rho = (dx * dx + dy * dy).sqrt() / radius;
        if rho > 1.0 {
            continue;
        }
        let intensity = px[0] as f64 / 255.0;
        let theta = dy.atan2(dx);
        for (k, order) in orders.iter().enumerate() {
            let weight = intensity * order.radial(rho);
            let angle = order.m as f64 * theta;
            re[k] += weight * angle.cos();
            im[k] -= weight * angle.sin();
        }
    }

    re.iter().zip(&im).map(|(r, i)| r.hypot(*i)).collect()
}

/// Configuration for [`ZernikeHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZernikeConfig {
    pub resize: ResizeOptions,
    pub degree: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for ZernikeConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(64, 64, Interpolation::Bilinear),
            degree: 8,
            distance: None,
        }
    }
}

impl ZernikeConfig {
    resize_setters!();
    distance_setter!();

    /// Set the highest moment order
    pub fn degree(mut self, degree: u32) -> Self {
        self.degree = degree;
        self
    }

    pub fn build(self) -> Result<ZernikeHasher, ConfigError> {
        self.resize.validate()?;
        if self.degree == 0 {
            return Err(ConfigError::InvalidDegree(self.degree));
        }
        Ok(ZernikeHasher::from_config(self))
    }
}

/// Zernike moment hash implementation
#[derive(Debug, Clone)]
pub struct ZernikeHasher {
    config: ZernikeConfig,
    orders: Vec<Order>,
    metric: Metric,
}

impl ZernikeHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ZernikeConfig {
        ZernikeConfig::default()
    }

    fn from_config(config: ZernikeConfig) -> Self {
        let orders = orders(config.degree);
        let metric = config.distance.clone().unwrap_or(Metric::L2);
        Self {
            config,
            orders,
            metric,
        }
    }
}

impl Default for ZernikeHasher {
    fn default() -> Self {
        Self::from_config(ZernikeConfig::default())
    }
}

impl HashAlgorithm for ZernikeHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let magnitudes = moment_magnitudes(&gray, &self.orders);

        // orders()[0] is (0, 0)
        let dc = magnitudes[0] / PI;
        let values: Vec<f64> = if dc <= DC_EPSILON {
            vec![0.0; self.orders.len() - 1]
        } else {
            self.orders[1..]
                .iter()
                .zip(&magnitudes[1..])
                .map(|(order, a)| a * (order.n as f64 + 1.0) / PI / dc)
                .collect()
        };

        trace!(
            width = image.width(),
            height = image.height(),
            len = values.len(),
            "zernike hash"
        );
        Ok(HashValue::Float64(Float64Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Zernike
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Float64, self.orders.len() - 1)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{imageops, Luma};

    fn blob() -> GrayImage {
        GrayImage::from_fn(64, 64, |x, y| {
            let (dx, dy) = (x as f64 - 20.0, y as f64 - 38.0);
            Luma([(230.0 * (-(dx * dx + dy * dy) / 90.0).exp()) as u8 + 10])
        })
    }

    #[test]
    fn order_count_and_radial_polynomials() {
        let orders = orders(8);
        assert_eq!(orders.len(), 25);
        assert_eq!((orders[0].n, orders[0].m), (0, 0));

        // n! numerator: R(2,0) = 2 rho^2 - 2
        let r20 = orders.iter().find(|o| o.n == 2 && o.m == 0).unwrap();
        assert!((r20.radial(0.5) - (-1.5)).abs() < 1e-12);
        // R(n,n) = rho^n
        let r44 = orders.iter().find(|o| o.n == 4 && o.m == 4).unwrap();
        assert!((r44.radial(0.5) - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn black_image_is_all_zeros() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(64, 64));
        let hash = ZernikeHasher::new().calculate(&img).unwrap();
        let values = hash.as_float64().unwrap().as_slice();
        assert_eq!(values.len(), 24);
        assert!(values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rotation_keeps_magnitudes() {
        let hasher = ZernikeHasher::new();
        let img = blob();
        let a = hasher.calculate(&DynamicImage::ImageLuma8(img.clone())).unwrap();
        let b = hasher
            .calculate(&DynamicImage::ImageLuma8(imageops::rotate180(&img)))
            .unwrap();
        assert!(hasher.compare(&a, &b).unwrap() < 1e-6);
    }

    #[test]
    fn degree_is_validated() {
        assert_eq!(
            ZernikeHasher::builder().degree(0).build().unwrap_err(),
            ConfigError::InvalidDegree(0)
        );
        let hasher = ZernikeHasher::builder().degree(2).build().unwrap();
        assert_eq!(hasher.shape(), (HashVariant::Float64, 3));
    }
}
