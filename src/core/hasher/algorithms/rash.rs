//! Rotation-Aware Spatial Hash (RASH).
//!
//! Mean brightness of concentric rings around the image centre is unchanged
//! by rotation about that centre. The DCT of the ring profile, thresholded
//! against its median, gives a 64-bit hash.

use super::super::options::{distance_setter, resize_setters, validate_sigma, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use super::threshold_bits;
use crate::core::hash::{HashValue, HashVariant};
use crate::core::imgproc::{dct1d, gaussian_blur, median_of, Interpolation};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

const HASH_BITS: usize = 64;

/// Mean intensity of each of `rings` rings around the centre; pixels beyond
/// the inscribed circle fall into the outermost ring.
fn ring_means(gray: &GrayImage, rings: usize) -> Vec<f32> {
    let (width, height) = gray.dimensions();
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let ring_width = width.min(height) as f32 / 2.0 / rings as f32;

    let mut sums = vec![0f64; rings];
    let mut counts = vec![0u32; rings];
    for (x, y, px) in gray.enumerate_pixels() {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        let distance = (dx * dx + dy * dy).sqrt();
        let ring = ((distance / ring_width) as usize).min(rings - 1);
        sums[ring] += px[0] as f64;
        counts[ring] += 1;
    }

    sums.iter()
        .zip(&counts)
        .map(|(&sum, &count)| if count == 0 { 0.0 } else { (sum / count as f64) as f32 })
        .collect()
}

/// Configuration for [`RashHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RashConfig {
    pub resize: ResizeOptions,
    pub sigma: f64,
    pub rings: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for RashConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(256, 256, Interpolation::Bilinear),
            sigma: 1.0,
            rings: 180,
            distance: None,
        }
    }
}

impl RashConfig {
    resize_setters!();
    distance_setter!();

    pub fn sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn rings(mut self, rings: u32) -> Self {
        self.rings = rings;
        self
    }

    pub fn build(self) -> Result<RashHasher, ConfigError> {
        self.resize.validate()?;
        validate_sigma(self.sigma)?;
        if self.rings == 0 {
            return Err(ConfigError::InvalidRings(self.rings));
        }
        Ok(RashHasher::from_config(self))
    }
}

/// RASH implementation
#[derive(Debug, Clone)]
pub struct RashHasher {
    config: RashConfig,
    metric: Metric,
}

impl RashHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RashConfig {
        RashConfig::default()
    }

    fn from_config(config: RashConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::Hamming);
        Self { config, metric }
    }
}

impl Default for RashHasher {
    fn default() -> Self {
        Self::from_config(RashConfig::default())
    }
}

impl HashAlgorithm for RashHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let blurred = gaussian_blur(&gray, 0, self.config.sigma)?;

        let mut profile = ring_means(&blurred, self.config.rings as usize);
        dct1d(&mut profile);

        // coefficients 1..=64, zero when there are fewer rings
        let coefficients: Vec<f32> = (1..=HASH_BITS)
            .map(|k| profile.get(k).copied().unwrap_or(0.0))
            .collect();
        let median = median_of(&coefficients);
        let hash = threshold_bits(coefficients.iter().map(|&c| c > median))?;
        Ok(HashValue::Binary(hash))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Rash
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::Binary, HASH_BITS / 8)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{imageops, Luma};

    fn pattern() -> GrayImage {
        GrayImage::from_fn(256, 256, |x, y| {
            let (dx, dy) = (x as f32 - 90.0, y as f32 - 140.0);
            let blob = (-(dx * dx + dy * dy) / 1800.0).exp() * 200.0;
            Luma([(blob + ((x * 3 + y * 5) % 40) as f32) as u8])
        })
    }

    #[test]
    fn ring_means_of_concentric_image() {
        let img = GrayImage::from_fn(64, 64, |x, y| {
            let (dx, dy) = (x as f32 - 31.5, y as f32 - 31.5);
            Luma([if (dx * dx + dy * dy).sqrt() < 16.0 { 200 } else { 0 }])
        });
        let means = ring_means(&img, 4);
        assert_eq!(means[0], 200.0);
        assert_eq!(means[1], 200.0);
        assert_eq!(means[2], 0.0);
    }

    #[test]
    fn rotation_by_90_degrees_keeps_the_hash() {
        let hasher = RashHasher::new();
        let img = pattern();
        let original = hasher.calculate(&DynamicImage::ImageLuma8(img.clone())).unwrap();
        let rotated = hasher
            .calculate(&DynamicImage::ImageLuma8(imageops::rotate90(&img)))
            .unwrap();
        assert!(hasher.compare(&original, &rotated).unwrap() <= 4.0);
    }

    #[test]
    fn few_rings_still_give_64_bits() {
        let hasher = RashHasher::builder().rings(8).build().unwrap();
        let hash = hasher.calculate(&DynamicImage::ImageLuma8(pattern())).unwrap();
        assert_eq!(hash.as_binary().unwrap().as_bytes().len(), 8);
        assert_eq!(
            RashHasher::builder().rings(0).build().unwrap_err(),
            ConfigError::InvalidRings(0)
        );
    }
}
