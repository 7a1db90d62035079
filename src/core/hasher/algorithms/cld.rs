//! MPEG-7 Color Layout Descriptor.
//!
//! The image is averaged into an 8x8 grid of YCbCr colours, each channel is
//! transformed with an 8x8 DCT, and the first coefficients in zig-zag order
//! are quantized: 6 for luma, 3 for each chroma channel.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{HashValue, HashVariant, UInt8Hash};
use crate::core::imgproc::{dct2d, rgb_to_ycbcr, Interpolation, Matrix};
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

const GRID: usize = 8;
const Y_COEFFICIENTS: usize = 6;
const C_COEFFICIENTS: usize = 3;
const HASH_LEN: usize = Y_COEFFICIENTS + 2 * C_COEFFICIENTS;

/// JPEG zig-zag scan order over an 8x8 block, as row-major indices.
const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27,
    20, 13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58,
    59, 52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Mean Y, Cb and Cr per grid cell.
fn cell_means(img: &RgbaImage) -> [Matrix<f64>; 3] {
    let (width, height) = (img.width() as usize, img.height() as usize);
    let mut sums = [[0u64; GRID * GRID]; 3];
    let mut counts = [0u64; GRID * GRID];

    for (x, y, px) in img.enumerate_pixels() {
        let cell = (y as usize * GRID / height) * GRID + x as usize * GRID / width;
        let (luma, cb, cr) = rgb_to_ycbcr(px[0], px[1], px[2]);
        sums[0][cell] += luma as u64;
        sums[1][cell] += cb as u64;
        sums[2][cell] += cr as u64;
        counts[cell] += 1;
    }

    sums.map(|channel| {
        Matrix::from_fn(GRID, GRID, |r, c| {
            let cell = r * GRID + c;
            (channel[cell] / counts[cell].max(1)) as f64
        })
    })
}

fn quantize(index: usize, coefficient: f64) -> u8 {
    if index == 0 {
        let mean = coefficient / 8.0;
        (mean * 63.0 / 255.0).round().clamp(0.0, 63.0) as u8
    } else {
        ((coefficient / 16.0).round() + 16.0).clamp(0.0, 31.0) as u8
    }
}

/// Configuration for [`CldHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CldConfig {
    pub resize: ResizeOptions,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for CldConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(64, 64, Interpolation::Bilinear),
            distance: None,
        }
    }
}

impl CldConfig {
    resize_setters!();
    distance_setter!();

    pub fn build(self) -> Result<CldHasher, ConfigError> {
        self.resize.validate()?;
        if (self.resize.width as usize) < GRID || (self.resize.height as usize) < GRID {
            return Err(ConfigError::InvalidSize {
                width: self.resize.width,
                height: self.resize.height,
            });
        }
        Ok(CldHasher::from_config(self))
    }
}

/// Color Layout Descriptor implementation
#[derive(Debug, Clone)]
pub struct CldHasher {
    config: CldConfig,
    metric: Metric,
}

impl CldHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CldConfig {
        CldConfig::default()
    }

    fn from_config(config: CldConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::L2);
        Self { config, metric }
    }
}

impl Default for CldHasher {
    fn default() -> Self {
        Self::from_config(CldConfig::default())
    }
}

impl HashAlgorithm for CldHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let resized = self.config.resize.apply(image)?.to_rgba8();
        let channels = cell_means(&resized);

        let mut values = Vec::with_capacity(HASH_LEN);
        for (channel, keep) in channels
            .iter()
            .zip([Y_COEFFICIENTS, C_COEFFICIENTS, C_COEFFICIENTS])
        {
            let coefficients = dct2d(channel);
            let flat = coefficients.as_slice();
            values.extend(
                ZIGZAG[..keep]
                    .iter()
                    .enumerate()
                    .map(|(i, &pos)| quantize(i, flat[pos])),
            );
        }
        Ok(HashValue::UInt8(UInt8Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Cld
    }

    fn shape(&self) -> (HashVariant, usize) {
        (HashVariant::UInt8, HASH_LEN)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn zigzag_is_a_permutation() {
        let mut seen = [false; 64];
        for &i in ZIGZAG.iter() {
            assert!(!seen[i]);
            seen[i] = true;
        }
        assert_eq!(&ZIGZAG[..6], &[0, 1, 8, 16, 9, 2]);
    }

    #[test]
    fn flat_colour_has_only_dc_terms() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([255, 255, 255])));
        let hash = CldHasher::new().calculate(&img).unwrap();
        let values = hash.as_uint8().unwrap().as_slice();
        // Y = 255, Cb = Cr = 128
        assert_eq!(values, &[63, 16, 16, 16, 16, 16, 32, 16, 16, 32, 16, 16]);
    }

    #[test]
    fn quantization_clamps() {
        assert_eq!(quantize(0, 8.0 * 300.0), 63);
        assert_eq!(quantize(0, -5.0), 0);
        assert_eq!(quantize(3, 1000.0), 31);
        assert_eq!(quantize(3, -1000.0), 0);
        assert_eq!(quantize(1, 40.0), 19);
    }

    #[test]
    fn rejects_sizes_below_grid() {
        assert!(CldHasher::builder().size(4, 64).build().is_err());
    }
}
