//! Local Binary Pattern Hash implementation.
//!
//! Each pixel gets an 8-bit code, one bit per neighbour that is at least as
//! bright as the centre. Codes are histogrammed per grid cell.

use super::super::options::{distance_setter, resize_setters, ResizeOptions};
use super::super::traits::{HashAlgorithm, HashAlgorithmKind};
use crate::core::hash::{HashValue, HashVariant, UInt8Hash};
use crate::core::imgproc::Interpolation;
use crate::core::similarity::Metric;
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

const CODES: usize = 256;

/// Neighbour offsets `(dx, dy)` starting east and turning clockwise.
const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// LBP code at `(x, y)`.
///
/// A neighbour outside the image contributes a 0 bit. It is not read as a
/// zero-valued pixel, so a dark centre on the border does not set those bits.
fn lbp_code(gray: &GrayImage, x: u32, y: u32) -> u8 {
    let centre = gray.get_pixel(x, y)[0];
    let (width, height) = (gray.width() as i32, gray.height() as i32);
    let mut code = 0u8;
    for (k, (dx, dy)) in NEIGHBOURS.iter().enumerate() {
        let (nx, ny) = (x as i32 + dx, y as i32 + dy);
        if nx < 0 || ny < 0 || nx >= width || ny >= height {
            continue;
        }
        if gray.get_pixel(nx as u32, ny as u32)[0] >= centre {
            code |= 1 << k;
        }
    }
    code
}

/// Configuration for [`LbpHasher`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LbpConfig {
    pub resize: ResizeOptions,
    pub grid_x: u32,
    pub grid_y: u32,
    #[serde(skip)]
    pub distance: Option<Metric>,
}

impl Default for LbpConfig {
    fn default() -> Self {
        Self {
            resize: ResizeOptions::new(256, 256, Interpolation::Bilinear),
            grid_x: 1,
            grid_y: 1,
            distance: None,
        }
    }
}

impl LbpConfig {
    resize_setters!();
    distance_setter!();

    pub fn grid_size(mut self, x: u32, y: u32) -> Self {
        self.grid_x = x;
        self.grid_y = y;
        self
    }

    pub fn build(self) -> Result<LbpHasher, ConfigError> {
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
        Ok(LbpHasher::from_config(self))
    }
}

/// LBP Hash implementation
#[derive(Debug, Clone)]
pub struct LbpHasher {
    config: LbpConfig,
    metric: Metric,
}

impl LbpHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LbpConfig {
        LbpConfig::default()
    }

    fn from_config(config: LbpConfig) -> Self {
        let metric = config.distance.clone().unwrap_or(Metric::ChiSquare);
        Self { config, metric }
    }
}

impl Default for LbpHasher {
    fn default() -> Self {
        Self::from_config(LbpConfig::default())
    }
}

impl HashAlgorithm for LbpHasher {
    fn calculate(&self, image: &DynamicImage) -> Result<HashValue, HashError> {
        let gray = self.config.resize.apply_gray(image)?;
        let (width, height) = gray.dimensions();
        let (grid_x, grid_y) = (self.config.grid_x, self.config.grid_y);

        let mut histograms = vec![[0u32; CODES]; (grid_x * grid_y) as usize];
        for y in 0..height {
            let gy = y * grid_y / height;
            for x in 0..width {
                let gx = x * grid_x / width;
                let code = lbp_code(&gray, x, y);
                histograms[(gy * grid_x + gx) as usize][code as usize] += 1;
            }
        }

        let mut values = Vec::with_capacity(histograms.len() * CODES);
        for histogram in &histograms {
            let max = histogram.iter().copied().max().unwrap_or(0);
            values.extend(histogram.iter().map(|&count| {
                if max == 0 {
                    0
                } else {
                    (count as f64 * 255.0 / max as f64).round() as u8
                }
            }));
        }
        Ok(HashValue::UInt8(UInt8Hash::new(values)))
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Lbp
    }

    fn shape(&self) -> (HashVariant, usize) {
        let cells = (self.config.grid_x * self.config.grid_y) as usize;
        (HashVariant::UInt8, cells * CODES)
    }

    fn metric(&self) -> &Metric {
        &self.metric
    }
}
