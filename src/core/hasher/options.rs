//! Options shared by several hashers.
//!
//! Every configuration embeds a [`ResizeOptions`] record when the algorithm
//! starts by resizing, plus an optional [`Metric`] override for `compare`.
//! The setter macros give each configuration the same chained methods.

use crate::core::imgproc::{grayscale, resize, Interpolation};
use crate::error::{ConfigError, HashError};
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

/// Target dimensions and interpolation of the initial resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: u32,
    pub interpolation: Interpolation,
}

impl ResizeOptions {
    pub const fn new(width: u32, height: u32, interpolation: Interpolation) -> Self {
        Self {
            width,
            height,
            interpolation,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Resizes `image` to the configured dimensions.
    pub fn apply(&self, image: &DynamicImage) -> Result<DynamicImage, HashError> {
        resize(image, self.width, self.height, self.interpolation)
    }

    /// Resizes, then converts to grayscale.
    pub fn apply_gray(&self, image: &DynamicImage) -> Result<GrayImage, HashError> {
        grayscale(&self.apply(image)?)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

pub(crate) fn validate_sigma(sigma: f64) -> Result<(), ConfigError> {
    if sigma < 0.0 || !sigma.is_finite() {
        return Err(ConfigError::InvalidSigma(sigma));
    }
    Ok(())
}

/// Gaussian kernel sizes must be odd; zero derives the size from sigma.
pub(crate) fn validate_kernel(ksize: u32, sigma: f64) -> Result<(), ConfigError> {
    validate_sigma(sigma)?;
    if ksize % 2 == 0 && !(ksize == 0 && sigma > 0.0) {
        return Err(ConfigError::InvalidKernelSize(ksize));
    }
    Ok(())
}

/// Adds `size` and `interpolation` setters for a config with a `resize` field.
macro_rules! resize_setters {
    () => {
        /// Set the resize target
        pub fn size(mut self, width: u32, height: u32) -> Self {
            self.resize.width = width;
            self.resize.height = height;
            self
        }

        /// Set the resize interpolation
        pub fn interpolation(mut self, interpolation: $crate::core::imgproc::Interpolation) -> Self {
            self.resize.interpolation = interpolation;
            self
        }
    };
}

/// Adds a `distance` setter for a config with a `distance` field.
macro_rules! distance_setter {
    () => {
        /// Override the metric used by `compare`
        pub fn distance(mut self, metric: $crate::core::similarity::Metric) -> Self {
            self.distance = Some(metric);
            self
        }
    };
}

pub(crate) use {distance_setter, resize_setters};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn zero_dimension_is_rejected() {
        let options = ResizeOptions::new(0, 8, Interpolation::Bilinear);
        assert_eq!(
            options.validate(),
            Err(ConfigError::InvalidSize { width: 0, height: 8 })
        );
        assert!(ResizeOptions::new(8, 8, Interpolation::Bicubic).validate().is_ok());
    }

    #[test]
    fn apply_gray_resizes_and_converts() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([255, 255, 255])));
        let gray = ResizeOptions::new(9, 8, Interpolation::Bilinear)
            .apply_gray(&img)
            .unwrap();
        assert_eq!(gray.dimensions(), (9, 8));
        assert!(gray.pixels().all(|p| *p == Luma([255])));
    }

    #[test]
    fn kernel_validation() {
        assert!(validate_kernel(7, 1.0).is_ok());
        assert!(validate_kernel(0, 1.5).is_ok());
        assert_eq!(validate_kernel(4, 1.0), Err(ConfigError::InvalidKernelSize(4)));
        assert_eq!(validate_kernel(0, 0.0), Err(ConfigError::InvalidKernelSize(0)));
        assert_eq!(validate_kernel(3, -1.0), Err(ConfigError::InvalidSigma(-1.0)));
    }
}
