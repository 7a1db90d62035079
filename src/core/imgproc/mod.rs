//! # Image Processing Module
//!
//! The primitive operations every hasher is assembled from.
//!
//! ## Buffers
//! - 8-bit images are `image` crate buffers (`GrayImage`, `RgbImage`, `RgbaImage`)
//! - Working float buffers are row-major [`Matrix`] values
//!
//! All operations return fresh buffers except the Haar DWT and the Jarosz box
//! filter, which work in place.

pub mod blur;
pub mod border;
pub mod color;
pub mod convolve;
pub mod dct;
pub mod dwt;
pub mod equalize;
pub mod jarosz;
mod matrix;
pub mod moments;
pub mod resize;
pub mod stats;

pub use blur::{gaussian_blur, gaussian_kernel};
pub use border::reflect101;
pub use color::{grayscale, hsv, rgb_to_ycbcr, ycrcb};
pub use convolve::convolve;
pub use dct::{dct1d, dct2d};
pub use dwt::haar2d;
pub use equalize::equalize_histogram;
pub use jarosz::box_filter;
pub use matrix::Matrix;
pub use moments::{hu_moments, image_moments, Moments};
pub use resize::{resize, resize_gray, Interpolation};
pub use stats::{mean, median, median_of};

use crate::error::HashError;
use image::{ImageBuffer, Pixel};

/// Fails with [`HashError::ImageIsNil`] when either dimension is zero.
pub(crate) fn ensure_not_empty(width: u32, height: u32) -> Result<(), HashError> {
    if width == 0 || height == 0 {
        return Err(HashError::ImageIsNil);
    }
    Ok(())
}

/// Builds an 8-bit image from interleaved channel data of the right length.
pub(crate) fn image_from_raw<P>(width: u32, height: u32, data: &[u8]) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let mut out = ImageBuffer::new(width, height);
    out.copy_from_slice(data);
    out
}
