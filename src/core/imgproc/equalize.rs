//! Histogram equalization.

use super::ensure_not_empty;
use crate::error::HashError;
use image::GrayImage;

/// Spreads the intensity histogram of a grayscale image over `[0, 255]`.
///
/// The lowest occupied bin maps to 0; an image with a single intensity maps
/// every pixel to that intensity's bin index.
pub fn equalize_histogram(img: &GrayImage) -> Result<GrayImage, HashError> {
    ensure_not_empty(img.width(), img.height())?;

    let mut hist = [0u64; 256];
    for &p in img.as_raw() {
        hist[p as usize] += 1;
    }

    let total = img.as_raw().len() as u64;
    let first = hist.iter().position(|&count| count > 0).unwrap_or(0);

    let mut lut = [0u8; 256];
    if hist[first] == total {
        lut[first] = first as u8;
    } else {
        let scale = 255.0 / (total - hist[first]) as f64;
        let mut running = 0u64;
        for i in first + 1..256 {
            running += hist[i];
            lut[i] = (running as f64 * scale).round().clamp(0.0, 255.0) as u8;
        }
    }

    let mut out = img.clone();
    for p in out.iter_mut() {
        *p = lut[*p as usize];
    }
    Ok(out)
}
