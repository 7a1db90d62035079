//! Separable Gaussian blur in integer fixed point.

use super::{ensure_not_empty, image_from_raw, reflect101};
use crate::error::HashError;
use image::{ImageBuffer, Pixel};

/// Precomputed kernels for sizes 1, 3, 5 and 7 when no sigma is given.
const SMALL_GAUSSIAN_TAB: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
    ],
];

/// Kernel coefficients are scaled by 2^8 before filtering.
const COEFF_BITS: u32 = 8;

/// Builds a normalized 1-D Gaussian kernel.
///
/// `ksize == 0` derives the size from sigma as `2 * round(3 * sigma) + 1`;
/// `sigma <= 0` derives sigma from the size.
pub fn gaussian_kernel(ksize: u32, sigma: f64) -> Vec<f64> {
    let size = if ksize == 0 && sigma > 0.0 {
        2 * (3.0 * sigma).round() as usize + 1
    } else {
        ksize as usize
    };
    if size == 0 {
        return vec![1.0];
    }

    if sigma <= 0.0 && size % 2 == 1 && size <= 7 {
        return SMALL_GAUSSIAN_TAB[size / 2].to_vec();
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let scale = -0.5 / (sigma * sigma);
    let center = (size as f64 - 1.0) / 2.0;

    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// Blurs an 8-bit image with a separable Gaussian, row pass then column pass.
///
/// Borders use reflection-101. With `ksize == 0` and `sigma <= 0` there is no
/// kernel to apply and the image is returned unchanged.
pub fn gaussian_blur<P>(
    img: &ImageBuffer<P, Vec<u8>>,
    ksize: u32,
    sigma: f64,
) -> Result<ImageBuffer<P, Vec<u8>>, HashError>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = img.dimensions();
    ensure_not_empty(width, height)?;
    if ksize == 0 && sigma <= 0.0 {
        return Ok(img.clone());
    }

    let mut kernel: Vec<i32> = gaussian_kernel(ksize, sigma)
        .iter()
        .map(|k| (k * (1 << COEFF_BITS) as f64).round() as i32)
        .collect();
    let radius = (kernel.len() / 2) as isize;
    // rounding residue goes to the centre tap so the taps sum to exactly 2^8
    let residue = (1 << COEFF_BITS) - kernel.iter().sum::<i32>();
    kernel[radius as usize] += residue;

    let channels = P::CHANNEL_COUNT as usize;
    let (w, h) = (width as usize, height as usize);
    let src = img.as_raw();

    let mut rows = vec![0i32; w * h * channels];
    for y in 0..h {
        let line = &src[y * w * channels..(y + 1) * w * channels];
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0i32;
                for (k, &coeff) in kernel.iter().enumerate() {
                    let sx = reflect101(x as isize + k as isize - radius, w);
                    acc += coeff * line[sx * channels + c] as i32;
                }
                rows[(y * w + x) * channels + c] = acc;
            }
        }
    }

    let round = 1 << (2 * COEFF_BITS - 1);
    let mut out = vec![0u8; w * h * channels];
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let mut acc = 0i32;
                for (k, &coeff) in kernel.iter().enumerate() {
                    let sy = reflect101(y as isize + k as isize - radius, h);
                    acc += coeff * rows[(sy * w + x) * channels + c];
                }
                out[(y * w + x) * channels + c] =
                    ((acc + round) >> (2 * COEFF_BITS)).clamp(0, 255) as u8;
            }
        }
    }

    Ok(image_from_raw(width, height, &out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn small_kernels_come_from_table() {
        assert_eq!(gaussian_kernel(3, 0.0), vec![0.25, 0.5, 0.25]);
        assert_eq!(gaussian_kernel(1, 0.0), vec![1.0]);
        assert_eq!(gaussian_kernel(7, 0.0).len(), 7);
    }

    #[test]
    fn size_derived_from_sigma() {
        assert_eq!(gaussian_kernel(0, 1.0).len(), 7);
        assert_eq!(gaussian_kernel(0, 2.0).len(), 13);
    }

    #[test]
    fn kernels_are_normalized_and_symmetric() {
        for (size, sigma) in [(9, 0.0), (5, 1.5), (0, 0.8), (11, 2.0)] {
            let kernel = gaussian_kernel(size, sigma);
            let sum: f64 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
            let n = kernel.len();
            for i in 0..n / 2 {
                assert!((kernel[i] - kernel[n - 1 - i]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn constant_image_is_unchanged() {
        let img = GrayImage::from_pixel(12, 9, Luma([77]));
        let out = gaussian_blur(&img, 5, 1.2).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn blur_spreads_an_impulse() {
        let mut img = GrayImage::new(9, 9);
        img.put_pixel(4, 4, Luma([255]));
        let out = gaussian_blur(&img, 3, 0.0).unwrap();
        // [1/4, 1/2, 1/4] squared: centre 1/4, edges 1/8, corners 1/16
        assert_eq!(out.get_pixel(4, 4)[0], 64);
        assert_eq!(out.get_pixel(3, 4)[0], 32);
        assert_eq!(out.get_pixel(3, 3)[0], 16);
        assert_eq!(out.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn blur_handles_color_channels_independently() {
        let img = RgbImage::from_pixel(6, 6, Rgb([10, 100, 250]));
        let out = gaussian_blur(&img, 0, 1.0).unwrap();
        assert!(out.pixels().all(|p| p.0 == [10, 100, 250]));
    }

    #[test]
    fn no_kernel_is_identity() {
        let img = GrayImage::from_fn(5, 5, |x, y| Luma([(x * y) as u8]));
        assert_eq!(gaussian_blur(&img, 0, 0.0).unwrap(), img);
    }
}
