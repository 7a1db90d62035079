//! Image resizing with selectable interpolation.
//!
//! Convolution kernels run through `fast_image_resize`, which widens kernel
//! support when shrinking so every source pixel contributes. `BilinearExact`
//! is the fixed two-tap bilinear interpolation: it samples only the four
//! pixels around each target point, at any scale, so it is resampled here.

use super::{ensure_not_empty, image_from_raw};
use crate::error::{ConfigError, HashError};
use fast_image_resize::{images::Image, Filter, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Interpolation used when resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Interpolation {
    NearestNeighbor = 0,
    #[default]
    Bilinear = 1,
    /// Catmull-Rom cubic
    Bicubic = 2,
    /// Mitchell-Netravali cubic with B = C = 1/3
    MitchellNetravali = 3,
    Lanczos2 = 4,
    Lanczos3 = 5,
    /// Two-tap bilinear without kernel widening
    BilinearExact = 6,
}

impl Interpolation {
    pub const ALL: [Interpolation; 7] = [
        Interpolation::NearestNeighbor,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
        Interpolation::MitchellNetravali,
        Interpolation::Lanczos2,
        Interpolation::Lanczos3,
        Interpolation::BilinearExact,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Interpolation::NearestNeighbor => "NearestNeighbor",
            Interpolation::Bilinear => "Bilinear",
            Interpolation::Bicubic => "Bicubic",
            Interpolation::MitchellNetravali => "MitchellNetravali",
            Interpolation::Lanczos2 => "Lanczos2",
            Interpolation::Lanczos3 => "Lanczos3",
            Interpolation::BilinearExact => "BilinearExact",
        }
    }

    /// The `fast_image_resize` algorithm, or `None` for `BilinearExact`.
    fn resize_alg(self) -> Result<Option<ResizeAlg>, HashError> {
        let filter = match self {
            Interpolation::NearestNeighbor => return Ok(Some(ResizeAlg::Nearest)),
            Interpolation::BilinearExact => return Ok(None),
            Interpolation::Bilinear => FilterType::Bilinear,
            Interpolation::Bicubic => FilterType::CatmullRom,
            Interpolation::MitchellNetravali => FilterType::Mitchell,
            Interpolation::Lanczos3 => FilterType::Lanczos3,
            Interpolation::Lanczos2 => FilterType::Custom(
                Filter::new("Lanczos2", lanczos2, 2.0)
                    .map_err(|e| HashError::ResizeError(format!("Lanczos2 filter: {:?}", e)))?,
            ),
        };
        Ok(Some(ResizeAlg::Convolution(filter)))
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interpolation::ALL
            .into_iter()
            .find(|i| i.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidInterpolation(s.to_string()))
    }
}

impl TryFrom<u8> for Interpolation {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Interpolation::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ConfigError::InvalidInterpolation(value.to_string()))
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

fn lanczos2(x: f64) -> f64 {
    let x = x.abs();
    if x < 2.0 {
        sinc(x) * sinc(x / 2.0)
    } else {
        0.0
    }
}

/// Resizes interleaved 8-bit data through `fast_image_resize`.
fn convolve_resize(
    src: Vec<u8>,
    (src_w, src_h): (u32, u32),
    (dst_w, dst_h): (u32, u32),
    pixel_type: PixelType,
    algorithm: ResizeAlg,
) -> Result<Vec<u8>, HashError> {
    let src_image = Image::from_vec_u8(src_w, src_h, src, pixel_type)
        .map_err(|e| HashError::ResizeError(format!("invalid source image: {}", e)))?;
    let mut dst_image = Image::new(dst_w, dst_h, pixel_type);

    let options = ResizeOptions::new().resize_alg(algorithm).use_alpha(false);
    Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| HashError::ResizeError(e.to_string()))?;

    Ok(dst_image.into_vec())
}

/// Source position and blend weight for each target index along one axis.
fn exact_taps(src_len: usize, dst_len: usize) -> Vec<(usize, usize, f32)> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len - 1;
    (0..dst_len)
        .map(|i| {
            let pos = ((i as f32 + 0.5) * scale - 0.5).clamp(0.0, last as f32);
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(last);
            (lo, hi, pos - lo as f32)
        })
        .collect()
}

/// Two-tap bilinear interpolation of interleaved 8-bit data.
fn bilinear_exact(
    src: &[u8],
    (src_w, src_h): (usize, usize),
    (dst_w, dst_h): (usize, usize),
    channels: usize,
) -> Vec<u8> {
    let xs = exact_taps(src_w, dst_w);
    let ys = exact_taps(src_h, dst_h);
    let at = |x: usize, y: usize, c: usize| src[(y * src_w + x) * channels + c] as f32;

    let mut out = Vec::with_capacity(dst_w * dst_h * channels);
    for &(y0, y1, fy) in &ys {
        for &(x0, x1, fx) in &xs {
            for c in 0..channels {
                let top = at(x0, y0, c) * (1.0 - fx) + at(x1, y0, c) * fx;
                let bottom = at(x0, y1, c) * (1.0 - fx) + at(x1, y1, c) * fx;
                let value = top * (1.0 - fy) + bottom * fy;
                out.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }
    }
    out
}

fn resample(
    src: &[u8],
    src_size: (u32, u32),
    dst_size: (u32, u32),
    pixel_type: PixelType,
    interpolation: Interpolation,
) -> Result<Vec<u8>, HashError> {
    if src_size == dst_size {
        return Ok(src.to_vec());
    }
    match interpolation.resize_alg()? {
        Some(algorithm) => convolve_resize(src.to_vec(), src_size, dst_size, pixel_type, algorithm),
        None => {
            let channels = if matches!(pixel_type, PixelType::U8) { 1 } else { 4 };
            Ok(bilinear_exact(
                src,
                (src_size.0 as usize, src_size.1 as usize),
                (dst_size.0 as usize, dst_size.1 as usize),
                channels,
            ))
        }
    }
}

/// Resizes a grayscale image.
pub fn resize_gray(
    img: &GrayImage,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> Result<GrayImage, HashError> {
    ensure_not_empty(img.width(), img.height())?;
    ensure_not_empty(width, height)?;
    let data = resample(
        img.as_raw(),
        img.dimensions(),
        (width, height),
        PixelType::U8,
        interpolation,
    )?;
    Ok(image_from_raw(width, height, &data))
}

fn resize_rgba(
    img: &RgbaImage,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> Result<RgbaImage, HashError> {
    ensure_not_empty(img.width(), img.height())?;
    ensure_not_empty(width, height)?;
    let data = resample(
        img.as_raw(),
        img.dimensions(),
        (width, height),
        PixelType::U8x4,
        interpolation,
    )?;
    Ok(image_from_raw(width, height, &data))
}

/// Resizes an image to exactly `width x height`.
///
/// Grayscale inputs stay grayscale; every other input comes back as RGBA.
pub fn resize(
    img: &DynamicImage,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> Result<DynamicImage, HashError> {
    match img {
        DynamicImage::ImageLuma8(gray) => {
            resize_gray(gray, width, height, interpolation).map(DynamicImage::ImageLuma8)
        }
        DynamicImage::ImageLuma16(_) => {
            resize_gray(&img.to_luma8(), width, height, interpolation)
                .map(DynamicImage::ImageLuma8)
        }
        _ => resize_rgba(&img.to_rgba8(), width, height, interpolation)
            .map(DynamicImage::ImageRgba8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 3) % 256) as u8]))
    }

    #[test]
    fn produces_requested_dimensions() {
        let img = gradient(100, 60);
        for interpolation in Interpolation::ALL {
            let out = resize_gray(&img, 9, 8, interpolation).unwrap();
            assert_eq!(out.dimensions(), (9, 8), "{}", interpolation);
        }
    }

    #[test]
    fn same_size_is_identity() {
        let img = gradient(16, 16);
        let out = resize_gray(&img, 16, 16, Interpolation::Lanczos3).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn constant_image_stays_constant() {
        let img = GrayImage::from_pixel(37, 23, Luma([200]));
        for interpolation in Interpolation::ALL {
            let out = resize_gray(&img, 64, 11, interpolation).unwrap();
            assert!(
                out.pixels().all(|p| p[0].abs_diff(200) <= 1),
                "{}",
                interpolation
            );
        }
    }

    #[test]
    fn color_input_becomes_rgba() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([10, 20, 30])));
        for interpolation in Interpolation::ALL {
            let out = resize(&img, 4, 4, interpolation).unwrap();
            assert!(matches!(out, DynamicImage::ImageRgba8(_)));
            let [r, g, b, a] = out.to_rgba8().get_pixel(2, 2).0;
            assert!(r.abs_diff(10) <= 1 && g.abs_diff(20) <= 1 && b.abs_diff(30) <= 1);
            assert!(a >= 254, "{}", interpolation);
        }
    }

    #[test]
    fn gray_input_stays_gray() {
        let img = DynamicImage::ImageLuma8(gradient(10, 10));
        let out = resize(&img, 5, 5, Interpolation::Bicubic).unwrap();
        assert!(matches!(out, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = GrayImage::new(0, 0);
        assert!(matches!(
            resize_gray(&img, 8, 8, Interpolation::Bilinear),
            Err(HashError::ImageIsNil)
        ));
    }

    #[test]
    fn lanczos2_kernel_shape() {
        assert_eq!(lanczos2(0.0), 1.0);
        assert!(lanczos2(1.0).abs() < 1e-12);
        assert!(lanczos2(-1.0).abs() < 1e-12);
        assert_eq!(lanczos2(2.0), 0.0);
        assert!(lanczos2(0.5) > 0.5);
    }

    #[test]
    fn bilinear_exact_samples_only_neighbours() {
        // a single bright column; halving picks the pair around each target
        let img = GrayImage::from_fn(8, 1, |x, _| Luma([if x == 5 { 200 } else { 0 }]));
        let out = resize_gray(&img, 4, 1, Interpolation::BilinearExact).unwrap();
        // targets sit at 0.5, 2.5, 4.5 and 6.5; only 4.5 touches column 5
        assert_eq!(out.as_raw(), &vec![0, 0, 100, 0]);

        let widened = resize_gray(&img, 4, 1, Interpolation::Bilinear).unwrap();
        assert!(widened.as_raw().iter().filter(|&&v| v > 0).count() >= 2);
    }

    #[test]
    fn parses_names_and_integers() {
        assert_eq!(
            "lanczos3".parse::<Interpolation>().unwrap(),
            Interpolation::Lanczos3
        );
        assert_eq!(Interpolation::try_from(6).unwrap(), Interpolation::BilinearExact);
        assert!(matches!(
            Interpolation::try_from(7),
            Err(ConfigError::InvalidInterpolation(_))
        ));
        assert!("Sinc".parse::<Interpolation>().is_err());
        assert_eq!(Interpolation::MitchellNetravali.to_string(), "MitchellNetravali");
    }
}
