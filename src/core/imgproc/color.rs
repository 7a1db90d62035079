//! Color space conversions on 8-bit images.
//!
//! All conversions are integer fixed-point so results are bit-exact across
//! platforms.

use super::ensure_not_empty;
use crate::error::HashError;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, RgbaImage};

/// Fixed-point shift for the YCrCb conversion.
const YCRCB_SHIFT: i32 = 14;
const YCRCB_DELTA: i32 = 128 << YCRCB_SHIFT;
const R2Y: i32 = 4899;
const G2Y: i32 = 9617;
const B2Y: i32 = 1868;
const CR_COEFF: i32 = 11682;
const CB_COEFF: i32 = 9241;

/// Fixed-point shift for the HSV conversion.
const HSV_SHIFT: i32 = 12;

/// `round((255 << 12) / v)`, indexed by the channel maximum `v`.
const SDIV: [i32; 256] = build_sdiv();

/// `round((180 << 12) / (6 * d))`, indexed by the channel spread `d`.
const HDIV180: [i32; 256] = build_hdiv180();

const fn build_sdiv() -> [i32; 256] {
    let mut table = [0i32; 256];
    let mut i = 1;
    while i < 256 {
        let v = i as i32;
        table[i] = ((255 << HSV_SHIFT) + v / 2) / v;
        i += 1;
    }
    table
}

const fn build_hdiv180() -> [i32; 256] {
    let mut table = [0i32; 256];
    let mut i = 1;
    while i < 256 {
        let d = 6 * i as i32;
        table[i] = ((180 << HSV_SHIFT) + d / 2) / d;
        i += 1;
    }
    table
}

fn saturate_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

fn descale(x: i32, n: i32) -> i32 {
    (x + (1 << (n - 1))) >> n
}

/// Luma of an RGB triple, weights 0.299/0.587/0.114 in 16-bit fixed point.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    ((19595 * r as u32 + 38470 * g as u32 + 7471 * b as u32 + (1 << 15)) >> 16) as u8
}

/// Converts any image to 8-bit grayscale.
pub fn grayscale(img: &DynamicImage) -> Result<GrayImage, HashError> {
    ensure_not_empty(img.width(), img.height())?;
    if let DynamicImage::ImageLuma8(gray) = img {
        return Ok(gray.clone());
    }

    let rgba = img.to_rgba8();
    let mut out = GrayImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        *dst = Luma([luminance(src[0], src[1], src[2])]);
    }
    Ok(out)
}

/// Converts RGB(A) to YCrCb with channels stored in `[Y, Cr, Cb]` order.
pub fn ycrcb(img: &RgbaImage) -> Result<RgbImage, HashError> {
    ensure_not_empty(img.width(), img.height())?;
    let mut out = RgbImage::new(img.width(), img.height());
    for (dst, src) in out.pixels_mut().zip(img.pixels()) {
        let (r, g, b) = (src[0] as i32, src[1] as i32, src[2] as i32);
        let y = descale(r * R2Y + g * G2Y + b * B2Y, YCRCB_SHIFT);
        let cr = descale((r - y) * CR_COEFF + YCRCB_DELTA, YCRCB_SHIFT);
        let cb = descale((b - y) * CB_COEFF + YCRCB_DELTA, YCRCB_SHIFT);
        *dst = Rgb([saturate_u8(y), saturate_u8(cr), saturate_u8(cb)]);
    }
    Ok(out)
}

/// JFIF RGB to `(Y, Cb, Cr)` for a single pixel.
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let y = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16;

    let cb = -11056 * r - 21712 * g + 32768 * b + (257 << 15);
    let cb = if (cb as u32) & 0xff00_0000 == 0 {
        cb >> 16
    } else {
        !(cb >> 31)
    };

    let cr = 32768 * r - 27440 * g - 5328 * b + (257 << 15);
    let cr = if (cr as u32) & 0xff00_0000 == 0 {
        cr >> 16
    } else {
        !(cr >> 31)
    };

    (y as u8, cb as u8, cr as u8)
}

/// Converts RGB(A) to HSV with hue in `[0, 180)`, channels `[H, S, V]`.
pub fn hsv(img: &RgbaImage) -> Result<RgbImage, HashError> {
    ensure_not_empty(img.width(), img.height())?;
    let round = 1 << (HSV_SHIFT - 1);
    let mut out = RgbImage::new(img.width(), img.height());
    for (dst, src) in out.pixels_mut().zip(img.pixels()) {
        let (r, g, b) = (src[0] as i32, src[1] as i32, src[2] as i32);
        let v = r.max(g).max(b);
        let diff = v - r.min(g).min(b);
        let vr: i32 = if v == r { -1 } else { 0 };
        let vg: i32 = if v == g { -1 } else { 0 };

        let s = (diff * SDIV[v as usize] + round) >> HSV_SHIFT;
        let h = (vr & (g - b))
            + (!vr & ((vg & (b - r + 2 * diff)) + (!vg & (r - g + 4 * diff))));
        let mut h = (h * HDIV180[diff as usize] + round) >> HSV_SHIFT;
        if h < 0 {
            h += 180;
        }

        *dst = Rgb([saturate_u8(h), saturate_u8(s), saturate_u8(v)]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn single(r: u8, g: u8, b: u8) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba([r, g, b, 255]))
    }

    #[test]
    fn luminance_of_extremes() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(255, 0, 0), 76);
    }

    #[test]
    fn grayscale_keeps_gray_input() {
        let gray = GrayImage::from_fn(4, 4, |x, _| Luma([x as u8 * 10]));
        let out = grayscale(&DynamicImage::ImageLuma8(gray.clone())).unwrap();
        assert_eq!(out, gray);
    }

    #[test]
    fn grayscale_rejects_empty() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 3));
        assert!(matches!(grayscale(&img), Err(HashError::ImageIsNil)));
    }

    #[test]
    fn ycrcb_of_gray_is_neutral() {
        let out = ycrcb(&single(100, 100, 100)).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [100, 128, 128]);
    }

    #[test]
    fn ycbcr_matches_jfif_reference() {
        assert_eq!(rgb_to_ycbcr(0, 0, 0), (0, 128, 128));
        assert_eq!(rgb_to_ycbcr(255, 255, 255), (255, 128, 128));
        let (y, cb, cr) = rgb_to_ycbcr(255, 0, 0);
        assert_eq!(y, 76);
        assert!(cb < 128);
        assert_eq!(cr, 255);
    }

    #[test]
    fn hsv_primary_hues() {
        assert_eq!(hsv(&single(255, 0, 0)).unwrap().get_pixel(0, 0).0, [0, 255, 255]);
        assert_eq!(hsv(&single(0, 255, 0)).unwrap().get_pixel(0, 0).0, [60, 255, 255]);
        assert_eq!(hsv(&single(0, 0, 255)).unwrap().get_pixel(0, 0).0, [120, 255, 255]);
        assert_eq!(hsv(&single(0, 0, 0)).unwrap().get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn hsv_gray_has_no_saturation() {
        let px = hsv(&single(90, 90, 90)).unwrap().get_pixel(0, 0).0;
        assert_eq!(px, [0, 0, 90]);
    }

    #[test]
    fn lookup_tables_are_rounded_quotients() {
        assert_eq!(SDIV[0], 0);
        assert_eq!(SDIV[1], 255 << 12);
        assert_eq!(SDIV[255], 1 << 12);
        assert_eq!(HDIV180[1], 122880);
    }
}
