//! Spatial image moments up to third order and Hu invariants.

use image::{ImageBuffer, Pixel};

/// Raw, central and normalized central moments of one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
    pub m20: f64,
    pub m11: f64,
    pub m02: f64,
    pub m30: f64,
    pub m21: f64,
    pub m12: f64,
    pub m03: f64,

    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
    pub mu30: f64,
    pub mu21: f64,
    pub mu12: f64,
    pub mu03: f64,

    pub nu20: f64,
    pub nu11: f64,
    pub nu02: f64,
    pub nu30: f64,
    pub nu21: f64,
    pub nu12: f64,
    pub nu03: f64,
}

impl Moments {
    /// Derives central and normalized moments from accumulated raw moments.
    fn from_raw(mut m: Moments) -> Moments {
        if m.m00.abs() <= f64::EPSILON {
            return m;
        }
        let cx = m.m10 / m.m00;
        let cy = m.m01 / m.m00;

        m.mu20 = m.m20 - m.m10 * cx;
        m.mu11 = m.m11 - m.m10 * cy;
        m.mu02 = m.m02 - m.m01 * cy;
        m.mu30 = m.m30 - cx * (3.0 * m.mu20 + cx * m.m10);
        m.mu21 = m.m21 - cx * (2.0 * m.mu11 + cx * m.m01) - cy * m.mu20;
        m.mu12 = m.m12 - cy * (2.0 * m.mu11 + cy * m.m10) - cx * m.mu02;
        m.mu03 = m.m03 - cy * (3.0 * m.mu02 + cy * m.m01);

        let inv_m00 = 1.0 / m.m00;
        let s2 = inv_m00 * inv_m00;
        let s3 = s2 * inv_m00.sqrt();

        m.nu20 = m.mu20 * s2;
        m.nu11 = m.mu11 * s2;
        m.nu02 = m.mu02 * s2;
        m.nu30 = m.mu30 * s3;
        m.nu21 = m.mu21 * s3;
        m.nu12 = m.mu12 * s3;
        m.nu03 = m.mu03 * s3;
        m
    }

    /// The seven Hu invariants.
    pub fn hu(&self) -> [f64; 7] {
        let (nu20, nu11, nu02) = (self.nu20, self.nu11, self.nu02);
        let (nu30, nu21, nu12, nu03) = (self.nu30, self.nu21, self.nu12, self.nu03);

        let mut t0 = nu30 + nu12;
        let mut t1 = nu21 + nu03;
        let q0 = t0 * t0;
        let q1 = t1 * t1;
        let n4 = 4.0 * nu11;
        let s = nu20 + nu02;
        let d = nu20 - nu02;

        let mut hu = [0.0; 7];
        hu[0] = s;
        hu[1] = d * d + n4 * nu11;
        hu[3] = q0 + q1;
        hu[5] = d * (q0 - q1) + n4 * t0 * t1;

        t0 *= q0 - 3.0 * q1;
        t1 *= 3.0 * q0 - q1;

        let q0 = nu30 - 3.0 * nu12;
        let q1 = 3.0 * nu21 - nu03;

        hu[2] = q0 * q0 + q1 * q1;
        hu[4] = q0 * t0 + q1 * t1;
        hu[6] = q1 * t0 - q0 * t1;
        hu
    }
}

/// Moments of every channel of an 8-bit image, one record per channel.
pub fn image_moments<P>(img: &ImageBuffer<P, Vec<u8>>) -> Vec<Moments>
where
    P: Pixel<Subpixel = u8>,
{
    let channels = P::CHANNEL_COUNT as usize;
    let width = img.width() as usize;
    let mut raw = vec![Moments::default(); channels];

    for (i, px) in img.as_raw().chunks_exact(channels).enumerate() {
        let x = (i % width) as f64;
        let y = (i / width) as f64;
        let (xx, yy) = (x * x, y * y);
        for (m, &value) in raw.iter_mut().zip(px) {
            let v = value as f64;
            m.m00 += v;
            m.m10 += x * v;
            m.m01 += y * v;
            m.m20 += xx * v;
            m.m11 += x * y * v;
            m.m02 += yy * v;
            m.m30 += xx * x * v;
            m.m21 += xx * y * v;
            m.m12 += x * yy * v;
            m.m03 += yy * y * v;
        }
    }

    raw.into_iter().map(Moments::from_raw).collect()
}

/// Hu invariants for each record, flattened in record order.
pub fn hu_moments(moments: &[Moments]) -> Vec<f64> {
    moments.iter().flat_map(|m| m.hu()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn square(size: u32, x0: u32, y0: u32, side: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            let inside = x >= x0 && x < x0 + side && y >= y0 && y < y0 + side;
            Luma([if inside { 255 } else { 0 }])
        })
    }

    #[test]
    fn centroid_follows_mass() {
        let m = image_moments(&square(16, 4, 6, 4))[0];
        assert_eq!(m.m00, 255.0 * 16.0);
        assert!((m.m10 / m.m00 - 5.5).abs() < 1e-12);
        assert!((m.m01 / m.m00 - 7.5).abs() < 1e-12);
    }

    #[test]
    fn central_moments_are_translation_invariant() {
        let a = image_moments(&square(32, 2, 3, 6))[0];
        let b = image_moments(&square(32, 20, 11, 6))[0];
        assert!((a.mu20 - b.mu20).abs() < 1e-6);
        assert!((a.mu02 - b.mu02).abs() < 1e-6);
        assert!((a.nu11 - b.nu11).abs() < 1e-9);
        for (x, y) in a.hu().iter().zip(b.hu().iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn hu_invariants_survive_rotation() {
        let img = GrayImage::from_fn(24, 24, |x, y| {
            Luma([if x > 4 && x < 18 && y > 8 && y < 12 || (x > 4 && x < 8 && y < 20) { 200 } else { 0 }])
        });
        let rotated = image::imageops::rotate90(&img);
        let a = image_moments(&img)[0].hu();
        let b = image_moments(&rotated)[0].hu();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() <= 1e-9 + 1e-6 * x.abs(), "{} vs {}", x, y);
        }
    }

    #[test]
    fn empty_channel_has_zero_moments() {
        let m = image_moments(&GrayImage::new(4, 4))[0];
        assert_eq!(m, Moments::default());
        assert_eq!(m.hu(), [0.0; 7]);
    }

    #[test]
    fn flattens_per_channel() {
        let img = image::RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3]));
        let moments = image_moments(&img);
        assert_eq!(moments.len(), 3);
        assert_eq!(moments[2].m00, 27.0);
        assert_eq!(hu_moments(&moments).len(), 21);
    }
}
