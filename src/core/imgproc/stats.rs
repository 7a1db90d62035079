//! Pixel statistics used for thresholding.

use image::GrayImage;

/// Mean pixel value, `0.0` for an empty image.
pub fn mean(img: &GrayImage) -> f64 {
    let pixels = img.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    pixels.iter().map(|&p| p as u64).sum::<u64>() as f64 / pixels.len() as f64
}

/// Median pixel value; even counts average the two middle values.
pub fn median(img: &GrayImage) -> f64 {
    let pixels = img.as_raw();
    if pixels.is_empty() {
        return 0.0;
    }
    let mut histogram = [0usize; 256];
    for &p in pixels {
        histogram[p as usize] += 1;
    }

    let n = pixels.len();
    let lower = (n - 1) / 2;
    let upper = n / 2;
    let nth = |target: usize| {
        let mut seen = 0;
        for (value, &count) in histogram.iter().enumerate() {
            seen += count;
            if seen > target {
                return value as f64;
            }
        }
        255.0
    };
    (nth(lower) + nth(upper)) / 2.0
}

/// Median of a float slice; even counts average the two middle values.
pub fn median_of(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}
