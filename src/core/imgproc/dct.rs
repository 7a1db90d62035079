//! Orthonormal DCT-II.
//!
//! `rustdct` computes the unscaled transform
//! `X[k] = sum x[i] * cos(pi * (2i + 1) * k / 2N)`; the `sqrt(1/N)` and
//! `sqrt(2/N)` factors are applied afterwards.

use super::Matrix;
use rustdct::{DctNum, DctPlanner};

/// Float types the transforms run on.
pub trait DctScalar: DctNum {
    fn scalar(value: f64) -> Self;
}

impl DctScalar for f32 {
    fn scalar(value: f64) -> Self {
        value as f32
    }
}

impl DctScalar for f64 {
    fn scalar(value: f64) -> Self {
        value
    }
}

/// Transforms every `len`-sized chunk of `data` in place.
fn dct_chunks<T: DctScalar>(data: &mut [T], len: usize) {
    if len == 0 {
        return;
    }
    let mut planner = DctPlanner::new();
    let dct = planner.plan_dct2(len);

    let dc_scale = T::scalar((1.0 / len as f64).sqrt());
    let ac_scale = T::scalar((2.0 / len as f64).sqrt());

    for chunk in data.chunks_exact_mut(len) {
        dct.process_dct2(chunk);
        chunk[0] = chunk[0] * dc_scale;
        for value in chunk[1..].iter_mut() {
            *value = *value * ac_scale;
        }
    }
}

/// 1-D orthonormal DCT-II in place.
pub fn dct1d<T: DctScalar>(values: &mut [T]) {
    let len = values.len();
    dct_chunks(values, len);
}

/// 2-D orthonormal DCT-II: rows, transpose, rows, transpose.
pub fn dct2d<T: DctScalar>(matrix: &Matrix<T>) -> Matrix<T> {
    if matrix.is_empty() {
        return matrix.clone();
    }
    let mut pass = matrix.clone();
    let cols = pass.cols();
    dct_chunks(pass.as_mut_slice(), cols);

    let mut pass = pass.transpose();
    let cols = pass.cols();
    dct_chunks(pass.as_mut_slice(), cols);

    pass.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(values: &[f64]) -> Vec<f64> {
        let n = values.len() as f64;
        (0..values.len())
            .map(|k| {
                let c = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
                c * values
                    .iter()
                    .enumerate()
                    .map(|(i, x)| {
                        x * (std::f64::consts::PI * (2.0 * i as f64 + 1.0) * k as f64 / (2.0 * n))
                            .cos()
                    })
                    .sum::<f64>()
            })
            .collect()
    }

    #[test]
    fn matches_reference_formula() {
        let input = vec![1.0, 2.0, 3.0, 5.0, 8.0, 13.0, 21.0];
        let mut values = input.clone();
        dct1d(&mut values);
        for (a, b) in values.iter().zip(naive(&input)) {
            assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    #[test]
    fn constant_signal_has_only_dc() {
        let mut values = vec![2.0f32; 8];
        dct1d(&mut values);
        assert!((values[0] - 2.0 * 8f32.sqrt()).abs() < 1e-5);
        assert!(values[1..].iter().all(|v| v.abs() < 1e-5));
    }

    #[test]
    fn dc_of_8x8_block_is_eight_times_mean() {
        let m = Matrix::from_fn(8, 8, |r, c| (r * 8 + c) as f64);
        let mean = m.as_slice().iter().sum::<f64>() / 64.0;
        let out = dct2d(&m);
        assert!((out[(0, 0)] - 8.0 * mean).abs() < 1e-9);
    }

    #[test]
    fn transform_preserves_energy() {
        let m = Matrix::from_fn(6, 6, |r, c| ((r * 7 + c * 3) % 5) as f64 - 2.0);
        let out = dct2d(&m);
        let energy = |m: &Matrix<f64>| m.as_slice().iter().map(|v| v * v).sum::<f64>();
        assert!((energy(&m) - energy(&out)).abs() < 1e-9);
    }

    #[test]
    fn empty_input_is_untouched() {
        let mut values: Vec<f64> = Vec::new();
        dct1d(&mut values);
        assert!(values.is_empty());
    }
}
