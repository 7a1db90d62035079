//! Dense 2-D filtering of float matrices.

use super::{reflect101, Matrix};

/// Correlates `src` with `kernel` centred on each element, reflection-101
/// borders. The output has the shape of `src`.
pub fn convolve(src: &Matrix<f64>, kernel: &Matrix<f64>) -> Matrix<f64> {
    let (rows, cols) = (src.rows(), src.cols());
    let (k_rows, k_cols) = (kernel.rows(), kernel.cols());
    let (r_off, c_off) = ((k_rows / 2) as isize, (k_cols / 2) as isize);

    // reflected source indices for every (output, tap) pair along each axis
    let row_index: Vec<usize> = (0..rows)
        .flat_map(|r| (0..k_rows).map(move |kr| reflect101(r as isize + kr as isize - r_off, rows)))
        .collect();
    let col_index: Vec<usize> = (0..cols)
        .flat_map(|c| (0..k_cols).map(move |kc| reflect101(c as isize + kc as isize - c_off, cols)))
        .collect();

    Matrix::from_fn(rows, cols, |r, c| {
        let mut acc = 0.0;
        for kr in 0..k_rows {
            let sr = row_index[r * k_rows + kr];
            let src_row = src.row(sr);
            let k_row = kernel.row(kr);
            for kc in 0..k_cols {
                acc += k_row[kc] * src_row[col_index[c * k_cols + kc]];
            }
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_kernel_copies() {
        let src = Matrix::from_fn(5, 4, |r, c| (r * 4 + c) as f64);
        let kernel = Matrix::from_vec(3, 3, vec![0., 0., 0., 0., 1., 0., 0., 0., 0.]).unwrap();
        assert_eq!(convolve(&src, &kernel), src);
    }

    #[test]
    fn shift_kernel_reflects_at_border() {
        let src = Matrix::from_vec(1, 4, vec![1., 2., 3., 4.]).unwrap();
        // picks the left neighbour
        let kernel = Matrix::from_vec(1, 3, vec![1., 0., 0.]).unwrap();
        let out = convolve(&src, &kernel);
        assert_eq!(out.as_slice(), &[2., 1., 2., 3.]);
    }

    #[test]
    fn box_kernel_sums_neighbourhood() {
        let src = Matrix::filled(4, 4, 1.0);
        let kernel = Matrix::filled(3, 3, 1.0);
        let out = convolve(&src, &kernel);
        assert!(out.as_slice().iter().all(|&v| (v - 9.0).abs() < 1e-12));
    }
}
