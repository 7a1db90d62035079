//! In-place multi-level 2-D Haar wavelet decomposition.

use super::Matrix;

/// Decomposes `matrix` in place for `levels` levels.
///
/// Each level works on the current top-left region: rows first, storing
/// pairwise averages in the left half and half-differences in the right half,
/// then columns the same way. The next level repeats on the top-left quadrant,
/// so after `L` levels the LL band occupies the top-left `rows/2^L x cols/2^L`.
pub fn haar2d(matrix: &mut Matrix<f32>, levels: u32) {
    let mut rows = matrix.rows();
    let mut cols = matrix.cols();
    let mut scratch = vec![0f32; rows.max(cols)];

    for _ in 0..levels {
        if rows < 2 || cols < 2 {
            break;
        }
        let half_cols = cols / 2;
        let half_rows = rows / 2;

        for r in 0..rows {
            let row = matrix.row_mut(r);
            for j in 0..half_cols {
                let (a, b) = (row[2 * j], row[2 * j + 1]);
                scratch[j] = (a + b) / 2.0;
                scratch[half_cols + j] = (a - b) / 2.0;
            }
            row[..2 * half_cols].copy_from_slice(&scratch[..2 * half_cols]);
        }

        for c in 0..cols {
            for i in 0..half_rows {
                let (a, b) = (matrix[(2 * i, c)], matrix[(2 * i + 1, c)]);
                scratch[i] = (a + b) / 2.0;
                scratch[half_rows + i] = (a - b) / 2.0;
            }
            for i in 0..2 * half_rows {
                matrix[(i, c)] = scratch[i];
            }
        }

        rows = half_rows;
        cols = half_cols;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level_on_2x2() {
        let mut m = Matrix::from_vec(2, 2, vec![4.0, 2.0, 6.0, 0.0]).unwrap();
        haar2d(&mut m, 1);
        // rows: [3, 1], [3, 3]; columns: [3, 2] over [0, -1]
        assert_eq!(m.as_slice(), &[3.0, 2.0, 0.0, -1.0]);
    }

    #[test]
    fn ll_band_is_block_average() {
        let mut m = Matrix::from_fn(8, 8, |r, c| (r * 8 + c) as f32);
        let original = m.clone();
        haar2d(&mut m, 3);
        let mean = original.as_slice().iter().sum::<f32>() / 64.0;
        assert!((m[(0, 0)] - mean).abs() < 1e-4);
    }

    #[test]
    fn constant_matrix_has_no_detail() {
        let mut m = Matrix::filled(8, 8, 5.0f32);
        haar2d(&mut m, 2);
        for r in 0..8 {
            for c in 0..8 {
                let expected = if r < 2 && c < 2 { 5.0 } else { 0.0 };
                assert_eq!(m[(r, c)], expected);
            }
        }
    }

    #[test]
    fn empty_or_zero_levels_are_no_ops() {
        let mut empty = Matrix::<f32>::filled(0, 0, 0.0);
        haar2d(&mut empty, 3);
        assert!(empty.is_empty());

        let mut m = Matrix::from_fn(4, 4, |r, c| (r + c) as f32);
        let original = m.clone();
        haar2d(&mut m, 0);
        assert_eq!(m, original);
    }
}
