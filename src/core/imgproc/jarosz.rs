//! Iterated box filtering (Jarosz) used to smooth before downsampling.

use super::Matrix;

/// Sliding mean of full width `2 * half_window + 1`.
///
/// The first window is seeded with `half_window + 1` copies of `input[0]`.
/// After that, samples entering or leaving past either end count as zero.
fn box_1d(input: &[f32], output: &mut [f32], half_window: usize) {
    let n = input.len();
    if n == 0 {
        return;
    }
    let at = |i: isize| {
        if i < 0 || i >= n as isize {
            0.0
        } else {
            input[i as usize]
        }
    };
    let width = (2 * half_window + 1) as f32;
    let w = half_window as isize;

    let mut sum = input[0] * half_window as f32 + input[0];
    for k in 1..=w {
        sum += at(k);
    }
    output[0] = sum / width;

    for i in 1..n as isize {
        sum += at(i + w) - at(i - w - 1);
        output[i as usize] = sum / width;
    }
}

/// Applies the box filter `reps` times along rows, then `reps` times along
/// columns, in place.
pub fn box_filter(matrix: &mut Matrix<f32>, half_window: usize, reps: usize) {
    let (rows, cols) = (matrix.rows(), matrix.cols());
    if rows == 0 || cols == 0 {
        return;
    }

    let mut line = vec![0f32; rows.max(cols)];
    for _ in 0..reps {
        for r in 0..rows {
            let row = matrix.row_mut(r);
            box_1d(row, &mut line[..cols], half_window);
            row.copy_from_slice(&line[..cols]);
        }
    }

    let mut column = vec![0f32; rows];
    for _ in 0..reps {
        for c in 0..cols {
            for r in 0..rows {
                column[r] = matrix[(r, c)];
            }
            box_1d(&column, &mut line[..rows], half_window);
            for r in 0..rows {
                matrix[(r, c)] = line[r];
            }
        }
    }
}
