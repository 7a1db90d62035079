//! Row-major working buffer for float pipelines.

use image::GrayImage;
use std::ops::{Index, IndexMut};

/// A dense `rows x cols` matrix stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// A matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Wraps `data`; returns `None` if its length is not `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Builds a matrix by evaluating `f(row, col)` for every element.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [T] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Element at `(row, col)` or `None` when out of range.
    pub fn get(&self, r: usize, c: usize) -> Option<T> {
        (r < self.rows && c < self.cols).then(|| self.data[r * self.cols + c])
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |r, c| self[(c, r)])
    }

    /// Copies the `rows x cols` block whose top-left corner is `(r0, c0)`.
    ///
    /// Panics if the block does not fit.
    pub fn crop(&self, r0: usize, c0: usize, rows: usize, cols: usize) -> Self {
        assert!(r0 + rows <= self.rows && c0 + cols <= self.cols);
        Self::from_fn(rows, cols, |r, c| self[(r0 + r, c0 + c)])
    }
}

impl Matrix<f32> {
    /// Casts an 8-bit grayscale image, `height` rows by `width` columns.
    pub fn from_gray(img: &GrayImage) -> Self {
        Self {
            rows: img.height() as usize,
            cols: img.width() as usize,
            data: img.as_raw().iter().map(|&p| p as f32).collect(),
        }
    }
}

impl Matrix<f64> {
    pub fn from_gray(img: &GrayImage) -> Self {
        Self {
            rows: img.height() as usize,
            cols: img.width() as usize,
            data: img.as_raw().iter().map(|&p| p as f64).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (r, c): (usize, usize)) -> &T {
        debug_assert!(r < self.rows && c < self.cols);
        &self.data[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        debug_assert!(r < self.rows && c < self.cols);
        &mut self.data[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(Matrix::from_vec(2, 3, vec![0.0f32; 6]).is_some());
        assert!(Matrix::from_vec(2, 3, vec![0.0f32; 5]).is_none());
    }

    #[test]
    fn transpose_swaps_axes() {
        let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let t = m.transpose();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.as_slice(), &[1, 4, 2, 5, 3, 6]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn crop_takes_block() {
        let m = Matrix::from_fn(4, 4, |r, c| r * 4 + c);
        let block = m.crop(1, 2, 2, 2);
        assert_eq!(block.as_slice(), &[6, 7, 10, 11]);
    }

    #[test]
    fn from_gray_is_row_major() {
        let img = GrayImage::from_fn(3, 2, |x, y| image::Luma([(y * 3 + x) as u8]));
        let m = Matrix::<f32>::from_gray(&img);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m[(1, 2)], 5.0);
        assert_eq!(m.get(2, 0), None);
    }
}
