//! Dense row-major matrix storage.
//!
//! One contiguous owned buffer plus a row-stride accessor. Row-major
//! contiguity is load-bearing: it lets a whole matrix (or a row block)
//! travel as a single typed transfer.

use num_traits::Zero;
use static_assertions::const_assert;

use crate::error::DistMatmulError;

/// Element type of the input matrices.
pub type Elem = u32;
/// Accumulator and result element type.
pub type Acc = u64;

// The accumulator must be strictly wider than the element type so that
// dim-term sums of element products do not wrap.
const_assert!(size_of::<Acc>() > size_of::<Elem>());

/// Dense matrix over a contiguous row-major buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseMatrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Zero + Clone> DenseMatrix<T> {
    /// All-zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Reset every cell to zero, keeping the allocation.
    pub fn reset(&mut self) {
        self.data.fill(T::zero());
    }
}

impl<T> DenseMatrix<T> {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Entire buffer in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Entire mutable buffer in row-major order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Row `r` as a slice of `cols` elements.
    #[inline]
    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Row `r` as a mutable slice of `cols` elements.
    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [T] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Copy `count` rows of `src` starting at `src_first` into `self`
    /// starting at `dst_first`. Column widths must match; both row ranges
    /// must be in bounds.
    pub fn copy_rows_from(
        &mut self,
        src: &DenseMatrix<T>,
        src_first: usize,
        dst_first: usize,
        count: usize,
    ) -> Result<(), DistMatmulError>
    where
        T: Clone,
    {
        if src.cols != self.cols {
            return Err(DistMatmulError::ShapeMismatch {
                context: "row copy requires equal column counts",
            });
        }
        let src_end = src_first
            .checked_add(count)
            .ok_or(DistMatmulError::RowOutOfBounds {
                row: usize::MAX,
                rows: src.rows,
            })?;
        if src_end > src.rows {
            return Err(DistMatmulError::RowOutOfBounds {
                row: src_end - 1,
                rows: src.rows,
            });
        }
        let dst_end = dst_first
            .checked_add(count)
            .ok_or(DistMatmulError::RowOutOfBounds {
                row: usize::MAX,
                rows: self.rows,
            })?;
        if dst_end > self.rows {
            return Err(DistMatmulError::RowOutOfBounds {
                row: dst_end - 1,
                rows: self.rows,
            });
        }
        let width = self.cols;
        self.data[dst_first * width..dst_end * width]
            .clone_from_slice(&src.data[src_first * width..src_end * width]);
        Ok(())
    }
}

impl DenseMatrix<Elem> {
    /// Deterministic seed: cell `(i, j)` holds `(j + 1) + i * dim`, a
    /// row-major ramp of 1, 2, 3, ... across the whole square matrix.
    pub fn ramp(dim: usize) -> Self {
        let mut m = Self::zeros(dim, dim);
        for i in 0..dim {
            let row = m.row_mut(i);
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = ((j + 1) + i * dim) as Elem;
            }
        }
        m
    }
}

impl<T> std::ops::Index<(usize, usize)> for DenseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &T {
        &self.data[r * self.cols + c]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for DenseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        &mut self.data[r * self.cols + c]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_shape_and_contents() {
        let m = DenseMatrix::<Acc>::zeros(3, 5);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 5);
        assert!(m.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn ramp_matches_the_linear_fill() {
        let m = DenseMatrix::ramp(4);
        assert_eq!(m[(0, 0)], 1);
        assert_eq!(m[(0, 3)], 4);
        assert_eq!(m[(1, 0)], 5);
        assert_eq!(m[(3, 3)], 16);
        // reseeding reproduces identical values
        assert_eq!(m, DenseMatrix::ramp(4));
    }

    #[test]
    fn row_accessor_is_the_stride_view() {
        let m = DenseMatrix::ramp(3);
        assert_eq!(m.row(1), &[4, 5, 6]);
    }

    #[test]
    fn copy_rows_places_a_block() {
        let mut dst = DenseMatrix::<Elem>::zeros(4, 3);
        let src = DenseMatrix::ramp(3);
        dst.copy_rows_from(&src, 0, 1, 2).unwrap();
        assert_eq!(dst.row(0), &[0, 0, 0]);
        assert_eq!(dst.row(1), &[1, 2, 3]);
        assert_eq!(dst.row(2), &[4, 5, 6]);
        assert_eq!(dst.row(3), &[0, 0, 0]);
    }

    #[test]
    fn copy_rows_rejects_out_of_bounds() {
        let mut dst = DenseMatrix::<Elem>::zeros(2, 3);
        let src = DenseMatrix::ramp(3);
        assert!(matches!(
            dst.copy_rows_from(&src, 0, 1, 2),
            Err(DistMatmulError::RowOutOfBounds { .. })
        ));
        assert!(matches!(
            dst.copy_rows_from(&src, 2, 0, 2),
            Err(DistMatmulError::RowOutOfBounds { .. })
        ));
    }

    #[test]
    fn copy_rows_rejects_width_mismatch() {
        let mut dst = DenseMatrix::<Elem>::zeros(3, 4);
        let src = DenseMatrix::ramp(3);
        assert!(matches!(
            dst.copy_rows_from(&src, 0, 0, 1),
            Err(DistMatmulError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn zero_row_copy_is_a_no_op() {
        let mut dst = DenseMatrix::<Elem>::zeros(2, 2);
        let src = DenseMatrix::ramp(2);
        dst.copy_rows_from(&src, 0, 0, 0).unwrap();
        assert!(dst.as_slice().iter().all(|&v| v == 0));
    }
}
