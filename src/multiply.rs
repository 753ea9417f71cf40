//! Local row-block multiplication.

use crate::dense::{Acc, DenseMatrix, Elem};
use crate::error::DistMatmulError;
use crate::partition::RowBlock;

/// Multiply the rows of `a` in `block` against all of `b`, writing the
/// product into the first `block.len()` rows of the scratch matrix `d`.
///
/// `d` is fully reset to zero first, so rows past the clipped block stay
/// zero and can travel as padding. Accumulation happens entirely in [`Acc`];
/// every cell's sum starts from zero. Pure and deterministic, identical on
/// the coordinator and on workers. An empty block resets `d` and returns.
pub fn multiply_block(
    a: &DenseMatrix<Elem>,
    b: &DenseMatrix<Elem>,
    block: RowBlock,
    d: &mut DenseMatrix<Acc>,
) -> Result<(), DistMatmulError> {
    let dim = a.rows();
    if a.cols() != dim || b.rows() != dim || b.cols() != dim {
        return Err(DistMatmulError::ShapeMismatch {
            context: "operands must be square with equal side lengths",
        });
    }
    if block.end > dim || block.start > block.end {
        return Err(DistMatmulError::BlockOutOfBounds {
            start: block.start,
            end: block.end,
            rows: dim,
        });
    }
    if d.cols() != dim || d.rows() < block.len() {
        return Err(DistMatmulError::ShapeMismatch {
            context: "scratch block is narrower or shorter than the owned range",
        });
    }

    d.reset();
    for (w, i) in block.rows().enumerate() {
        let a_row = a.row(i);
        let d_row = d.row_mut(w);
        for (j, out) in d_row.iter_mut().enumerate() {
            let mut sum: Acc = 0;
            for (k, &a_ik) in a_row.iter().enumerate() {
                sum += Acc::from(a_ik) * Acc::from(b[(k, j)]);
            }
            *out = sum;
        }
    }
    Ok(())
}
