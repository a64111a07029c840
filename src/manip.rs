//! Reshaping and recombining matrices.

use crate::buffer::Kind;
use crate::{Matrix, MatrixError, Result};

/// Refill a `rows × cols` matrix from the row-major stream of `m`.
///
/// # Errors
/// Returns [`MatrixError::Dimension`] if the element counts differ.
///
/// # Example
/// ```
/// use index_matrix::{reshape, Matrix};
///
/// let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
/// let r = reshape(&m, 3, 2).unwrap();
/// assert_eq!(r.to_nested(), vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
/// ```
pub fn reshape(m: &Matrix, rows: usize, cols: usize) -> Result<Matrix> {
    if rows * cols != m.len() {
        return Err(MatrixError::Dimension {
            expected: m.size(),
            found: (rows, cols),
        });
    }
    Ok(Matrix::packed(m.kind(), rows, cols, m.to_vec()))
}

/// Concatenate side by side. All inputs must have the same height.
pub fn hcat(parts: &[&Matrix]) -> Result<Matrix> {
    let Some(first) = parts.first() else {
        return Ok(Matrix::zeros(0, 0));
    };
    let height = first.nrows();
    for m in parts {
        if m.nrows() != height {
            return Err(MatrixError::Dimension {
                expected: (height, m.ncols()),
                found: m.size(),
            });
        }
    }
    let width = parts.iter().map(|m| m.ncols()).sum();
    let mut data = Vec::with_capacity(height * width);
    for r in 0..height {
        for m in parts {
            data.extend((0..m.ncols()).map(|c| m.value(r, c)));
        }
    }
    Ok(Matrix::packed(Kind::Numeric, height, width, data))
}

/// Stack vertically. All inputs must have the same width.
pub fn vcat(parts: &[&Matrix]) -> Result<Matrix> {
    let Some(first) = parts.first() else {
        return Ok(Matrix::zeros(0, 0));
    };
    let width = first.ncols();
    for m in parts {
        if m.ncols() != width {
            return Err(MatrixError::Dimension {
                expected: (m.nrows(), width),
                found: m.size(),
            });
        }
    }
    let height = parts.iter().map(|m| m.nrows()).sum();
    let mut data = Vec::with_capacity(height * width);
    for m in parts {
        data.extend(m.iter());
    }
    Ok(Matrix::packed(Kind::Numeric, height, width, data))
}

/// Block concatenation: each inner list is joined with [`hcat`], then the
/// rows of blocks are joined with [`vcat`].
///
/// # Example
/// ```
/// use index_matrix::{mcat, Matrix};
///
/// let (one, zero) = (Matrix::ones(2, 2), Matrix::zeros(2, 2));
/// let m = mcat(&[vec![&one, &zero], vec![&zero, &one]]).unwrap();
/// assert_eq!(m.to_nested()[2], vec![0.0, 0.0, 1.0, 1.0]);
/// ```
pub fn mcat(blocks: &[Vec<&Matrix>]) -> Result<Matrix> {
    let bands = blocks
        .iter()
        .map(|row| hcat(row))
        .collect::<Result<Vec<_>>>()?;
    vcat(&bands.iter().collect::<Vec<_>>())
}

/// Tile `m` `rn` times down and `cn` times across.
pub fn repeat(m: &Matrix, rn: usize, cn: usize) -> Matrix {
    let (h, w) = m.size();
    let (rows, cols) = (h * rn, w * cn);
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        data.extend((0..cols).map(|c| m.value(r % h, c % w)));
    }
    Matrix::packed(m.kind(), rows, cols, data)
}

/// Circularly shift rows down by `rk` and columns right by `ck`.
///
/// Negative amounts shift up and left. The result is a view: only the index
/// arrays are rotated.
pub fn shift(m: &Matrix, rk: isize, ck: isize) -> Matrix {
    let rotate = |offsets: &[usize], k: isize| -> Vec<usize> {
        let n = offsets.len();
        if n == 0 {
            return Vec::new();
        }
        let start = (-k).rem_euclid(n as isize) as usize;
        offsets[start..].iter().chain(&offsets[..start]).copied().collect()
    };
    m.with_offsets(rotate(m.row_offsets(), rk), rotate(m.col_offsets(), ck))
}
