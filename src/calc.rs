//! Derived calculations built on views and reductions.

use crate::broadcast::{sum, ReduceAxis};
use crate::buffer::Kind;
use crate::manip::repeat;
use crate::range::{resolve, RangeSpec};
use crate::{Matrix, Result};

/// Sum of [`Matrix::diag`].
pub fn trace(m: &Matrix) -> f64 {
    sum(&m.diag())
}

/// Elementwise absolute value.
pub fn abs(m: &Matrix) -> Matrix {
    m.map(f64::abs)
}

/// Running sum down each column ([`ReduceAxis::Columns`]) or along each row.
pub fn cumsum(m: &Matrix, axis: ReduceAxis) -> Matrix {
    scan(m, axis, |acc, v| acc + v)
}

/// First differences; the first element of each line is kept as is, so
/// `diff(&cumsum(&m, axis), axis) == m`.
pub fn diff(m: &Matrix, axis: ReduceAxis) -> Matrix {
    let (h, w) = m.size();
    let mut out = m.to_vec();
    match axis {
        ReduceAxis::Columns => {
            for r in 1..h {
                for c in 0..w {
                    out[r * w + c] = m.value(r, c) - m.value(r - 1, c);
                }
            }
        }
        ReduceAxis::Rows => {
            for r in 0..h {
                for c in 1..w {
                    out[r * w + c] = m.value(r, c) - m.value(r, c - 1);
                }
            }
        }
    }
    Matrix::packed(Kind::Numeric, h, w, out)
}

fn scan(m: &Matrix, axis: ReduceAxis, f: impl Fn(f64, f64) -> f64) -> Matrix {
    let (h, w) = m.size();
    let mut out = m.to_vec();
    match axis {
        ReduceAxis::Columns => {
            for i in w..out.len() {
                out[i] = f(out[i - w], out[i]);
            }
        }
        ReduceAxis::Rows => {
            for row in out.chunks_mut(w.max(1)) {
                for c in 1..row.len() {
                    row[c] = f(row[c - 1], row[c]);
                }
            }
        }
    }
    Matrix::packed(Kind::Numeric, h, w, out)
}

/// Two-dimensional grid of coordinates.
///
/// With `rows` resolving to `n` values and `cols` to `m`, both results are
/// `n × m`: the first repeats `rows` as a column across `m` columns, the
/// second repeats `cols` as a row down `n` rows. Both specs are resolved
/// without a length, so they must be explicit.
///
/// # Example
/// ```
/// use index_matrix::grid;
///
/// let (i, j) = grid(&"1:2".parse().unwrap(), &"0:2".parse().unwrap()).unwrap();
/// assert_eq!(i.to_nested(), vec![vec![1.0; 3], vec![2.0; 3]]);
/// assert_eq!(j.to_nested()[1], vec![0.0, 1.0, 2.0]);
/// ```
pub fn grid(rows: &RangeSpec, cols: &RangeSpec) -> Result<(Matrix, Matrix)> {
    let to_f64 = |v: Vec<usize>| v.into_iter().map(|x| x as f64).collect::<Vec<_>>();
    let rv = to_f64(resolve(rows, None)?);
    let cv = to_f64(resolve(cols, None)?);
    let (n, m) = (rv.len(), cv.len());
    Ok((
        repeat(&Matrix::column(rv), 1, m),
        repeat(&Matrix::row(cv), n, 1),
    ))
}

/// [`grid`] over `0..rows` and `0..cols`, with `cols` defaulting to `rows`.
///
/// # Example
/// ```
/// use index_matrix::grid_count;
///
/// let (i, j) = grid_count(2, None);
/// assert_eq!(i.to_nested(), vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
/// assert_eq!(j.to_nested(), vec![vec![0.0, 1.0], vec![0.0, 1.0]]);
/// ```
pub fn grid_count(rows: usize, cols: Option<usize>) -> (Matrix, Matrix) {
    let cols = cols.unwrap_or(rows);
    (
        Matrix::from_fn(rows, cols, |r, _| r as f64),
        Matrix::from_fn(rows, cols, |_, c| c as f64),
    )
}
