//! Broadcasting and reductions over matrices and scalars.
//!
//! Operands are aligned to a common shape before an n-ary function runs:
//! a scalar or `1 × 1` matrix repeats its value everywhere, a `1 × W` row
//! repeats down `H` rows and an `H × 1` column repeats across `W` columns.
//! Promotion is a view operation: a size-1 dimension becomes an index array
//! that repeats its single offset, so no operand data is copied.
//!
//! # Example
//! ```
//! use index_matrix::{map_many, sum_many, Matrix, Operand};
//!
//! let row = Matrix::row(vec![1.0, 2.0, 3.0]);
//! let col = Matrix::column(vec![10.0, 20.0]);
//!
//! let outer = sum_many(&[(&row).into(), (&col).into()]).unwrap();
//! assert_eq!(outer.to_nested(), vec![vec![11.0, 12.0, 13.0], vec![21.0, 22.0, 23.0]]);
//!
//! let scaled = map_many(&[Operand::from(&row), Operand::from(2.0)], |v| v[0] * v[1]).unwrap();
//! assert_eq!(scaled.to_vec(), vec![2.0, 4.0, 6.0]);
//! ```

use tracing::debug;

use crate::buffer::Kind;
use crate::{Matrix, MatrixError, Result};

/// One argument of an elementwise operation.
#[derive(Debug, Clone)]
pub enum Operand {
    Matrix(Matrix),
    Scalar(f64),
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(v)
    }
}

impl From<Matrix> for Operand {
    fn from(m: Matrix) -> Self {
        Operand::Matrix(m)
    }
}

impl From<&Matrix> for Operand {
    fn from(m: &Matrix) -> Self {
        Operand::Matrix(m.clone())
    }
}

impl Operand {
    fn size(&self) -> (usize, usize) {
        match self {
            Operand::Matrix(m) => m.size(),
            Operand::Scalar(_) => (1, 1),
        }
    }
}

// ============================================================================
// Shape alignment
// ============================================================================

/// Common shape of `operands` under size-1 broadcasting.
///
/// Scalars take part as `1 × 1`. With no matrix operands the shape is `1 × 1`.
///
/// # Errors
/// Returns [`MatrixError::Dimension`] if some dimension of an operand is
/// neither `1` nor the common size.
pub fn broadcast_shape(operands: &[Operand]) -> Result<(usize, usize)> {
    let pick = |dim: fn((usize, usize)) -> usize| {
        operands
            .iter()
            .map(|o| dim(o.size()))
            .find(|&n| n != 1)
            .unwrap_or(1)
    };
    let target = (pick(|s| s.0), pick(|s| s.1));
    for o in operands {
        let (h, w) = o.size();
        if (h != target.0 && h != 1) || (w != target.1 && w != 1) {
            debug!(shape = ?(h, w), ?target, "operand does not broadcast");
            return Err(MatrixError::Dimension {
                expected: target,
                found: (h, w),
            });
        }
    }
    Ok(target)
}

/// Stretch a matrix to `target` by repeating the offset of each size-1
/// dimension. The shape must already be compatible.
fn promote(m: &Matrix, target: (usize, usize)) -> Matrix {
    let stretch = |offsets: &[usize], n: usize| -> Vec<usize> {
        if offsets.len() == n {
            offsets.to_vec()
        } else {
            vec![offsets[0]; n]
        }
    };
    m.with_offsets(
        stretch(m.row_offsets(), target.0),
        stretch(m.col_offsets(), target.1),
    )
}

/// Visit every cell of the broadcast shape with the aligned operand values.
fn for_each_aligned(
    operands: &[Operand],
    mut visit: impl FnMut(&[f64]),
) -> Result<(usize, usize)> {
    let target = broadcast_shape(operands)?;
    enum Source {
        View(Matrix),
        Value(f64),
    }
    let sources: Vec<Source> = operands
        .iter()
        .map(|o| match o {
            Operand::Matrix(m) => Source::View(promote(m, target)),
            Operand::Scalar(v) => Source::Value(*v),
        })
        .collect();
    let mut args = vec![0.0; sources.len()];
    for r in 0..target.0 {
        for c in 0..target.1 {
            for (slot, source) in args.iter_mut().zip(&sources) {
                *slot = match source {
                    Source::View(m) => m.value(r, c),
                    Source::Value(v) => *v,
                };
            }
            visit(&args);
        }
    }
    Ok(target)
}

/// Apply `f` to the aligned values of every cell; the result is numeric.
///
/// `f` receives one value per operand, in operand order.
pub fn map_many(operands: &[Operand], mut f: impl FnMut(&[f64]) -> f64) -> Result<Matrix> {
    let mut data = Vec::new();
    let (h, w) = for_each_aligned(operands, |args| data.push(f(args)))?;
    Ok(Matrix::packed(Kind::Numeric, h, w, data))
}

/// Like [`map_many`], but the result is a binary mask of `pred`.
///
/// # Example
/// ```
/// use index_matrix::{bin, Matrix, Operand};
///
/// let m = Matrix::from_rows(&[[1.0, 5.0], [7.0, 2.0]]).unwrap();
/// let mask = bin(&[Operand::from(&m)], |v| v[0] > 3.0).unwrap();
/// assert!(mask.is_binary());
/// assert_eq!(m.get_linear(&mask).unwrap().to_vec(), vec![5.0, 7.0]);
/// ```
pub fn bin(operands: &[Operand], mut pred: impl FnMut(&[f64]) -> bool) -> Result<Matrix> {
    let mut data = Vec::new();
    let (h, w) = for_each_aligned(operands, |args| {
        data.push(if pred(args) { 1.0 } else { 0.0 })
    })?;
    Ok(Matrix::packed(Kind::Binary, h, w, data))
}

// ============================================================================
// Reductions
// ============================================================================

/// Associative reducer with an identity element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Max,
    Min,
    Product,
}

impl Reduction {
    /// Starting value of the fold. An empty reduction returns it.
    pub fn identity(self) -> f64 {
        match self {
            Reduction::Sum => 0.0,
            Reduction::Product => 1.0,
            Reduction::Max => f64::NEG_INFINITY,
            Reduction::Min => f64::INFINITY,
        }
    }

    /// Fold one more value into `acc`.
    ///
    /// ```
    /// use index_matrix::Reduction;
    ///
    /// let acc = Reduction::Max.identity();
    /// assert_eq!(Reduction::Max.combine(acc, -3.0), -3.0);
    /// assert_eq!(Reduction::Product.combine(2.0, 4.0), 8.0);
    /// ```
    #[inline]
    pub fn combine(self, acc: f64, v: f64) -> f64 {
        match self {
            Reduction::Sum => acc + v,
            Reduction::Product => acc * v,
            Reduction::Max => acc.max(v),
            Reduction::Min => acc.min(v),
        }
    }

    fn fold(self, values: impl IntoIterator<Item = f64>) -> f64 {
        values
            .into_iter()
            .fold(self.identity(), |acc, v| self.combine(acc, v))
    }
}

/// Direction of a single-matrix reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceAxis {
    /// Axis 1: reduce down each column, giving a `1 × W` row.
    Columns,
    /// Axis 2: reduce along each row, giving an `H × 1` column.
    Rows,
}

impl TryFrom<usize> for ReduceAxis {
    type Error = MatrixError;

    fn try_from(axis: usize) -> Result<Self> {
        match axis {
            1 => Ok(ReduceAxis::Columns),
            2 => Ok(ReduceAxis::Rows),
            _ => Err(MatrixError::InvalidAxis(axis)),
        }
    }
}

/// Fold every element of `m`.
pub fn reduce(m: &Matrix, op: Reduction) -> f64 {
    op.fold(m.iter())
}

/// Fold `m` along one axis.
pub fn reduce_axis(m: &Matrix, axis: ReduceAxis, op: Reduction) -> Matrix {
    match axis {
        ReduceAxis::Columns => Matrix::row(m.cols().map(|c| op.fold(c)).collect()),
        ReduceAxis::Rows => Matrix::column(m.rows().map(|r| op.fold(r)).collect()),
    }
}

/// Broadcast the operands and fold them cell by cell.
pub fn reduce_many(operands: &[Operand], op: Reduction) -> Result<Matrix> {
    map_many(operands, |args| op.fold(args.iter().copied()))
}

macro_rules! reduction_wrappers {
    ($($op:ident => $whole:ident, $axis:ident, $many:ident;)*) => {$(
        #[doc = concat!("[`Reduction::", stringify!($op), "`] over every element.")]
        pub fn $whole(m: &Matrix) -> f64 {
            reduce(m, Reduction::$op)
        }

        #[doc = concat!("[`Reduction::", stringify!($op), "`] along one axis.")]
        pub fn $axis(m: &Matrix, axis: ReduceAxis) -> Matrix {
            reduce_axis(m, axis, Reduction::$op)
        }

        #[doc = concat!("Cellwise [`Reduction::", stringify!($op), "`] of broadcast operands.")]
        pub fn $many(operands: &[Operand]) -> Result<Matrix> {
            reduce_many(operands, Reduction::$op)
        }
    )*};
}

reduction_wrappers! {
    Sum => sum, sum_axis, sum_many;
    Max => max, max_axis, max_many;
    Min => min, min_axis, min_many;
    Product => product, product_axis, product_many;
}
