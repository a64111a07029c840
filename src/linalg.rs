//! Matrix products, determinants and Gauss-Jordan solves.
//!
//! # Key functions
//!
//! - `matmul` / `mult`: products read straight through the operands' index
//!   arrays, so transposed or sliced views multiply without being copied
//! - `det`: closed forms up to `3 × 3`, cofactor expansion above that
//! - `ldiv`, `div`, `inv`: Gauss-Jordan elimination that repairs a small
//!   pivot by adding a lower row into it, never by swapping rows

use tracing::{debug, trace};

use crate::broadcast::Operand;
use crate::buffer::Kind;
use crate::{Matrix, MatrixError, Result, PIVOT_TOLERANCE};

// ============================================================================
// Products
// ============================================================================

/// `a · b`.
///
/// # Errors
/// Returns [`MatrixError::Dimension`] carrying the shapes of `a` and `b` if
/// `a` has a different number of columns than `b` has rows.
pub fn matmul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    let (m, k) = a.size();
    let (kb, n) = b.size();
    if k != kb {
        return Err(MatrixError::Dimension {
            expected: a.size(),
            found: b.size(),
        });
    }
    let mut data = Vec::with_capacity(m * n);
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for l in 0..k {
                sum += a.value(i, l) * b.value(l, j);
            }
            data.push(sum);
        }
    }
    Ok(Matrix::packed(Kind::Numeric, m, n, data))
}

/// Left-to-right product of a chain of matrices and scalars.
///
/// Scalars are folded into one factor that scales the final product once.
/// A chain of scalars alone yields their product as a `1 × 1` matrix. The
/// result never shares a buffer with an operand.
///
/// # Example
/// ```
/// use index_matrix::{mult, Matrix};
///
/// let a = Matrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
/// let p = mult(&[(&a).into(), 2.0.into(), a.t().into()]).unwrap();
/// assert_eq!(p.to_nested(), vec![vec![10.0, 22.0], vec![22.0, 50.0]]);
/// ```
pub fn mult(operands: &[Operand]) -> Result<Matrix> {
    let mut scale = 1.0;
    let mut product: Option<Matrix> = None;
    for operand in operands {
        match operand {
            Operand::Scalar(s) => scale *= s,
            Operand::Matrix(m) => {
                product = Some(match product {
                    None => m.clone(),
                    Some(acc) => matmul(&acc, m)?,
                });
            }
        }
    }
    Ok(match product {
        Some(p) => p.map(|v| v * scale),
        None => Matrix::filled(1, 1, scale),
    })
}

// ============================================================================
// Determinant
// ============================================================================

/// Determinant of a square matrix; `0` for any non-square shape.
///
/// Exact closed forms cover sizes up to 3. Larger matrices expand along the
/// first row over minor views, which costs `O(n!)`.
pub fn det(m: &Matrix) -> f64 {
    if !m.is_square() {
        return 0.0;
    }
    let at = |r, c| m.value(r, c);
    match m.nrows() {
        0 => 1.0,
        1 => at(0, 0),
        2 => at(0, 0) * at(1, 1) - at(0, 1) * at(1, 0),
        3 => {
            at(0, 0) * (at(1, 1) * at(2, 2) - at(1, 2) * at(2, 1))
                - at(0, 1) * (at(1, 0) * at(2, 2) - at(1, 2) * at(2, 0))
                + at(0, 2) * (at(1, 0) * at(2, 1) - at(1, 1) * at(2, 0))
        }
        n => {
            // Terms are taken in (+, -) pairs.
            let cofactor = |j: usize| at(0, j) * det(&m.minor_view(0, j));
            (0..n)
                .step_by(2)
                .map(|j| {
                    let pair = cofactor(j);
                    if j + 1 < n {
                        pair - cofactor(j + 1)
                    } else {
                        pair
                    }
                })
                .sum()
        }
    }
}

// ============================================================================
// Gauss-Jordan solve
// ============================================================================

/// Settings for [`ldiv_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// A pivot whose magnitude is below this is treated as zero.
    pub pivot_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: PIVOT_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Replace the pivot tolerance.
    ///
    /// ```
    /// use index_matrix::{ldiv_with, Matrix, MatrixError, SolverConfig};
    ///
    /// let a = Matrix::from_rows(&[[1e-6, 0.0], [0.0, 1.0]]).unwrap();
    /// let b = Matrix::column(vec![1.0, 1.0]);
    /// let strict = SolverConfig::default().with_pivot_tolerance(1e-3);
    /// assert_eq!(ldiv_with(&a, &b, &strict), Err(MatrixError::Singular));
    /// assert!(ldiv_with(&a, &b, &SolverConfig::default()).is_ok());
    /// ```
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }
}

/// Dense row-major working copy that the elimination steps act on.
struct RowBlock {
    data: Vec<f64>,
    width: usize,
}

impl RowBlock {
    fn of(m: &Matrix) -> Self {
        Self {
            data: m.to_vec(),
            width: m.ncols(),
        }
    }

    #[inline]
    fn at(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.width + c]
    }

    /// `row[to] += row[from]`
    fn add_row(&mut self, from: usize, to: usize) {
        let w = self.width;
        for c in 0..w {
            self.data[to * w + c] += self.data[from * w + c];
        }
    }

    fn divide_row(&mut self, r: usize, pivot: f64) {
        let w = self.width;
        for v in &mut self.data[r * w..(r + 1) * w] {
            *v /= pivot;
        }
    }

    /// `row[to] -= q * row[from]`
    fn subtract_scaled(&mut self, from: usize, to: usize, q: f64) {
        let w = self.width;
        for c in 0..w {
            self.data[to * w + c] -= q * self.data[from * w + c];
        }
    }
}

/// Solve `a · x = b` with the default [`SolverConfig`].
///
/// # Example
/// ```
/// use index_matrix::{ldiv, Matrix};
///
/// let a = Matrix::from_rows(&[[0.0, 1.0], [1.0, 0.0]]).unwrap();
/// let b = Matrix::column(vec![1.0, 2.0]);
/// assert_eq!(ldiv(&a, &b).unwrap().to_vec(), vec![2.0, 1.0]);
/// ```
pub fn ldiv(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    ldiv_with(a, b, &SolverConfig::default())
}

/// Solve `a · x = b` by Gauss-Jordan elimination on copies of both sides.
///
/// For each pivot row `r`, a pivot below the tolerance is repaired by adding
/// the first lower row with a usable entry in column `r`. Row `r` is then
/// divided by its pivot and column `r` is cleared from every other row. The
/// same row operations are applied to the copy of `b`, which ends up holding
/// `x`. Neither input is modified.
///
/// # Errors
/// - [`MatrixError::Dimension`] if `a` is not square or `b` has a different
///   number of rows.
/// - [`MatrixError::Singular`] if some column has no usable pivot.
pub fn ldiv_with(a: &Matrix, b: &Matrix, config: &SolverConfig) -> Result<Matrix> {
    let n = a.nrows();
    if !a.is_square() {
        return Err(MatrixError::Dimension {
            expected: (n, n),
            found: a.size(),
        });
    }
    if b.nrows() != n {
        return Err(MatrixError::Dimension {
            expected: (n, b.ncols()),
            found: b.size(),
        });
    }
    let tolerance = config.pivot_tolerance;
    let mut working = RowBlock::of(a);
    let mut result = RowBlock::of(b);

    for r in 0..n {
        if working.at(r, r).abs() < tolerance {
            let Some(source) = (r + 1..n).find(|&r2| working.at(r2, r).abs() > tolerance) else {
                debug!(column = r, size = n, "no usable pivot");
                return Err(MatrixError::Singular);
            };
            trace!(pivot = r, source, "adding row into small pivot");
            working.add_row(source, r);
            result.add_row(source, r);
        }
        let pivot = working.at(r, r);
        working.divide_row(r, pivot);
        result.divide_row(r, pivot);
        for r2 in (0..n).filter(|&r2| r2 != r) {
            let q = working.at(r2, r);
            working.subtract_scaled(r, r2, q);
            result.subtract_scaled(r, r2, q);
        }
    }

    Ok(Matrix::packed(Kind::Numeric, n, result.width, result.data))
}

/// Solve `x · b = a`, computed as `ldiv(bᵀ, aᵀ)ᵀ`.
pub fn div(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    Ok(ldiv(&b.t(), &a.t())?.t())
}

/// Inverse of a square matrix.
pub fn inv(m: &Matrix) -> Result<Matrix> {
    ldiv(m, &Matrix::identity(m.nrows()))
}
