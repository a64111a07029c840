//! Dense `f64` matrices built as zero-copy index views over a shared buffer.
//!
//! A [`Matrix`] is a flat, reference-counted buffer plus two owned index
//! arrays: the value at `(r, c)` is `buffer[rows[r] + cols[c]]`. Transposing,
//! slicing, taking a diagonal or a minor, and swapping rows only rewrite the
//! index arrays; the buffer is never copied. Every view derived from a buffer
//! sees writes made through any other view of the same buffer.
//!
//! # Core Types
//!
//! - [`Matrix`]: the view type (numeric or binary kind)
//! - [`RangeSpec`] / [`RangeToken`]: the `':'` / `'::'` range mini-language
//! - [`Selector`]: anything that can address rows, columns or linear positions
//! - [`Assign`]: values accepted by [`Matrix::set`]
//! - [`Operand`]: a matrix or scalar taking part in broadcasting
//!
//! # Addressing
//!
//! ```rust
//! use index_matrix::Matrix;
//!
//! let m = Matrix::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
//!
//! // Scalars wrap circularly.
//! assert_eq!(m.at(-1, -1).unwrap(), 6.0);
//!
//! // Views share the buffer.
//! let right = m.get(":", "1:").unwrap();
//! assert_eq!(right.to_nested(), vec![vec![2.0, 3.0], vec![5.0, 6.0]]);
//! right.set(0, 0, 20.0).unwrap();
//! assert_eq!(m.at(0, 1).unwrap(), 20.0);
//!
//! // Transpose is O(1) and also a view.
//! assert_eq!(m.t().size(), (3, 2));
//! ```
//!
//! # Broadcasting
//!
//! ```rust
//! use index_matrix::{sum_many, Matrix};
//!
//! let row = Matrix::row(vec![1.0, 2.0, 3.0]);
//! let col = Matrix::column(vec![10.0, 20.0]);
//! let s = sum_many(&[(&row).into(), (&col).into()]).unwrap();
//! assert_eq!(s.to_nested(), vec![vec![11.0, 12.0, 13.0], vec![21.0, 22.0, 23.0]]);
//! ```
//!
//! # Linear algebra
//!
//! ```rust
//! use index_matrix::{ldiv, Matrix};
//!
//! let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 4.0]]).unwrap();
//! let b = Matrix::column(vec![2.0, 2.0]);
//! assert_eq!(ldiv(&a, &b).unwrap().to_vec(), vec![1.0, 0.5]);
//! ```
//!
//! # Ordering
//!
//! Linear addressing, iteration, [`Matrix::to_vec`], [`reshape`] and mask
//! traversal are all row-major.
//!
//! # Threading
//!
//! A buffer is shared through `Rc`, so matrices are neither `Send` nor `Sync`.
//! Hosts that need to move data across threads should copy it out with
//! [`Matrix::to_vec`].

mod broadcast;
mod buffer;
mod calc;
mod element;
mod linalg;
mod manip;
mod matrix;
pub mod range;
mod select;

// ============================================================================
// View types
// ============================================================================
pub use buffer::Kind;
pub use matrix::{Axis, ColIter, Iter, Matrix, RowIter};
pub use select::{Assign, Selector};

// ============================================================================
// Storage elements
// ============================================================================
pub use element::Element;

// ============================================================================
// Range engine
// ============================================================================
pub use range::{resolve, RangeIter, RangeSpec, RangeToken};

// ============================================================================
// Manipulation
// ============================================================================
pub use manip::{hcat, mcat, repeat, reshape, shift, vcat};

// ============================================================================
// Broadcast and reduce operations
// ============================================================================
pub use broadcast::{
    bin, broadcast_shape, map_many, max, max_axis, max_many, min, min_axis, min_many, product,
    product_axis, product_many, reduce, reduce_axis, reduce_many, sum, sum_axis, sum_many,
    Operand, ReduceAxis, Reduction,
};

// ============================================================================
// Calculations
// ============================================================================
pub use calc::{abs, cumsum, diff, grid, grid_count, trace};

// ============================================================================
// Linear algebra
// ============================================================================
pub use linalg::{det, div, inv, ldiv, ldiv_with, matmul, mult, SolverConfig};

// ============================================================================
// Constants
// ============================================================================

/// Pivot magnitude below which Gauss-Jordan elimination looks for another row.
///
/// Used by [`ldiv`], [`div`] and [`inv`] through [`SolverConfig::default`].
pub const PIVOT_TOLERANCE: f64 = 1e-10;

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while building, addressing or computing with matrices.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatrixError {
    /// Operand shapes are incompatible for the operation.
    #[error("invalid matrix dimensions for the operation: expected {expected:?}, found {found:?}")]
    Dimension {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The value being assigned does not match the selected region.
    #[error("assignment error, matrix dimensions do not match: selected {expected:?}, found {found:?}")]
    Assignment {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Elimination found no usable pivot.
    #[error("matrix is singular to working precision")]
    Singular,

    /// The backing buffer is too small for the requested layout.
    #[error("data array too small for specified rows and columns: need {required}, have {available}")]
    Size { required: usize, available: usize },

    /// A range specification is malformed or cannot be resolved.
    #[error("invalid range specification: {0}")]
    RangeSpec(String),

    /// A resolved index falls outside its dimension.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: isize, len: usize },

    /// Reduction axis other than 1 (columns) or 2 (rows).
    #[error("invalid reduction axis {0}, expected 1 or 2")]
    InvalidAxis(usize),
}

/// Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
