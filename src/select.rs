//! Row, column and linear addressing, and the values `set` accepts.

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use crate::matrix::Matrix;
use crate::range::RangeSpec;
use crate::{MatrixError, Result};

/// Something that picks an ordered list of positions along one dimension,
/// or along the row-major flattening of a whole matrix.
///
/// - integers and integer lists: negative values count from the end
/// - [`RangeSpec`] or its text form: `":"`, `"1:3"`, `"::-1"`
/// - std ranges over `usize`: `..`, `1..3`, `..=2`
/// - a binary [`Matrix`]: a mask; positions where it is non-zero, in
///   row-major order
/// - a numeric [`Matrix`]: its values, read row-major, used as indices
#[derive(Debug, Clone)]
pub enum Selector {
    Index(isize),
    Indices(Vec<isize>),
    Range(RangeSpec),
    Text(String),
    Matrix(Matrix),
}

impl Selector {
    /// Positions selected along a dimension of length `len`.
    pub(crate) fn resolve_axis(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            Selector::Matrix(m) if m.is_binary() => {
                let (r, c) = m.size();
                if !((r == len && c == 1) || (r == 1 && c == len)) {
                    return Err(MatrixError::Dimension {
                        expected: (len, 1),
                        found: (r, c),
                    });
                }
                Ok(mask_positions(m))
            }
            _ => self.resolve_flat(len),
        }
    }

    /// Row-major linear positions selected in a matrix of `shape`.
    pub(crate) fn resolve_linear(&self, shape: (usize, usize)) -> Result<Vec<usize>> {
        match self {
            Selector::Matrix(m) if m.is_binary() => {
                if m.size() != shape {
                    return Err(MatrixError::Dimension {
                        expected: shape,
                        found: m.size(),
                    });
                }
                Ok(mask_positions(m))
            }
            _ => self.resolve_flat(shape.0 * shape.1),
        }
    }

    fn resolve_flat(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            Selector::Index(i) => Ok(vec![in_bounds(wrap_once(*i, len)?, len)?]),
            Selector::Indices(list) => list
                .iter()
                .map(|&i| in_bounds(wrap_once(i, len)?, len))
                .collect(),
            // Checked lazily: a run fails at its first out-of-range index.
            Selector::Range(spec) => spec
                .iter(Some(len))?
                .map(|p| in_bounds(p, len))
                .collect(),
            Selector::Text(text) => RangeSpec::parse(text)?
                .iter(Some(len))?
                .map(|p| in_bounds(p, len))
                .collect(),
            Selector::Matrix(m) => m
                .iter()
                .map(|v| {
                    if v.fract() != 0.0 || !v.is_finite() {
                        return Err(MatrixError::RangeSpec(format!(
                            "index value {v} is not an integer"
                        )));
                    }
                    in_bounds(wrap_once(v as isize, len)?, len)
                })
                .collect(),
        }
    }
}

fn in_bounds(position: usize, len: usize) -> Result<usize> {
    if position >= len {
        return Err(MatrixError::IndexOutOfBounds {
            index: saturate(position),
            len,
        });
    }
    Ok(position)
}

/// Saturates instead of wrapping, so an oversized index stays out of bounds.
fn saturate(i: usize) -> isize {
    isize::try_from(i).unwrap_or(isize::MAX)
}

fn wrap_once(index: isize, len: usize) -> Result<usize> {
    let wrapped = if index < 0 {
        index + len as isize
    } else {
        index
    };
    if wrapped < 0 {
        return Err(MatrixError::IndexOutOfBounds { index, len });
    }
    Ok(wrapped as usize)
}

fn mask_positions(mask: &Matrix) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, v)| *v != 0.0)
        .map(|(i, _)| i)
        .collect()
}

impl From<isize> for Selector {
    fn from(i: isize) -> Self {
        Selector::Index(i)
    }
}

impl From<i32> for Selector {
    fn from(i: i32) -> Self {
        Selector::Index(i as isize)
    }
}

impl From<i64> for Selector {
    fn from(i: i64) -> Self {
        let i = isize::try_from(i).unwrap_or(if i < 0 { isize::MIN } else { isize::MAX });
        Selector::Index(i)
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Selector::Index(saturate(i))
    }
}

impl From<Vec<isize>> for Selector {
    fn from(list: Vec<isize>) -> Self {
        Selector::Indices(list)
    }
}

impl From<Vec<i32>> for Selector {
    fn from(list: Vec<i32>) -> Self {
        Selector::Indices(list.into_iter().map(|i| i as isize).collect())
    }
}

impl From<Vec<usize>> for Selector {
    fn from(list: Vec<usize>) -> Self {
        Selector::Indices(list.into_iter().map(saturate).collect())
    }
}

impl From<&[isize]> for Selector {
    fn from(list: &[isize]) -> Self {
        Selector::Indices(list.to_vec())
    }
}

impl<const N: usize> From<[i32; N]> for Selector {
    fn from(list: [i32; N]) -> Self {
        Selector::Indices(list.iter().map(|&i| i as isize).collect())
    }
}

impl From<RangeSpec> for Selector {
    fn from(spec: RangeSpec) -> Self {
        Selector::Range(spec)
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Selector::Text(text.to_owned())
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Selector::Text(text)
    }
}

impl From<Matrix> for Selector {
    fn from(m: Matrix) -> Self {
        Selector::Matrix(m)
    }
}

impl From<&Matrix> for Selector {
    fn from(m: &Matrix) -> Self {
        Selector::Matrix(m.clone())
    }
}

impl From<RangeFull> for Selector {
    fn from(_: RangeFull) -> Self {
        Selector::Range(RangeSpec::full())
    }
}

impl From<Range<usize>> for Selector {
    fn from(r: Range<usize>) -> Self {
        Selector::Indices(r.map(saturate).collect())
    }
}

impl From<RangeInclusive<usize>> for Selector {
    fn from(r: RangeInclusive<usize>) -> Self {
        Selector::Indices(r.map(saturate).collect())
    }
}

impl From<RangeTo<usize>> for Selector {
    fn from(r: RangeTo<usize>) -> Self {
        Selector::Indices((0..r.end).map(saturate).collect())
    }
}

impl From<RangeToInclusive<usize>> for Selector {
    fn from(r: RangeToInclusive<usize>) -> Self {
        Selector::Indices((0..=r.end).map(saturate).collect())
    }
}

impl From<RangeFrom<usize>> for Selector {
    fn from(r: RangeFrom<usize>) -> Self {
        use crate::range::RangeToken;
        Selector::Range(RangeSpec::new(vec![
            RangeToken::Index(saturate(r.start)),
            RangeToken::Colon,
        ]))
    }
}

/// A value written by [`Matrix::set`].
///
/// Scalars fill every selected cell. Matrices and nested rows must match the
/// selected shape exactly; a flat list must have one value per selected
/// cell and is consumed in row-major order.
#[derive(Debug, Clone)]
pub enum Assign {
    Scalar(f64),
    Matrix(Matrix),
    Values(Vec<f64>),
    Rows(Vec<Vec<f64>>),
}

impl Assign {
    /// Snapshot the values to write into a `shape` selection, row-major.
    ///
    /// Reading everything up front keeps writes through an aliasing view
    /// from feeding back into the source.
    pub(crate) fn snapshot(&self, shape: (usize, usize)) -> Result<Vec<f64>> {
        let count = shape.0 * shape.1;
        match self {
            Assign::Scalar(v) => Ok(vec![*v; count]),
            Assign::Matrix(m) => {
                if m.size() != shape {
                    return Err(MatrixError::Assignment {
                        expected: shape,
                        found: m.size(),
                    });
                }
                Ok(m.to_vec())
            }
            Assign::Values(values) => {
                if values.len() != count {
                    return Err(MatrixError::Assignment {
                        expected: shape,
                        found: (values.len(), 1),
                    });
                }
                Ok(values.clone())
            }
            Assign::Rows(rows) => {
                let width = rows.first().map_or(0, Vec::len);
                let found = (rows.len(), width);
                if found != shape || rows.iter().any(|r| r.len() != width) {
                    return Err(MatrixError::Assignment {
                        expected: shape,
                        found,
                    });
                }
                Ok(rows.iter().flatten().copied().collect())
            }
        }
    }
}

impl From<f64> for Assign {
    fn from(v: f64) -> Self {
        Assign::Scalar(v)
    }
}

impl From<i32> for Assign {
    fn from(v: i32) -> Self {
        Assign::Scalar(f64::from(v))
    }
}

impl From<bool> for Assign {
    fn from(v: bool) -> Self {
        Assign::Scalar(if v { 1.0 } else { 0.0 })
    }
}

impl From<Matrix> for Assign {
    fn from(m: Matrix) -> Self {
        Assign::Matrix(m)
    }
}

impl From<&Matrix> for Assign {
    fn from(m: &Matrix) -> Self {
        Assign::Matrix(m.clone())
    }
}

impl From<Vec<f64>> for Assign {
    fn from(values: Vec<f64>) -> Self {
        Assign::Values(values)
    }
}

impl From<&[f64]> for Assign {
    fn from(values: &[f64]) -> Self {
        Assign::Values(values.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for Assign {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Assign::Rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_wraps_once() {
        assert_eq!(Selector::from(-1).resolve_axis(4).unwrap(), vec![3]);
        assert_eq!(Selector::from(2).resolve_axis(4).unwrap(), vec![2]);
        assert!(matches!(
            Selector::from(4).resolve_axis(4),
            Err(MatrixError::IndexOutOfBounds { index: 4, len: 4 })
        ));
        assert!(matches!(
            Selector::from(-5).resolve_axis(4),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_text_and_std_ranges() {
        assert_eq!(Selector::from(":").resolve_axis(3).unwrap(), vec![0, 1, 2]);
        assert_eq!(Selector::from("::-1").resolve_axis(3).unwrap(), vec![2, 1, 0]);
        assert_eq!(Selector::from(..).resolve_axis(2).unwrap(), vec![0, 1]);
        assert_eq!(Selector::from(1..3).resolve_axis(5).unwrap(), vec![1, 2]);
        assert_eq!(Selector::from(..=1).resolve_axis(5).unwrap(), vec![0, 1]);
        assert_eq!(Selector::from(3..).resolve_axis(5).unwrap(), vec![3, 4]);
        assert!(Selector::from("0:9").resolve_axis(3).is_err());
    }

    #[test]
    fn test_oversized_run_fails_at_first_bad_index() {
        assert!(matches!(
            Selector::from("0:1000000000000000").resolve_axis(3),
            Err(MatrixError::IndexOutOfBounds { index: 3, len: 3 })
        ));
        let spec = RangeSpec::parse("2:1000000000000000").unwrap();
        assert!(matches!(
            Selector::from(spec).resolve_linear((2, 2)),
            Err(MatrixError::IndexOutOfBounds { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_huge_unsigned_index_stays_out_of_bounds() {
        assert!(matches!(
            Selector::from(usize::MAX).resolve_axis(4),
            Err(MatrixError::IndexOutOfBounds { index: isize::MAX, len: 4 })
        ));
        assert!(matches!(
            Selector::from(vec![0usize, usize::MAX]).resolve_axis(4),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            Selector::from(i64::MAX).resolve_axis(4),
            Err(MatrixError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_lists() {
        let s = Selector::from(vec![0, -1, 1]);
        assert_eq!(s.resolve_axis(3).unwrap(), vec![0, 2, 1]);
        let s = Selector::from([2, 2]);
        assert_eq!(s.resolve_axis(3).unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_mask_along_axis() {
        let mask = Matrix::mask_from(3, 1, vec![true, false, true]).unwrap();
        assert_eq!(Selector::from(&mask).resolve_axis(3).unwrap(), vec![0, 2]);
        assert!(matches!(
            Selector::from(&mask).resolve_axis(4),
            Err(MatrixError::Dimension { .. })
        ));
    }

    #[test]
    fn test_linear_mask_requires_same_shape() {
        let mask = Matrix::mask_from(2, 2, vec![false, true, true, false]).unwrap();
        let s = Selector::from(&mask);
        assert_eq!(s.resolve_linear((2, 2)).unwrap(), vec![1, 2]);
        assert!(matches!(
            s.resolve_linear((1, 4)),
            Err(MatrixError::Dimension { .. })
        ));
    }

    #[test]
    fn test_numeric_matrix_as_indices() {
        let idx = Matrix::column(vec![2.0, 0.0]);
        assert_eq!(Selector::from(&idx).resolve_axis(3).unwrap(), vec![2, 0]);
        let frac = Matrix::column(vec![0.5]);
        assert!(Selector::from(&frac).resolve_axis(3).is_err());
    }

    #[test]
    fn test_assign_snapshot_shapes() {
        assert_eq!(Assign::from(2.0).snapshot((1, 2)).unwrap(), vec![2.0, 2.0]);
        assert_eq!(
            Assign::from(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
                .snapshot((2, 2))
                .unwrap(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
        assert!(matches!(
            Assign::from(vec![vec![1.0, 2.0], vec![3.0]]).snapshot((2, 2)),
            Err(MatrixError::Assignment { .. })
        ));
        assert!(matches!(
            Assign::from(vec![1.0, 2.0, 3.0]).snapshot((2, 2)),
            Err(MatrixError::Assignment { .. })
        ));
        let m = Matrix::zeros(2, 3);
        assert!(matches!(
            Assign::from(&m).snapshot((3, 2)),
            Err(MatrixError::Assignment { .. })
        ));
    }
}
