//! The matrix view type.
//!
//! A [`Matrix`] holds a shared [`Buffer`] and two owned index arrays. The
//! element at `(r, c)` lives at `buffer[rows[r] + cols[c]]`. Construction
//! validates the largest offset once; accesses after that never re-check.
//!
//! Views derived through [`Matrix::get`], [`Matrix::t`],
//! [`Matrix::diagonal_view`], [`Matrix::minor`] and `Clone::clone` share the
//! buffer. [`Matrix::deep_clone`] and every arithmetic result allocate a new
//! packed buffer.

use rand::Rng;

use crate::buffer::{Buffer, Kind};
use crate::select::{Assign, Selector};
use crate::{MatrixError, Result};

/// Layout of one dimension at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Axis {
    /// A count, expanded to the default packed row-major layout.
    Count(usize),
    /// Explicit buffer offsets.
    Offsets(Vec<usize>),
}

impl From<usize> for Axis {
    fn from(n: usize) -> Self {
        Axis::Count(n)
    }
}

impl From<Vec<usize>> for Axis {
    fn from(offsets: Vec<usize>) -> Self {
        Axis::Offsets(offsets)
    }
}

/// A dense matrix view over a shared buffer.
///
/// `Clone` copies the handle and the index arrays, not the data; the clone
/// aliases the original. Use [`Matrix::deep_clone`] for an independent copy.
///
/// # Example
/// ```
/// use index_matrix::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
/// assert_eq!(m.size(), (2, 3));
/// assert_eq!(m.at(1, 0).unwrap(), 4.0);
///
/// let t = m.t();
/// assert_eq!(t.at(0, 1).unwrap(), 4.0);
/// assert!(t.shares_buffer_with(&m));
/// ```
#[derive(Debug, Clone)]
pub struct Matrix {
    buffer: Buffer,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

fn required_len(rows: &[usize], cols: &[usize]) -> usize {
    match (rows.iter().max(), cols.iter().max()) {
        (Some(r), Some(c)) => r + c + 1,
        _ => 0,
    }
}

// ============================================================================
// Construction
// ============================================================================

impl Matrix {
    /// Create a matrix from a row and column layout and optional data.
    ///
    /// A count expands to the packed row-major layout: column offsets
    /// `0..cols`, row offsets stepping by one past the largest column offset.
    /// Without data a zero-filled buffer of the required size is allocated.
    ///
    /// # Errors
    /// Returns [`MatrixError::Size`] if `data` is shorter than the largest
    /// offset the layout can reach plus one.
    pub fn new(
        rows: impl Into<Axis>,
        cols: impl Into<Axis>,
        data: Option<Vec<f64>>,
    ) -> Result<Self> {
        let cols = match cols.into() {
            Axis::Count(n) => (0..n).collect::<Vec<_>>(),
            Axis::Offsets(offsets) => offsets,
        };
        let span = cols.iter().max().map_or(0, |&c| c + 1);
        let rows = match rows.into() {
            Axis::Count(n) => (0..n).map(|r| r * span).collect::<Vec<_>>(),
            Axis::Offsets(offsets) => offsets,
        };
        let required = required_len(&rows, &cols);
        let buffer = match data {
            Some(data) => {
                if data.len() < required {
                    return Err(MatrixError::Size {
                        required,
                        available: data.len(),
                    });
                }
                Buffer::numeric(data)
            }
            None => Buffer::zeroed(Kind::Numeric, required),
        };
        Ok(Self { buffer, rows, cols })
    }

    /// Wrap existing parts. Offsets must already be in bounds.
    pub(crate) fn from_parts(buffer: Buffer, rows: Vec<usize>, cols: Vec<usize>) -> Self {
        debug_assert!(required_len(&rows, &cols) <= buffer.len());
        Self { buffer, rows, cols }
    }

    /// View over this matrix's buffer with other offsets taken from it.
    pub(crate) fn with_offsets(&self, rows: Vec<usize>, cols: Vec<usize>) -> Self {
        Self::from_parts(self.buffer.clone(), rows, cols)
    }

    /// Packed row-major matrix over a fresh buffer of exactly `rows * cols`.
    pub(crate) fn packed(kind: Kind, rows: usize, cols: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        let buffer = match kind {
            Kind::Numeric => Buffer::numeric(values),
            Kind::Binary => Buffer::binary(values.into_iter().map(|v| v != 0.0)),
        };
        Self::from_parts(
            buffer,
            (0..rows).map(|r| r * cols).collect(),
            (0..cols).collect(),
        )
    }

    /// Row-major matrix from a flat list of values.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        Self::new(rows, cols, Some(data))
    }

    /// Matrix from a list of equally long rows.
    ///
    /// # Errors
    /// Returns [`MatrixError::Dimension`] if the rows differ in length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(MatrixError::Dimension {
                    expected: (1, width),
                    found: (1, row.len()),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self::packed(Kind::Numeric, rows.len(), width, data))
    }

    /// Matrix whose element `(r, c)` is `f(r, c)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self::packed(Kind::Numeric, rows, cols, data)
    }

    /// Column vector.
    pub fn column(values: Vec<f64>) -> Self {
        let n = values.len();
        Self::packed(Kind::Numeric, n, 1, values)
    }

    /// Row vector.
    pub fn row(values: Vec<f64>) -> Self {
        let n = values.len();
        Self::packed(Kind::Numeric, 1, n, values)
    }

    /// Zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Matrix filled with ones.
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 1.0)
    }

    /// Matrix filled with `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self::packed(Kind::Numeric, rows, cols, vec![value; rows * cols])
    }

    /// Matrix of uniform random values in `[0, 1)` from the thread-local
    /// generator.
    pub fn rand(rows: usize, cols: usize) -> Self {
        Self::rand_with(rows, cols, &mut rand::thread_rng())
    }

    /// Matrix of uniform random values in `[0, 1)` drawn from `rng`.
    pub fn rand_with<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self::from_fn(rows, cols, |_, _| rng.gen::<f64>())
    }

    /// `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |r, c| if r == c { 1.0 } else { 0.0 })
    }

    /// Square matrix with `values` on the diagonal.
    pub fn from_diag(values: &[f64]) -> Self {
        let n = values.len();
        Self::from_fn(n, n, |r, c| if r == c { values[r] } else { 0.0 })
    }

    /// Binary matrix from row-major flags.
    ///
    /// # Errors
    /// Returns [`MatrixError::Size`] if there are fewer than `rows * cols` flags.
    pub fn mask_from(rows: usize, cols: usize, flags: Vec<bool>) -> Result<Self> {
        if flags.len() < rows * cols {
            return Err(MatrixError::Size {
                required: rows * cols,
                available: flags.len(),
            });
        }
        Ok(Self::from_parts(
            Buffer::binary(flags),
            (0..rows).map(|r| r * cols).collect(),
            (0..cols).collect(),
        ))
    }
}

// ============================================================================
// Shape and layout
// ============================================================================

impl Matrix {
    /// `(rows, cols)`.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// Number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    /// Returns true if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for `1 × n` and `n × 1` shapes.
    pub fn is_vector(&self) -> bool {
        self.rows.len() == 1 || self.cols.len() == 1
    }

    /// True when rows equal columns.
    pub fn is_square(&self) -> bool {
        self.rows.len() == self.cols.len()
    }

    /// Storage kind.
    #[inline]
    pub fn kind(&self) -> Kind {
        self.buffer.kind()
    }

    /// True for masks.
    #[inline]
    pub fn is_binary(&self) -> bool {
        self.buffer.kind() == Kind::Binary
    }

    /// Buffer offsets of the rows.
    pub fn row_offsets(&self) -> &[usize] {
        &self.rows
    }

    /// Buffer offsets of the columns.
    pub fn col_offsets(&self) -> &[usize] {
        &self.cols
    }

    /// True when both views read and write the same buffer.
    pub fn shares_buffer_with(&self, other: &Matrix) -> bool {
        self.buffer.same_as(&other.buffer)
    }

    #[inline]
    pub(crate) fn value(&self, r: usize, c: usize) -> f64 {
        self.buffer.read(self.rows[r] + self.cols[c])
    }

    #[inline]
    pub(crate) fn write(&self, r: usize, c: usize, value: f64) {
        self.buffer.write(self.rows[r] + self.cols[c], value);
    }
}

// ============================================================================
// Element access
// ============================================================================

impl Matrix {
    /// Element at `(r, c)`. Both indices wrap circularly, so `-1` is the last.
    ///
    /// # Errors
    /// Returns [`MatrixError::IndexOutOfBounds`] on an empty matrix.
    pub fn at(&self, r: isize, c: isize) -> Result<f64> {
        let (h, w) = self.size();
        if h == 0 || w == 0 {
            return Err(MatrixError::IndexOutOfBounds {
                index: if h == 0 { r } else { c },
                len: 0,
            });
        }
        let r = r.rem_euclid(h as isize) as usize;
        let c = c.rem_euclid(w as isize) as usize;
        Ok(self.value(r, c))
    }

    /// Element at row-major linear position `i`, wrapping circularly.
    pub fn at_linear(&self, i: isize) -> Result<f64> {
        let len = self.len();
        if len == 0 {
            return Err(MatrixError::IndexOutOfBounds { index: i, len: 0 });
        }
        let i = i.rem_euclid(len as isize) as usize;
        let w = self.ncols();
        Ok(self.value(i / w, i % w))
    }

    /// View of the selected rows and columns. Shares the buffer.
    ///
    /// # Example
    /// ```
    /// use index_matrix::Matrix;
    ///
    /// let m = Matrix::from_fn(3, 3, |r, c| (r * 3 + c) as f64);
    /// let corners = m.get(vec![0, -1], vec![0, -1]).unwrap();
    /// assert_eq!(corners.to_vec(), vec![0.0, 2.0, 6.0, 8.0]);
    /// ```
    pub fn get(&self, rows: impl Into<Selector>, cols: impl Into<Selector>) -> Result<Matrix> {
        let rp = rows.into().resolve_axis(self.nrows())?;
        let cp = cols.into().resolve_axis(self.ncols())?;
        Ok(Self::from_parts(
            self.buffer.clone(),
            rp.into_iter().map(|r| self.rows[r]).collect(),
            cp.into_iter().map(|c| self.cols[c]).collect(),
        ))
    }

    /// Column-vector view of the selected row-major linear positions.
    ///
    /// `get_linear(":")` flattens the matrix; a binary mask of the same shape
    /// picks the positions where it is non-zero.
    pub fn get_linear(&self, selector: impl Into<Selector>) -> Result<Matrix> {
        let positions = selector.into().resolve_linear(self.size())?;
        let offsets = self.linear_offsets(&positions);
        Ok(Self::from_parts(self.buffer.clone(), offsets, vec![0]))
    }

    fn linear_offsets(&self, positions: &[usize]) -> Vec<usize> {
        let w = self.ncols();
        positions
            .iter()
            .map(|&p| self.rows[p / w] + self.cols[p % w])
            .collect()
    }

    /// Write `value` into the selected cells.
    ///
    /// The source is read in full before the first write, so assigning a
    /// view of this same buffer (a transpose, say) is safe.
    ///
    /// # Errors
    /// Returns [`MatrixError::Assignment`] if a matrix or list value does not
    /// match the selected shape.
    pub fn set(
        &self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
        value: impl Into<Assign>,
    ) -> Result<&Self> {
        let rp = rows.into().resolve_axis(self.nrows())?;
        let cp = cols.into().resolve_axis(self.ncols())?;
        let values = value.into().snapshot((rp.len(), cp.len()))?;
        let mut it = values.into_iter();
        for &r in &rp {
            for &c in &cp {
                if let Some(v) = it.next() {
                    self.write(r, c, v);
                }
            }
        }
        Ok(self)
    }

    /// Replace each selected cell with `f(current, row, col)`, where `row`
    /// and `col` are the cell's coordinates in this view.
    pub fn set_with(
        &self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
        mut f: impl FnMut(f64, usize, usize) -> f64,
    ) -> Result<&Self> {
        let rp = rows.into().resolve_axis(self.nrows())?;
        let cp = cols.into().resolve_axis(self.ncols())?;
        for &r in &rp {
            for &c in &cp {
                self.write(r, c, f(self.value(r, c), r, c));
            }
        }
        Ok(self)
    }

    /// Write `value` into the selected row-major linear positions.
    ///
    /// The selection has shape `(count, 1)`.
    pub fn set_linear(
        &self,
        selector: impl Into<Selector>,
        value: impl Into<Assign>,
    ) -> Result<&Self> {
        let positions = selector.into().resolve_linear(self.size())?;
        let values = value.into().snapshot((positions.len(), 1))?;
        for (offset, v) in self.linear_offsets(&positions).into_iter().zip(values) {
            self.buffer.write(offset, v);
        }
        Ok(self)
    }

    /// Replace each selected linear position with `f(current, row, col)`.
    pub fn set_linear_with(
        &self,
        selector: impl Into<Selector>,
        mut f: impl FnMut(f64, usize, usize) -> f64,
    ) -> Result<&Self> {
        let positions = selector.into().resolve_linear(self.size())?;
        let w = self.ncols();
        for p in positions {
            let (r, c) = (p / w, p % w);
            self.write(r, c, f(self.value(r, c), r, c));
        }
        Ok(self)
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: f64) -> &Self {
        for r in 0..self.nrows() {
            for c in 0..self.ncols() {
                self.write(r, c, value);
            }
        }
        self
    }
}

// ============================================================================
// View transformations
// ============================================================================

impl Matrix {
    /// Transpose (zero-copy): swaps the row and column index arrays.
    #[inline]
    pub fn t(&self) -> Matrix {
        Self::from_parts(self.buffer.clone(), self.cols.clone(), self.rows.clone())
    }

    /// Same as [`Matrix::t`].
    pub fn transpose(&self) -> Matrix {
        self.t()
    }

    /// Column-vector view of the main diagonal, bounded by the shorter side.
    pub fn diagonal_view(&self) -> Matrix {
        let n = self.nrows().min(self.ncols());
        let offsets = (0..n).map(|i| self.rows[i] + self.cols[i]).collect();
        Self::from_parts(self.buffer.clone(), offsets, vec![0])
    }

    /// Diagonal of a matrix, or a diagonal matrix built from a column.
    ///
    /// For a column vector with more than one row a fresh square matrix is
    /// allocated with the column on its diagonal. Anything else, row vectors
    /// included, gives [`Matrix::diagonal_view`].
    pub fn diag(&self) -> Matrix {
        if self.ncols() == 1 && self.nrows() > 1 {
            Self::from_diag(&self.to_vec())
        } else {
            self.diagonal_view()
        }
    }

    /// Write `value` onto the diagonal of this view.
    pub fn set_diag(&self, value: impl Into<Assign>) -> Result<&Self> {
        self.diagonal_view().set(.., .., value)?;
        Ok(self)
    }

    /// View without row `row` and column `col`.
    ///
    /// # Errors
    /// Returns [`MatrixError::IndexOutOfBounds`] if either index is outside
    /// the matrix.
    pub fn minor(&self, row: usize, col: usize) -> Result<Matrix> {
        if row >= self.nrows() {
            return Err(MatrixError::IndexOutOfBounds {
                index: row as isize,
                len: self.nrows(),
            });
        }
        if col >= self.ncols() {
            return Err(MatrixError::IndexOutOfBounds {
                index: col as isize,
                len: self.ncols(),
            });
        }
        Ok(self.minor_view(row, col))
    }

    /// [`Matrix::minor`] for indices already known to be in range.
    pub(crate) fn minor_view(&self, row: usize, col: usize) -> Matrix {
        let keep = |skip: usize| move |(i, &o): (usize, &usize)| (i != skip).then_some(o);
        Self::from_parts(
            self.buffer.clone(),
            self.rows.iter().enumerate().filter_map(keep(row)).collect(),
            self.cols.iter().enumerate().filter_map(keep(col)).collect(),
        )
    }

    /// Exchange rows pairwise: `a[k]` with `b[k]` for each `k`, in order.
    ///
    /// Only this view's row index array changes; the buffer and any other
    /// view of it are untouched.
    ///
    /// # Errors
    /// Returns [`MatrixError::Dimension`] if the two lists differ in length.
    pub fn swap_rows(
        &mut self,
        a: impl Into<Selector>,
        b: impl Into<Selector>,
    ) -> Result<&mut Self> {
        let a = a.into().resolve_axis(self.nrows())?;
        let b = b.into().resolve_axis(self.nrows())?;
        swap_pairs(&mut self.rows, &a, &b)?;
        Ok(self)
    }

    /// Exchange columns pairwise. See [`Matrix::swap_rows`].
    pub fn swap_cols(
        &mut self,
        a: impl Into<Selector>,
        b: impl Into<Selector>,
    ) -> Result<&mut Self> {
        let a = a.into().resolve_axis(self.ncols())?;
        let b = b.into().resolve_axis(self.ncols())?;
        swap_pairs(&mut self.cols, &a, &b)?;
        Ok(self)
    }

    /// Independent copy of the visible contents in a freshly packed buffer.
    ///
    /// The storage kind is kept, so a cloned mask is still a mask.
    pub fn deep_clone(&self) -> Matrix {
        Self::packed(self.kind(), self.nrows(), self.ncols(), self.to_vec())
    }

    /// Equivalent to `get(rows, cols)?.deep_clone()`.
    pub fn clone_select(
        &self,
        rows: impl Into<Selector>,
        cols: impl Into<Selector>,
    ) -> Result<Matrix> {
        Ok(self.get(rows, cols)?.deep_clone())
    }

    /// New numeric matrix with `f` applied to every element.
    pub fn map(&self, mut f: impl FnMut(f64) -> f64) -> Matrix {
        Self::packed(
            Kind::Numeric,
            self.nrows(),
            self.ncols(),
            self.iter().map(&mut f).collect(),
        )
    }
}

fn swap_pairs(index: &mut [usize], a: &[usize], b: &[usize]) -> Result<()> {
    if a.len() != b.len() {
        return Err(MatrixError::Dimension {
            expected: (a.len(), 1),
            found: (b.len(), 1),
        });
    }
    for (&x, &y) in a.iter().zip(b) {
        index.swap(x, y);
    }
    Ok(())
}

// ============================================================================
// Iteration and conversion
// ============================================================================

impl Matrix {
    /// Row-major iterator over the values.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            matrix: self,
            pos: 0,
        }
    }

    /// Lazy iterator over the rows, each as a `Vec`.
    pub fn rows(&self) -> RowIter<'_> {
        RowIter {
            matrix: self,
            next: 0,
        }
    }

    /// Lazy iterator over the columns, each as a `Vec`.
    pub fn cols(&self) -> ColIter<'_> {
        ColIter {
            matrix: self,
            next: 0,
        }
    }

    /// Row-major copy of the values.
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// Values as a list of rows.
    pub fn to_nested(&self) -> Vec<Vec<f64>> {
        self.rows().collect()
    }

    /// Number of non-zero elements; for a mask, the number of selected cells.
    pub fn count_nonzero(&self) -> usize {
        self.iter().filter(|&v| v != 0.0).count()
    }
}

/// Row-major value iterator. See [`Matrix::iter`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    matrix: &'a Matrix,
    pos: usize,
}

impl Iterator for Iter<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.pos >= self.matrix.len() {
            return None;
        }
        let w = self.matrix.ncols();
        let v = self.matrix.value(self.pos / w, self.pos % w);
        self.pos += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.matrix.len().saturating_sub(self.pos);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Iterator over rows. See [`Matrix::rows`].
#[derive(Debug, Clone)]
pub struct RowIter<'a> {
    matrix: &'a Matrix,
    next: usize,
}

impl Iterator for RowIter<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        let r = self.next;
        if r >= self.matrix.nrows() {
            return None;
        }
        self.next += 1;
        Some((0..self.matrix.ncols()).map(|c| self.matrix.value(r, c)).collect())
    }
}

/// Iterator over columns. See [`Matrix::cols`].
#[derive(Debug, Clone)]
pub struct ColIter<'a> {
    matrix: &'a Matrix,
    next: usize,
}

impl Iterator for ColIter<'_> {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Vec<f64>> {
        let c = self.next;
        if c >= self.matrix.ncols() {
            return None;
        }
        self.next += 1;
        Some((0..self.matrix.nrows()).map(|r| self.matrix.value(r, c)).collect())
    }
}

impl<'a> IntoIterator for &'a Matrix {
    type Item = f64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Matrices compare by shape and values, not by buffer identity or kind.
impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.iter().eq(other.iter())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Matrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.nrows()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}
