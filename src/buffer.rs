//! Shared flat storage behind every matrix view.
//!
//! A buffer has a fixed length from the moment it is allocated; only its
//! element values change. It is shared by `Rc` between every view derived
//! from it, and elements sit in `Cell`s so any view can write without a
//! borrow flag. Writes are visible through every aliasing view.

use std::cell::Cell;
use std::rc::Rc;

use crate::element::Element;

/// Storage kind of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// 64-bit float storage.
    Numeric,
    /// One byte per element, values restricted to 0 and 1.
    Binary,
}

/// Reference-counted, fixed-size storage.
#[derive(Debug)]
pub(crate) struct Storage<T: Element> {
    cells: Rc<[Cell<T>]>,
}

impl<T: Element> Clone for Storage<T> {
    fn clone(&self) -> Self {
        Self {
            cells: Rc::clone(&self.cells),
        }
    }
}

impl<T: Element> Storage<T> {
    pub(crate) fn zeroed(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| Cell::new(T::zero())).collect(),
        }
    }

    pub(crate) fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            cells: values.into_iter().map(Cell::new).collect(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub(crate) fn read(&self, offset: usize) -> f64 {
        self.cells[offset].get().to_f64()
    }

    #[inline]
    pub(crate) fn write(&self, offset: usize, value: f64) {
        self.cells[offset].set(T::from_f64(value));
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cells, &other.cells)
    }
}

/// Buffer handle held by a view.
#[derive(Debug, Clone)]
pub(crate) enum Buffer {
    Numeric(Storage<f64>),
    Binary(Storage<u8>),
}

impl Buffer {
    pub(crate) fn zeroed(kind: Kind, len: usize) -> Self {
        match kind {
            Kind::Numeric => Buffer::Numeric(Storage::zeroed(len)),
            Kind::Binary => Buffer::Binary(Storage::zeroed(len)),
        }
    }

    pub(crate) fn numeric(values: impl IntoIterator<Item = f64>) -> Self {
        Buffer::Numeric(Storage::from_values(values))
    }

    pub(crate) fn binary(values: impl IntoIterator<Item = bool>) -> Self {
        Buffer::Binary(Storage::from_values(values.into_iter().map(u8::from)))
    }

    #[inline]
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Buffer::Numeric(_) => Kind::Numeric,
            Buffer::Binary(_) => Kind::Binary,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        match self {
            Buffer::Numeric(s) => s.len(),
            Buffer::Binary(s) => s.len(),
        }
    }

    #[inline]
    pub(crate) fn read(&self, offset: usize) -> f64 {
        match self {
            Buffer::Numeric(s) => s.read(offset),
            Buffer::Binary(s) => s.read(offset),
        }
    }

    #[inline]
    pub(crate) fn write(&self, offset: usize, value: f64) {
        match self {
            Buffer::Numeric(s) => s.write(offset, value),
            Buffer::Binary(s) => s.write(offset, value),
        }
    }

    /// True when both handles point at the same allocation.
    pub(crate) fn same_as(&self, other: &Buffer) -> bool {
        match (self, other) {
            (Buffer::Numeric(a), Buffer::Numeric(b)) => a.ptr_eq(b),
            (Buffer::Binary(a), Buffer::Binary(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
