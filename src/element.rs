//! Storage element bound for matrix buffers.

use num_traits::{One, Zero};

/// Element types a buffer can store.
///
/// Matrices always read and write through `f64`; the storage type only
/// decides how a written value is kept. Numeric buffers store `f64` as-is,
/// binary buffers store `u8` and coerce every non-zero value to `1`.
pub trait Element: Copy + Zero + One + PartialEq + std::fmt::Debug + 'static {
    /// Widen a stored value for reading.
    fn to_f64(self) -> f64;

    /// Narrow a value for storage.
    fn from_f64(value: f64) -> Self;
}

impl Element for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Element for u8 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    /// `0.0` and `-0.0` become `0`; anything else, NaN included, becomes `1`.
    #[inline]
    fn from_f64(value: f64) -> Self {
        if value == 0.0 {
            Self::zero()
        } else {
            Self::one()
        }
    }
}
