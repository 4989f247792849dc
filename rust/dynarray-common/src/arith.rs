//! Overflow-checked size arithmetic.
//!
//! Byte sizes in this workspace are always derived through these helpers rather than
//! the native operators, so a wrapped product can never reach an allocation or a copy.

use crate::{Result, error::Error};

/// Multiplies two sizes, returning `None` if the product does not fit in `usize`.
///
/// # Examples
///
/// ```
/// use dynarray_common::arith::mul_checked;
///
/// assert_eq!(mul_checked(5, 4), Some(20));
/// assert_eq!(mul_checked(0, usize::MAX), Some(0));
/// assert_eq!(mul_checked(usize::MAX, 2), None);
/// ```
#[inline]
pub fn mul_checked(a: usize, b: usize) -> Option<usize> {
    a.checked_mul(b)
}

/// Adds two sizes, returning `None` if the sum does not fit in `usize`.
#[inline]
pub fn add_checked(a: usize, b: usize) -> Option<usize> {
    a.checked_add(b)
}

/// Multiplies two sizes, reporting overflow as [`ErrorKind::SizeOverflow`].
///
/// [`ErrorKind::SizeOverflow`]: crate::error::ErrorKind::SizeOverflow
#[inline]
pub fn mul_size(a: usize, b: usize) -> Result<usize> {
    mul_checked(a, b).ok_or_else(Error::size_overflow)
}
