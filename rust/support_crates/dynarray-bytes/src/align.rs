/// Aligns a number up to the next multiple of the specified alignment, returning
/// `None` if the result does not fit in `usize`.
///
/// ```
/// use dynarray_bytes::align::checked_align_up;
///
/// assert_eq!(checked_align_up(9, 8), Some(16));
/// assert_eq!(checked_align_up(usize::MAX, 8), None);
/// ```
#[inline]
pub fn checked_align_up(n: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    Some(n.checked_add(alignment - 1)? & !(alignment - 1))
}

/// Checks if a number is a multiple of the specified power-of-two alignment.
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    (n & (alignment - 1)) == 0
}
