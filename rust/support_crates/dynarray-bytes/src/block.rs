use crate::align::{checked_align_up, is_aligned};

/// A fixed-length, zero-initialized byte block whose first byte is aligned to a
/// power-of-two boundary.
///
/// Unlike a growable vector, a block never changes its length after creation: it is
/// the unit handed out and taken back by an allocator. Creation goes through a
/// fallible reservation, so running out of memory yields `None` rather than aborting
/// the process.
pub struct AlignedBlock {
    /// The underlying byte vector, may include padding at start.
    inner: Vec<u8>,
    /// Offset from start of inner vec to the aligned data.
    start: u32,
    /// Alignment requested at creation.
    alignment: u32,
}

impl AlignedBlock {
    /// Default alignment of blocks handed out by the heap allocator.
    pub const DEFAULT_ALIGNMENT: usize = 64;
    /// Largest alignment a block can be created with.
    pub const MAX_ALIGNMENT: usize = 4096;

    /// Attempts to create a zero-filled block of exactly `len` bytes, aligned to
    /// `alignment`.
    ///
    /// Returns `None` if the padded size overflows or the memory cannot be reserved.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or exceeds [`Self::MAX_ALIGNMENT`].
    pub fn try_zeroed(len: usize, alignment: usize) -> Option<AlignedBlock> {
        let alignment = alignment.max(1);
        assert!(alignment.is_power_of_two() && alignment <= Self::MAX_ALIGNMENT);

        if len == 0 {
            return Some(AlignedBlock {
                inner: Vec::new(),
                start: 0,
                alignment: alignment as u32,
            });
        }

        let reserve = len.checked_add(alignment - 1)?;
        let mut inner = Vec::<u8>::new();
        inner.try_reserve_exact(reserve).ok()?;

        let p = inner.as_ptr() as usize;
        let start = checked_align_up(p, alignment)? - p;
        // Stays within the reservation: start < alignment.
        inner.resize(start + len, 0);
        debug_assert_eq!(inner.as_ptr() as usize, p);

        let block = AlignedBlock {
            inner,
            start: start as u32,
            alignment: alignment as u32,
        };
        debug_assert!(block.is_aligned_at(0, alignment));
        Some(block)
    }

    /// Returns the number of bytes in the block.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len() - self.start_offset()
    }

    /// Returns `true` if the block holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the alignment the block was created with.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment as usize
    }

    /// Returns a raw pointer to the first byte of the block.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    /// Returns the block contents.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner[self.start_offset()..]
    }

    /// Returns the block contents as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let start = self.start_offset();
        &mut self.inner[start..]
    }

    /// Checks if the block is aligned to the specified alignment at the given offset.
    ///
    /// # Panics
    ///
    /// Panics if the offset is greater than the block's length.
    pub fn is_aligned_at(&self, offset: usize, alignment: usize) -> bool {
        assert!(offset <= self.len());
        alignment.is_power_of_two() && is_aligned(self.as_ptr() as usize + offset, alignment)
    }

    #[inline]
    fn start_offset(&self) -> usize {
        self.start as usize
    }
}

impl std::ops::Deref for AlignedBlock {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for AlignedBlock {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl std::fmt::Debug for AlignedBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBlock")
            .field("len", &self.len())
            .field("alignment", &self.alignment)
            .field("internal_offset", &self.start)
            .field("internal_cap", &self.inner.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_zero_length_owns_nothing() {
        let block = AlignedBlock::try_zeroed(0, 64).unwrap();
        assert!(block.is_empty());
        assert_eq!(block.as_slice(), &[] as &[u8]);
        assert_eq!(block.alignment(), 64);
    }

    #[test]
    fn test_block_zeroed_exact_length() {
        for len in [1, 3, 63, 64, 65, 1000] {
            let block = AlignedBlock::try_zeroed(len, 64).unwrap();
            assert_eq!(block.len(), len);
            assert!(block.iter().all(|&b| b == 0));
            assert!(block.is_aligned_at(0, 64));
        }
    }

    #[test]
    fn test_block_alignment_guarantees() {
        for alignment in [1, 2, 8, 16, 64, 128, 4096] {
            let block = AlignedBlock::try_zeroed(100, alignment).unwrap();
            assert!(block.is_aligned_at(0, alignment));
            assert_eq!(block.alignment(), alignment);
        }
    }

    #[test]
    fn test_block_aligned_at_offsets() {
        let block = AlignedBlock::try_zeroed(100, 128).unwrap();
        assert!(block.is_aligned_at(0, 128));
        assert!(block.is_aligned_at(64, 64));
        assert!(block.is_aligned_at(2, 2));
        assert!(!block.is_aligned_at(2, 128));
        assert!(!block.is_aligned_at(2, 4));
    }

    #[test]
    fn test_block_deref_mut() {
        let mut block = AlignedBlock::try_zeroed(3, 8).unwrap();
        block[1] = 7;
        assert_eq!(&*block, &[0, 7, 0]);
    }

    #[test]
    fn test_block_oversized_request_fails() {
        assert!(AlignedBlock::try_zeroed(usize::MAX, 64).is_none());
        assert!(AlignedBlock::try_zeroed(usize::MAX - 8, 64).is_none());
        assert!(AlignedBlock::try_zeroed(isize::MAX as usize, 1).is_none());
    }

    #[test]
    #[should_panic]
    fn test_block_rejects_non_power_of_two_alignment() {
        let _ = AlignedBlock::try_zeroed(8, 48);
    }

    #[test]
    fn test_block_debug_format() {
        let block = AlignedBlock::try_zeroed(10, 64).unwrap();
        let debug_str = format!("{block:?}");
        assert!(debug_str.contains("len"));
        assert!(debug_str.contains("alignment"));
        assert!(debug_str.contains("internal_offset"));
    }

    #[test]
    fn test_block_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AlignedBlock>();
    }
}
