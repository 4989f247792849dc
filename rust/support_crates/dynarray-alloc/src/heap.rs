use crate::{AlignedBlock, Allocator};

/// Allocates blocks from the global heap.
///
/// Reservation failures (including sizes the heap can never satisfy) are reported as
/// `None` from [`Allocator::acquire`] instead of aborting the process.
#[derive(Debug, Clone, Copy)]
pub struct HeapAllocator {
    alignment: usize,
}

impl HeapAllocator {
    /// Creates a heap allocator producing [`AlignedBlock::DEFAULT_ALIGNMENT`]-aligned blocks.
    pub fn new() -> HeapAllocator {
        HeapAllocator {
            alignment: AlignedBlock::DEFAULT_ALIGNMENT,
        }
    }

    /// Creates a heap allocator with a custom block alignment.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` is not a power of two or exceeds
    /// [`AlignedBlock::MAX_ALIGNMENT`].
    pub fn with_alignment(alignment: usize) -> HeapAllocator {
        assert!(alignment.is_power_of_two() && alignment <= AlignedBlock::MAX_ALIGNMENT);
        HeapAllocator { alignment }
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for HeapAllocator {
    fn acquire(&self, size: usize) -> Option<AlignedBlock> {
        debug_assert_ne!(size, 0);
        let block = AlignedBlock::try_zeroed(size, self.alignment);
        match &block {
            Some(block) => log::trace!("heap: acquired {} bytes at {:p}", size, block.as_ptr()),
            None => log::debug!("heap: failed to acquire {size} bytes"),
        }
        block
    }

    fn release(&self, block: AlignedBlock) {
        log::trace!("heap: released {} bytes at {:p}", block.len(), block.as_ptr());
        drop(block);
    }
}
