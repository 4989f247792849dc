//! Allocators that hand out [`AlignedBlock`]s to dynamic containers.
//!
//! An allocator is shared between containers (and possibly threads) as an
//! `Arc<dyn Allocator>`; it is responsible for its own synchronization.

use std::sync::Arc;

pub use dynarray_bytes::AlignedBlock;

pub mod budget;
pub mod counter;
pub mod heap;

pub use budget::BudgetAllocator;
pub use heap::HeapAllocator;

/// A source of memory blocks for dynamic containers.
pub trait Allocator: Send + Sync {
    /// Acquires a zero-filled block of exactly `size` bytes.
    ///
    /// Returns `None` when the request cannot be satisfied. A request never succeeds
    /// partially. `size` must be non-zero.
    fn acquire(&self, size: usize) -> Option<AlignedBlock>;

    /// Returns a block previously obtained from [`Allocator::acquire`] on the same
    /// allocator.
    ///
    /// The block is consumed, so a block cannot be released twice.
    fn release(&self, block: AlignedBlock);
}

impl<A: Allocator + ?Sized> Allocator for Arc<A> {
    fn acquire(&self, size: usize) -> Option<AlignedBlock> {
        self.as_ref().acquire(size)
    }

    fn release(&self, block: AlignedBlock) {
        self.as_ref().release(block)
    }
}

/// Returns a shared instance of the default heap allocator.
pub fn default_allocator() -> Arc<dyn Allocator> {
    Arc::new(HeapAllocator::new())
}
