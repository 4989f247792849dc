use crate::{AlignedBlock, Allocator, counter::Counter};

/// An allocator that bounds the total number of outstanding bytes handed out by an
/// inner allocator.
///
/// Every successful [`acquire`](Allocator::acquire) withdraws the block size from the
/// budget; [`release`](Allocator::release) deposits it back. A request the remaining
/// budget cannot cover fails without touching the inner allocator.
pub struct BudgetAllocator<A> {
    inner: A,
    limit: usize,
    remaining: Counter,
}

impl<A: Allocator> BudgetAllocator<A> {
    /// Creates a budget of `limit` bytes on top of `inner`.
    pub fn new(inner: A, limit: usize) -> BudgetAllocator<A> {
        BudgetAllocator {
            inner,
            limit,
            remaining: Counter::new(limit),
        }
    }

    /// The total budget in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes still available.
    ///
    /// **Note**: primarily for diagnostics; the value may be outdated in a concurrent
    /// environment.
    pub fn remaining(&self) -> usize {
        self.remaining.read()
    }

    /// Bytes currently handed out.
    pub fn outstanding(&self) -> usize {
        self.limit.saturating_sub(self.remaining())
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Allocator> Allocator for BudgetAllocator<A> {
    fn acquire(&self, size: usize) -> Option<AlignedBlock> {
        if !self.remaining.withdraw(size) {
            log::debug!(
                "budget: refused {size} bytes ({} of {} remaining)",
                self.remaining(),
                self.limit
            );
            return None;
        }
        let block = self.inner.acquire(size);
        if block.is_none() {
            self.remaining.deposit(size);
        }
        block
    }

    fn release(&self, block: AlignedBlock) {
        let size = block.len();
        self.inner.release(block);
        self.remaining.deposit(size);
    }
}

impl<A> std::fmt::Debug for BudgetAllocator<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetAllocator")
            .field("limit", &self.limit)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::HeapAllocator;

    #[test]
    fn test_budget_acquire_within_limit() {
        let alloc = BudgetAllocator::new(HeapAllocator::new(), 100);
        let block = alloc.acquire(60).unwrap();
        assert_eq!(block.len(), 60);
        assert_eq!(alloc.remaining(), 40);
        assert_eq!(alloc.outstanding(), 60);
        alloc.release(block);
        assert_eq!(alloc.remaining(), 100);
    }

    #[test]
    fn test_budget_refuses_over_limit() {
        let alloc = BudgetAllocator::new(HeapAllocator::new(), 100);
        let _held = alloc.acquire(80).unwrap();
        assert!(alloc.acquire(30).is_none());
        assert_eq!(alloc.remaining(), 20);
        assert!(alloc.acquire(20).is_some());
    }

    #[test]
    fn test_budget_returns_funds_when_inner_fails() {
        let alloc = BudgetAllocator::new(HeapAllocator::new(), usize::MAX);
        assert!(alloc.acquire(usize::MAX).is_none());
        assert_eq!(alloc.remaining(), usize::MAX);
    }

    #[test]
    fn test_budget_nested() {
        let outer = Arc::new(BudgetAllocator::new(HeapAllocator::new(), 100));
        let inner = BudgetAllocator::new(outer.clone(), 80);
        let a = inner.acquire(50).unwrap();
        assert_eq!(outer.remaining(), 50);
        assert_eq!(inner.remaining(), 30);
        let b = outer.acquire(40).unwrap();
        assert!(inner.acquire(20).is_none());
        assert_eq!(inner.remaining(), 30);
        inner.release(a);
        outer.release(b);
        assert_eq!(outer.remaining(), 100);
        assert_eq!(inner.remaining(), 80);
    }
}
