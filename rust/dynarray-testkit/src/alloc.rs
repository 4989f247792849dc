//! Allocators for exercising allocation failure paths and counting allocator traffic.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use dynarray_alloc::{AlignedBlock, Allocator, HeapAllocator};

/// Decides which requests a [`FailingAllocator`] refuses.
#[derive(Debug, Clone)]
pub enum FailurePolicy {
    /// Every request succeeds (subject to the heap).
    Never,
    /// Every request fails.
    Always,
    /// The next `n` requests succeed, every later one fails.
    After(usize),
    /// Each request fails with the given probability.
    Random { rate: f64, rng: fastrand::Rng },
}

impl FailurePolicy {
    /// Random failures with a reproducible sequence.
    pub fn random(rate: f64, seed: u64) -> FailurePolicy {
        FailurePolicy::Random {
            rate,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn should_fail(&mut self) -> bool {
        match self {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::After(0) => true,
            FailurePolicy::After(n) => {
                *n -= 1;
                false
            }
            FailurePolicy::Random { rate, rng } => rng.f64() < *rate,
        }
    }
}

/// A heap allocator that refuses requests according to a [`FailurePolicy`].
///
/// The policy can be swapped at any time, which lets a test build its fixtures with
/// reliable allocation and then turn failures on for the operation under test.
#[derive(Debug)]
pub struct FailingAllocator {
    heap: HeapAllocator,
    policy: Mutex<FailurePolicy>,
}

impl FailingAllocator {
    pub fn new(policy: FailurePolicy) -> FailingAllocator {
        FailingAllocator {
            heap: HeapAllocator::new(),
            policy: Mutex::new(policy),
        }
    }

    /// An allocator that refuses everything.
    pub fn always() -> FailingAllocator {
        Self::new(FailurePolicy::Always)
    }

    pub fn set_policy(&self, policy: FailurePolicy) {
        *self.policy.lock().expect("policy lock") = policy;
    }
}

impl Allocator for FailingAllocator {
    fn acquire(&self, size: usize) -> Option<AlignedBlock> {
        if self.policy.lock().expect("policy lock").should_fail() {
            log::trace!("failing allocator: refused {size} bytes");
            return None;
        }
        self.heap.acquire(size)
    }

    fn release(&self, block: AlignedBlock) {
        self.heap.release(block);
    }
}

/// Counters maintained by a [`TrackingAllocator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocStats {
    /// Successful acquisitions.
    pub acquired: usize,
    /// Refused acquisitions.
    pub refused: usize,
    /// Releases.
    pub released: usize,
    /// Bytes acquired and not yet released.
    pub outstanding_bytes: usize,
}

impl AllocStats {
    /// Number of blocks acquired and not yet released.
    pub fn live_blocks(&self) -> usize {
        self.acquired - self.released
    }
}

/// Wraps an allocator and records every acquisition and release.
pub struct TrackingAllocator {
    inner: Arc<dyn Allocator>,
    acquired: AtomicUsize,
    refused: AtomicUsize,
    released: AtomicUsize,
    outstanding_bytes: AtomicUsize,
}

impl TrackingAllocator {
    pub fn new(inner: Arc<dyn Allocator>) -> TrackingAllocator {
        TrackingAllocator {
            inner,
            acquired: AtomicUsize::new(0),
            refused: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            outstanding_bytes: AtomicUsize::new(0),
        }
    }

    /// Tracks the default heap allocator.
    pub fn heap() -> TrackingAllocator {
        Self::new(Arc::new(HeapAllocator::new()))
    }

    pub fn stats(&self) -> AllocStats {
        AllocStats {
            acquired: self.acquired.load(Ordering::Acquire),
            refused: self.refused.load(Ordering::Acquire),
            released: self.released.load(Ordering::Acquire),
            outstanding_bytes: self.outstanding_bytes.load(Ordering::Acquire),
        }
    }
}

impl Allocator for TrackingAllocator {
    fn acquire(&self, size: usize) -> Option<AlignedBlock> {
        let block = self.inner.acquire(size);
        if block.is_some() {
            self.acquired.fetch_add(1, Ordering::AcqRel);
            self.outstanding_bytes.fetch_add(size, Ordering::AcqRel);
        } else {
            self.refused.fetch_add(1, Ordering::AcqRel);
        }
        block
    }

    fn release(&self, block: AlignedBlock) {
        self.released.fetch_add(1, Ordering::AcqRel);
        self.outstanding_bytes
            .fetch_sub(block.len(), Ordering::AcqRel);
        self.inner.release(block);
    }
}

impl std::fmt::Debug for TrackingAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
