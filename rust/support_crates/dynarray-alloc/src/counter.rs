use std::sync::atomic::{AtomicUsize, Ordering};

/// A thread-safe byte counter supporting conditional withdrawal and unconditional
/// deposit. The value never goes below zero.
pub struct Counter(AtomicUsize);

impl Counter {
    /// Creates a new `Counter` holding `amount`.
    pub fn new(amount: usize) -> Counter {
        Counter(AtomicUsize::new(amount))
    }

    /// Attempts to withdraw `amount` from the counter.
    ///
    /// Succeeds only if the current value covers the whole `amount`; otherwise the
    /// counter is left unchanged and `false` is returned.
    pub fn withdraw(&self, amount: usize) -> bool {
        let mut current = self.0.load(Ordering::Relaxed);
        while current >= amount {
            match self.0.compare_exchange_weak(
                current,
                current - amount,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current = updated,
            }
        }
        false
    }

    /// Adds `amount` to the counter.
    pub fn deposit(&self, amount: usize) {
        self.0.fetch_add(amount, Ordering::Release);
    }

    /// Returns the counter value (most likely stale by the time it is observed by the caller).
    pub fn read(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Counter").field(&self.read()).finish()
    }
}
