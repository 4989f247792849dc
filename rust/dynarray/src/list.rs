use std::sync::Arc;

use dynarray_alloc::{AlignedBlock, Allocator};
use dynarray_common::{Result, arith, error::Error, verify_arg};

/// Ownership mode of an [`ArrayList`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The buffer is borrowed from the caller and never reallocated or freed.
    Fixed,
    /// The buffer is owned by the list and obtained from an allocator.
    Dynamic,
}

/// Backing storage of a list.
pub(crate) enum Storage<'a> {
    Fixed(&'a mut [u8]),
    Dynamic {
        allocator: Arc<dyn Allocator>,
        /// `Some` only while the block holds at least one byte.
        block: Option<AlignedBlock>,
    },
}

impl Storage<'_> {
    /// The whole buffer, `capacity` bytes long.
    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Storage::Fixed(buf) => &buf[..],
            Storage::Dynamic { block, .. } => block.as_deref().unwrap_or_default(),
        }
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Storage::Fixed(buf) => &mut buf[..],
            Storage::Dynamic { block, .. } => block.as_deref_mut().unwrap_or_default(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.bytes().len()
    }

    pub(crate) fn mode(&self) -> Mode {
        match self {
            Storage::Fixed(_) => Mode::Fixed,
            Storage::Dynamic { .. } => Mode::Dynamic,
        }
    }
}

/// A contiguous, type-erased sequence of equally sized items.
///
/// The list tracks its logical length in items and its capacity in bytes. The
/// following holds before and after every public operation:
///
/// - `len() * item_size() <= capacity_bytes()`, with the product never overflowing;
/// - `item_size()` is non-zero and never changes;
/// - a list with zero capacity holds no allocation, and a list with non-zero
///   capacity always has a buffer of that size;
/// - a [`Mode::Fixed`] list keeps its capacity for its whole lifetime.
///
/// See [`ArrayList::is_valid`].
pub struct ArrayList<'a> {
    pub(crate) storage: Storage<'a>,
    pub(crate) length: usize,
    pub(crate) item_size: usize,
}

impl ArrayList<'static> {
    /// Creates a dynamic list drawing its memory from `allocator`.
    ///
    /// When `initial_item_allocation` is non-zero, a block for that many items is
    /// acquired right away; otherwise nothing is allocated until the list grows.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `item_size` is zero.
    /// - `SizeOverflow` if the initial byte size does not fit in `usize`.
    /// - `AllocationFailed` if the allocator refuses the initial block.
    pub fn new_dynamic(
        allocator: Arc<dyn Allocator>,
        initial_item_allocation: usize,
        item_size: usize,
    ) -> Result<ArrayList<'static>> {
        verify_arg!(item_size, item_size > 0);
        let size = arith::mul_size(initial_item_allocation, item_size)?;
        let block = if size > 0 {
            Some(
                allocator
                    .acquire(size)
                    .ok_or_else(|| Error::allocation_failed(size))?,
            )
        } else {
            None
        };
        Ok(ArrayList {
            storage: Storage::Dynamic { allocator, block },
            length: 0,
            item_size,
        })
    }
}

impl<'a> ArrayList<'a> {
    /// Creates an empty fixed list over caller-supplied storage.
    ///
    /// The capacity is `buffer.len()` bytes and never changes. The buffer is handed
    /// back to the caller, untouched beyond what list operations wrote, when the list
    /// goes out of scope.
    pub fn new_fixed(buffer: &'a mut [u8], item_size: usize) -> Result<ArrayList<'a>> {
        Self::from_initialized(buffer, item_size, 0)
    }

    /// Creates a fixed list over caller-supplied storage whose first `length` items
    /// are already initialized.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `item_size` is zero or `length` items do not fit.
    /// - `SizeOverflow` if `length * item_size` does not fit in `usize`.
    pub fn from_initialized(
        buffer: &'a mut [u8],
        item_size: usize,
        length: usize,
    ) -> Result<ArrayList<'a>> {
        verify_arg!(item_size, item_size > 0);
        let used = arith::mul_size(length, item_size)?;
        verify_arg!(length, used <= buffer.len());
        Ok(ArrayList {
            storage: Storage::Fixed(buffer),
            length,
            item_size,
        })
    }

    /// Number of items in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Size of a single item in bytes.
    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Size of the buffer in bytes.
    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.storage.capacity()
    }

    /// Number of whole items the buffer can hold.
    #[inline]
    pub fn capacity_items(&self) -> usize {
        self.capacity_bytes() / self.item_size
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.storage.mode()
    }

    /// Checks the structural invariants of the list.
    ///
    /// Always `true` for lists built and mutated through this API; intended for
    /// assertions and property checks.
    pub fn is_valid(&self) -> bool {
        let Some(required) = arith::mul_checked(self.length, self.item_size) else {
            return false;
        };
        let buffer_is_valid = match &self.storage {
            Storage::Fixed(_) => true,
            Storage::Dynamic { block, .. } => block.as_ref().is_none_or(|b| !b.is_empty()),
        };
        self.item_size != 0 && self.capacity_bytes() >= required && buffer_is_valid
    }

    /// The `len() * item_size()` bytes holding the items.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.bytes()[..self.length * self.item_size]
    }

    /// Mutable access to the bytes holding the items.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let used = self.length * self.item_size;
        &mut self.storage.bytes_mut()[..used]
    }

    /// The whole buffer, including bytes past the last item.
    pub fn buffer(&self) -> &[u8] {
        self.storage.bytes()
    }

    /// Returns the bytes of the item at `index`, or `None` if out of bounds.
    pub fn get_at(&self, index: usize) -> Option<&[u8]> {
        if index >= self.length {
            return None;
        }
        let start = index * self.item_size;
        Some(&self.storage.bytes()[start..start + self.item_size])
    }

    /// Returns the mutable bytes of the item at `index`, or `None` if out of bounds.
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.length {
            return None;
        }
        let start = index * self.item_size;
        let item_size = self.item_size;
        Some(&mut self.storage.bytes_mut()[start..start + item_size])
    }

    /// Removes all items. The buffer and its capacity are kept.
    pub fn clear(&mut self) {
        self.length = 0;
    }

    /// Makes sure the buffer can hold an item at `index`.
    ///
    /// A dynamic list that is too small grows to the larger of the required size and
    /// twice its current capacity; existing buffer contents are preserved. The length
    /// is not changed.
    ///
    /// # Errors
    ///
    /// - `SizeOverflow` if `(index + 1) * item_size` does not fit in `usize`.
    /// - `CapacityExceeded` if the list is fixed and too small.
    /// - `AllocationFailed` if the allocator refuses the new block; the list is left
    ///   unchanged.
    pub fn ensure_capacity(&mut self, index: usize) -> Result<()> {
        let count = arith::add_checked(index, 1).ok_or_else(Error::size_overflow)?;
        let required = arith::mul_size(count, self.item_size)?;
        let capacity = self.capacity_bytes();
        if capacity >= required {
            return Ok(());
        }

        match &mut self.storage {
            Storage::Fixed(_) => Err(Error::capacity_exceeded(required, capacity)),
            Storage::Dynamic { allocator, block } => {
                let new_size =
                    arith::mul_checked(capacity, 2).map_or(required, |doubled| doubled.max(required));
                let mut new_block = allocator
                    .acquire(new_size)
                    .ok_or_else(|| Error::allocation_failed(new_size))?;
                debug_assert_eq!(
                    new_block.len(),
                    new_size,
                    "allocator returned a wrong-sized block"
                );
                if let Some(old) = block.take() {
                    new_block[..old.len()].copy_from_slice(&old);
                    allocator.release(old);
                }
                *block = Some(new_block);
                Ok(())
            }
        }
    }

    /// Shrinks a dynamic list's buffer to exactly `len() * item_size()` bytes.
    ///
    /// An empty list gives its block back to the allocator and ends up with zero
    /// capacity.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if the list is fixed.
    /// - `AllocationFailed` if the smaller block cannot be acquired; the list is left
    ///   unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        let used = self.length * self.item_size;
        match &mut self.storage {
            Storage::Fixed(_) => Err(Error::invalid_operation("shrink_to_fit on a fixed list")),
            Storage::Dynamic { allocator, block } => {
                let capacity = block.as_ref().map_or(0, |b| b.len());
                if capacity == used {
                    return Ok(());
                }
                if used == 0 {
                    if let Some(old) = block.take() {
                        allocator.release(old);
                    }
                    return Ok(());
                }
                let mut new_block = allocator
                    .acquire(used)
                    .ok_or_else(|| Error::allocation_failed(used))?;
                debug_assert_eq!(
                    new_block.len(),
                    used,
                    "allocator returned a wrong-sized block"
                );
                if let Some(old) = block.take() {
                    new_block.copy_from_slice(&old[..used]);
                    allocator.release(old);
                }
                *block = Some(new_block);
                Ok(())
            }
        }
    }

    /// Exchanges the contents (items and owned blocks) of two dynamic lists.
    ///
    /// Each block moves together with the allocator it came from, so the lists may use
    /// different allocators.
    ///
    /// # Panics
    ///
    /// Panics if the item sizes differ or either list is fixed.
    pub fn swap_contents(&mut self, other: &mut ArrayList<'a>) {
        assert_eq!(
            self.item_size, other.item_size,
            "swap_contents between lists with different item sizes"
        );
        assert!(
            self.mode() == Mode::Dynamic && other.mode() == Mode::Dynamic,
            "swap_contents requires two dynamic lists"
        );
        std::mem::swap(&mut self.storage, &mut other.storage);
        std::mem::swap(&mut self.length, &mut other.length);
    }
}

impl Drop for ArrayList<'_> {
    fn drop(&mut self) {
        if let Storage::Dynamic { allocator, block } = &mut self.storage {
            if let Some(block) = block.take() {
                allocator.release(block);
            }
        }
    }
}

impl std::fmt::Debug for ArrayList<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayList")
            .field("mode", &self.mode())
            .field("len", &self.length)
            .field("item_size", &self.item_size)
            .field("capacity_bytes", &self.capacity_bytes())
            .finish_non_exhaustive()
    }
}
