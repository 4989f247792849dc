use dynarray_common::arith;

use crate::{
    error::CopyError,
    list::{ArrayList, Storage},
};

/// Copies the items of `source` into `destination`, replacing its contents.
///
/// Equivalent to [`ArrayList::copy_into`].
pub fn copy(source: &ArrayList<'_>, destination: &mut ArrayList<'_>) -> Result<(), CopyError> {
    source.copy_into(destination)
}

impl ArrayList<'_> {
    /// Copies the items of this list into `destination`, replacing its contents.
    ///
    /// - If the destination buffer already holds `len() * item_size()` bytes, the items
    ///   are copied in place and its capacity is kept.
    /// - Otherwise a dynamic destination acquires a block of exactly that size, copies
    ///   the items into it and returns its previous block to the allocator.
    /// - A fixed destination that is too small is rejected.
    ///
    /// On success `destination.len() == self.len()`. On failure neither list is
    /// modified and nothing is allocated or released. This list is never modified.
    ///
    /// # Panics
    ///
    /// Panics if the item sizes of the two lists differ.
    pub fn copy_into(&self, destination: &mut ArrayList<'_>) -> Result<(), CopyError> {
        assert_eq!(
            self.item_size, destination.item_size,
            "copy between lists with different item sizes"
        );

        let required = arith::mul_checked(self.length, self.item_size).ok_or(
            CopyError::SizeOverflow {
                length: self.length,
                item_size: self.item_size,
            },
        )?;
        debug_assert!(self.is_valid());
        debug_assert!(destination.is_valid());

        let capacity = destination.capacity_bytes();
        if capacity >= required {
            destination.storage.bytes_mut()[..required]
                .copy_from_slice(&self.storage.bytes()[..required]);
            destination.length = self.length;
            return Ok(());
        }

        match &mut destination.storage {
            Storage::Fixed(_) => Err(CopyError::DestinationTooSmall { required, capacity }),
            Storage::Dynamic { allocator, block } => {
                let mut new_block = allocator
                    .acquire(required)
                    .ok_or(CopyError::AllocationFailed {
                        requested: required,
                    })?;
                debug_assert_eq!(
                    new_block.len(),
                    required,
                    "allocator returned a wrong-sized block"
                );
                new_block.copy_from_slice(&self.storage.bytes()[..required]);
                if let Some(old) = block.replace(new_block) {
                    allocator.release(old);
                }
                destination.length = self.length;
                debug_assert!(destination.is_valid());
                Ok(())
            }
        }
    }
}
