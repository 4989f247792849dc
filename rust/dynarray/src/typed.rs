use std::{marker::PhantomData, sync::Arc};

use bytemuck::Pod;
use dynarray_alloc::Allocator;
use dynarray_common::{Result, verify_arg};

use crate::{
    error::CopyError,
    list::{ArrayList, Mode},
};

/// An [`ArrayList`] whose items are values of type `T`.
///
/// The item size is `size_of::<T>()`, so two lists of the same `T` can always take
/// part in the same cross-list operation. Zero-sized `T` is rejected at construction.
///
/// Typed views of a dynamic list rely on the allocator handing out blocks aligned
/// for `T`; the default heap allocator aligns to 64 bytes.
pub struct TypedArrayList<'a, T> {
    inner: ArrayList<'a>,
    _marker: PhantomData<&'a mut [T]>,
}

impl<T: Pod> TypedArrayList<'static, T> {
    /// Creates a dynamic list with room for `initial_capacity` items.
    pub fn new_dynamic(
        allocator: Arc<dyn Allocator>,
        initial_capacity: usize,
    ) -> Result<TypedArrayList<'static, T>> {
        verify_arg!(item_size, std::mem::size_of::<T>() > 0);
        Ok(TypedArrayList {
            inner: ArrayList::new_dynamic(allocator, initial_capacity, std::mem::size_of::<T>())?,
            _marker: PhantomData,
        })
    }
}

impl<'a, T: Pod> TypedArrayList<'a, T> {
    /// Creates an empty fixed list over `buffer`.
    pub fn new_fixed(buffer: &'a mut [T]) -> Result<TypedArrayList<'a, T>> {
        Self::from_initialized(buffer, 0)
    }

    /// Creates a fixed list over `buffer` whose first `len` items are in use.
    pub fn from_initialized(buffer: &'a mut [T], len: usize) -> Result<TypedArrayList<'a, T>> {
        verify_arg!(item_size, std::mem::size_of::<T>() > 0);
        let bytes = bytemuck::cast_slice_mut::<T, u8>(buffer);
        Ok(TypedArrayList {
            inner: ArrayList::from_initialized(bytes, std::mem::size_of::<T>(), len)?,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of items the buffer can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity_items()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.inner.mode()
    }

    /// Returns the items as a slice.
    ///
    /// # Panics
    ///
    /// Panics if a dynamic list's allocator produced a block that is not aligned for `T`.
    pub fn as_slice(&self) -> &[T] {
        let bytes = self.inner.as_bytes();
        if bytes.is_empty() {
            return &[];
        }
        bytemuck::cast_slice(bytes)
    }

    /// Returns the items as a mutable slice.
    ///
    /// # Panics
    ///
    /// Panics if a dynamic list's allocator produced a block that is not aligned for `T`.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let bytes = self.inner.as_bytes_mut();
        if bytes.is_empty() {
            return &mut [];
        }
        bytemuck::cast_slice_mut(bytes)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// See [`ArrayList::ensure_capacity`].
    pub fn ensure_capacity(&mut self, index: usize) -> Result<()> {
        self.inner.ensure_capacity(index)
    }

    /// See [`ArrayList::shrink_to_fit`].
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.inner.shrink_to_fit()
    }

    /// Copies the items of this list into `destination`. See [`ArrayList::copy_into`].
    pub fn copy_into(
        &self,
        destination: &mut TypedArrayList<'_, T>,
    ) -> std::result::Result<(), CopyError> {
        self.inner.copy_into(&mut destination.inner)
    }

    /// Exchanges the contents of two dynamic lists. See [`ArrayList::swap_contents`].
    pub fn swap_contents(&mut self, other: &mut TypedArrayList<'a, T>) {
        self.inner.swap_contents(&mut other.inner);
    }

    pub fn as_erased(&self) -> &ArrayList<'a> {
        &self.inner
    }

    pub fn into_erased(self) -> ArrayList<'a> {
        self.inner
    }
}

impl<T: Pod + std::fmt::Debug> std::fmt::Debug for TypedArrayList<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedArrayList")
            .field("mode", &self.mode())
            .field("items", &self.as_slice())
            .field("capacity", &self.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use dynarray_alloc::default_allocator;

    use super::*;

    #[test]
    fn test_typed_fixed_view() {
        let mut storage = [10u32, 20, 30, 0];
        let list = TypedArrayList::from_initialized(&mut storage, 3).unwrap();
        assert_eq!(list.as_slice(), &[10, 20, 30]);
        assert_eq!(list.capacity(), 4);
        assert_eq!(list.get(1), Some(&20));
        assert_eq!(list.get(3), None);
        assert_eq!(list.as_erased().item_size(), 4);
    }

    #[test]
    fn test_typed_copy_into_dynamic() {
        let mut storage = [1u64, 2, 3];
        let source = TypedArrayList::from_initialized(&mut storage, 3).unwrap();
        let mut destination = TypedArrayList::<u64>::new_dynamic(default_allocator(), 0).unwrap();
        assert!(destination.as_slice().is_empty());

        source.copy_into(&mut destination).unwrap();
        assert_eq!(destination.as_slice(), &[1, 2, 3]);
        assert_eq!(destination.capacity(), 3);
        assert_eq!(destination.mode(), Mode::Dynamic);
    }

    #[test]
    fn test_typed_copy_into_fixed_too_small() {
        let mut src = [1u16, 2, 3];
        let mut dst = [0u16; 2];
        let source = TypedArrayList::from_initialized(&mut src, 3).unwrap();
        let mut destination = TypedArrayList::new_fixed(&mut dst).unwrap();
        assert_eq!(
            source.copy_into(&mut destination),
            Err(CopyError::DestinationTooSmall {
                required: 6,
                capacity: 4
            })
        );
        assert!(destination.is_empty());
    }

    #[test]
    fn test_typed_mut_slice() {
        let mut storage = [0i32; 4];
        let mut list = TypedArrayList::from_initialized(&mut storage, 2).unwrap();
        list.as_mut_slice()[1] = -5;
        assert_eq!(list.as_slice(), &[0, -5]);
        list.clear();
        assert!(list.as_mut_slice().is_empty());
        drop(list);
        assert_eq!(storage, [0, -5, 0, 0]);
    }

    #[test]
    fn test_typed_rejects_zero_sized() {
        let mut storage = [(); 4];
        assert!(TypedArrayList::<()>::new_fixed(&mut storage).is_err());
        assert!(TypedArrayList::<()>::new_dynamic(default_allocator(), 4).is_err());
    }

    #[test]
    fn test_typed_debug() {
        let mut storage = [7u8, 8];
        let list = TypedArrayList::from_initialized(&mut storage, 2).unwrap();
        let s = format!("{list:?}");
        assert!(s.contains("[7, 8]"));
    }

    #[test]
    fn test_typed_grow_and_shrink() {
        let mut list = TypedArrayList::<u32>::new_dynamic(default_allocator(), 2).unwrap();
        list.ensure_capacity(9).unwrap();
        assert_eq!(list.capacity(), 10);
        list.shrink_to_fit().unwrap();
        assert_eq!(list.capacity(), 0);
        let erased = list.into_erased();
        assert!(erased.is_valid());
    }

    #[test]
    fn test_typed_copy_into_result() {
        let mut storage = [3u16, 4];
        let source = TypedArrayList::from_initialized(&mut storage, 2).unwrap();
        let mut destination = TypedArrayList::<u16>::new_dynamic(default_allocator(), 1).unwrap();
        let copied: std::result::Result<(), CopyError> = source.copy_into(&mut destination);
        assert_eq!(copied, Ok(()));
        assert_eq!(destination.as_slice(), &[3, 4]);
    }

    #[test]
    fn test_typed_swap_contents() {
        let mut a = TypedArrayList::<u32>::new_dynamic(default_allocator(), 4).unwrap();
        let mut b = TypedArrayList::<u32>::new_dynamic(default_allocator(), 0).unwrap();
        let mut storage = [9u32];
        TypedArrayList::from_initialized(&mut storage, 1)
            .unwrap()
            .copy_into(&mut b)
            .unwrap();
        a.swap_contents(&mut b);
        assert_eq!(a.as_slice(), &[9]);
        assert_eq!(b.capacity(), 4);
        assert!(b.is_empty());
    }
}
