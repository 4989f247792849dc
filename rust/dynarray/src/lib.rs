//! A capacity-tracked, type-erased dynamic array ("array list").
//!
//! An [`ArrayList`] stores `len()` items of a fixed `item_size()` in a contiguous byte
//! buffer whose size in bytes is its capacity. The buffer comes from one of two places:
//!
//! - **Fixed** mode wraps storage borrowed from the caller. The list never reallocates
//!   or frees it, and its capacity never changes.
//! - **Dynamic** mode owns a block obtained from an [`Allocator`]. The list allocates
//!   lazily, may replace its block when it needs to grow, and returns the block to the
//!   allocator when dropped.
//!
//! [`TypedArrayList`] layers a compile-time element type over the erased list, which
//! rules out item-size mismatches between lists of the same element type.
//!
//! # Example
//!
//! ```
//! use dynarray::{ArrayList, copy, default_allocator};
//!
//! let mut storage = [1u8, 0, 2, 0, 3, 0];
//! let source = ArrayList::from_initialized(&mut storage, 2, 3).unwrap();
//! let mut destination = ArrayList::new_dynamic(default_allocator(), 0, 2).unwrap();
//!
//! copy(&source, &mut destination).unwrap();
//! assert_eq!(destination.len(), 3);
//! assert_eq!(destination.capacity_bytes(), 6);
//! assert_eq!(destination.as_bytes(), source.as_bytes());
//! ```

mod copy;
mod error;
mod list;
mod typed;


pub use copy::copy;
pub use error::CopyError;
pub use list::{ArrayList, Mode};
pub use typed::TypedArrayList;

pub use dynarray_alloc::{
    AlignedBlock, Allocator, BudgetAllocator, HeapAllocator, default_allocator,
};
pub use dynarray_common::{
    Result,
    error::{Error, ErrorKind},
};
