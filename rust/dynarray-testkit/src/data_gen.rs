//! Generation of arbitrary, bounded, valid lists.
//!
//! A [`ListShape`] describes a list (item size, length, capacity, mode) without owning
//! any memory; [`build`] turns it into an [`ArrayList`] with random contents. Fixed
//! lists borrow a caller-provided backing vector, dynamic lists allocate from the
//! given allocator.

use std::sync::Arc;

use dynarray::{ArrayList, Mode};
use dynarray_alloc::Allocator;
use dynarray_common::arith;

/// Upper bounds for generated lists.
///
/// Generation assumes [`ListBounds::max_list_bytes`] is `Some`; [`CheckConfig`]
/// validates that before a run.
///
/// [`CheckConfig`]: crate::props::CheckConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListBounds {
    /// Largest item size in bytes (at least 1).
    pub max_item_size: usize,
    /// Largest number of items in a list, and largest extra capacity in items.
    pub max_items: usize,
}

impl Default for ListBounds {
    fn default() -> Self {
        ListBounds {
            max_item_size: 2,
            max_items: 64,
        }
    }
}

impl ListBounds {
    /// Largest buffer a generated list can have: `max_items` items in use, as many
    /// spare items again, and up to `max_item_size - 1` trailing bytes.
    ///
    /// `None` if that size does not fit in `usize`.
    pub fn max_list_bytes(&self) -> Option<usize> {
        let items = arith::mul_checked(self.max_items, 2)?;
        let items = arith::add_checked(items, 1)?;
        arith::mul_checked(items, self.max_item_size)
    }
}

/// The observable shape of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListShape {
    pub item_size: usize,
    pub length: usize,
    pub capacity_bytes: usize,
    pub mode: Mode,
}

impl ListShape {
    /// Bytes occupied by the items.
    pub fn used_bytes(&self) -> usize {
        self.length * self.item_size
    }
}

/// Generates a valid shape with the given item size.
///
/// The capacity is exactly the used size about a quarter of the time, which keeps
/// the "destination exactly large enough" boundary well covered. Dynamic shapes
/// always have a capacity that is a whole number of items; fixed shapes may carry
/// trailing bytes.
pub fn arbitrary_shape(rng: &mut fastrand::Rng, bounds: &ListBounds, item_size: usize) -> ListShape {
    let length = rng.usize(0..=bounds.max_items);
    let mode = if rng.bool() { Mode::Fixed } else { Mode::Dynamic };
    let used = length * item_size;
    let capacity_bytes = if rng.u8(0..4) == 0 {
        used
    } else {
        let extra_items = rng.usize(0..=bounds.max_items);
        match mode {
            Mode::Dynamic => used + extra_items * item_size,
            Mode::Fixed => used + extra_items * item_size + rng.usize(0..item_size),
        }
    };
    ListShape {
        item_size,
        length,
        capacity_bytes,
        mode,
    }
}

/// Generates a source/destination pair of shapes sharing one item size.
pub fn arbitrary_pair(rng: &mut fastrand::Rng, bounds: &ListBounds) -> (ListShape, ListShape) {
    let item_size = rng.usize(1..=bounds.max_item_size.max(1));
    (
        arbitrary_shape(rng, bounds, item_size),
        arbitrary_shape(rng, bounds, item_size),
    )
}

/// Builds a list of the given shape filled with random bytes.
///
/// Fixed lists use `backing` as their storage (it is resized to the capacity).
/// Dynamic lists allocate exactly `capacity_bytes` from `allocator` and leave
/// `backing` empty.
pub fn build<'a>(
    shape: &ListShape,
    backing: &'a mut Vec<u8>,
    allocator: Arc<dyn Allocator>,
    rng: &mut fastrand::Rng,
) -> dynarray::Result<ArrayList<'a>> {
    backing.clear();
    match shape.mode {
        Mode::Fixed => {
            backing.extend((0..shape.capacity_bytes).map(|_| rng.u8(..)));
            ArrayList::from_initialized(backing, shape.item_size, shape.length)
        }
        Mode::Dynamic => {
            debug_assert_eq!(shape.capacity_bytes % shape.item_size, 0);
            let mut list = ArrayList::new_dynamic(
                allocator,
                shape.capacity_bytes / shape.item_size,
                shape.item_size,
            )?;
            let mut content = (0..shape.used_bytes())
                .map(|_| rng.u8(..))
                .collect::<Vec<_>>();
            let initialized = ArrayList::from_initialized(&mut content, shape.item_size, shape.length)?;
            initialized.copy_into(&mut list)?;
            Ok(list)
        }
    }
}

/// Returns the shape of an existing list.
pub fn shape_of(list: &ArrayList<'_>) -> ListShape {
    ListShape {
        item_size: list.item_size(),
        length: list.len(),
        capacity_bytes: list.capacity_bytes(),
        mode: list.mode(),
    }
}

#[cfg(test)]
mod tests {
    use dynarray::default_allocator;

    use super::*;

    #[test]
    fn test_shapes_are_bounded_and_valid() {
        let mut rng = fastrand::Rng::with_seed(5012);
        let bounds = ListBounds {
            max_item_size: 8,
            max_items: 20,
        };
        for _ in 0..500 {
            let (a, b) = arbitrary_pair(&mut rng, &bounds);
            assert_eq!(a.item_size, b.item_size);
            for shape in [a, b] {
                assert!((1..=8).contains(&shape.item_size));
                assert!(shape.length <= 20);
                assert!(shape.capacity_bytes >= shape.used_bytes());
                if shape.mode == Mode::Dynamic {
                    assert_eq!(shape.capacity_bytes % shape.item_size, 0);
                }
            }
        }
    }

    #[test]
    fn test_max_list_bytes() {
        assert_eq!(ListBounds::default().max_list_bytes(), Some(129 * 2));
        let huge = ListBounds {
            max_item_size: 2,
            max_items: usize::MAX,
        };
        assert_eq!(huge.max_list_bytes(), None);
        let wide = ListBounds {
            max_item_size: usize::MAX / 2,
            max_items: 1,
        };
        assert_eq!(wide.max_list_bytes(), None);
    }

    #[test]
    fn test_shapes_stay_within_max_list_bytes() {
        let mut rng = fastrand::Rng::with_seed(31);
        let bounds = ListBounds {
            max_item_size: 5,
            max_items: 7,
        };
        let limit = bounds.max_list_bytes().unwrap();
        for _ in 0..1_000 {
            let (a, b) = arbitrary_pair(&mut rng, &bounds);
            assert!(a.capacity_bytes <= limit && b.capacity_bytes <= limit);
        }
    }

    #[test]
    fn test_build_matches_shape() {
        let mut rng = fastrand::Rng::with_seed(77);
        let bounds = ListBounds::default();
        for _ in 0..200 {
            let (shape, _) = arbitrary_pair(&mut rng, &bounds);
            let mut backing = Vec::new();
            let list = build(&shape, &mut backing, default_allocator(), &mut rng).unwrap();
            assert_eq!(shape_of(&list), shape);
            assert!(list.is_valid());
        }
    }
}
