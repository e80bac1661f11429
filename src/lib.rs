//! Sequence containers built directly on raw allocations.
//!
//! The crate provides a contiguous growable array ([`DynArray`]), a
//! double-ended queue stored as a map of fixed-size buffers
//! ([`SegmentedDeque`]), a doubly-linked list kept in an index arena
//! ([`ArenaList`]), and the [`Stack`] and [`Queue`] adapters.
//!
//! Storage and object lifetime are handled separately: blocks are acquired
//! uninitialized and elements are constructed into them one slot at a time.
//! Growth paths populate the new storage before the old one is released, so
//! a failed allocation or a panicking `Clone` leaves the container as it was.
//!
//! # Example
//!
//! ```
//! use rawseq::{dynarr, SegmentedDeque};
//!
//! let mut arr = dynarr![1, 2, 3];
//! arr.insert(1, 9);
//! assert_eq!(arr, [1, 9, 2, 3]);
//! arr.remove(0);
//! assert_eq!(arr, [9, 2, 3]);
//!
//! let mut deque: SegmentedDeque<i32> = SegmentedDeque::new();
//! deque.push_back(2);
//! deque.push_front(1);
//! assert_eq!(deque.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
//! ```

pub mod adapters;
pub mod array;
pub mod cursor;
pub mod deque;
pub mod list;

mod lifecycle;
mod raw_alloc;
mod uninit;

pub use adapters::{Queue, Stack};
pub use array::DynArray;
pub use cursor::{Category, Cursor};
pub use deque::SegmentedDeque;
pub use list::{ArenaList, Handle};

use std::alloc::Layout;

/// The error type for fallible allocation (`try_*`) operations.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
#[error(transparent)]
pub struct TryReserveError {
    kind: TryReserveErrorKind,
}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
enum TryReserveErrorKind {
    /// The capacity computation overflowed.
    #[error("memory allocation failed due to capacity overflow")]
    CapacityOverflow,
    /// Memory allocation failed.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError { layout: Layout },
}

impl TryReserveError {
    pub(crate) fn capacity_overflow() -> Self {
        Self {
            kind: TryReserveErrorKind::CapacityOverflow,
        }
    }

    pub(crate) fn alloc_error(layout: Layout) -> Self {
        Self {
            kind: TryReserveErrorKind::AllocError { layout },
        }
    }

    /// Returns `true` if the requested size could not even be computed.
    pub fn is_capacity_overflow(&self) -> bool {
        matches!(self.kind, TryReserveErrorKind::CapacityOverflow)
    }

    /// The layout the allocator refused, if the allocator was reached.
    pub fn layout(&self) -> Option<Layout> {
        match self.kind {
            TryReserveErrorKind::CapacityOverflow => None,
            TryReserveErrorKind::AllocError { layout } => Some(layout),
        }
    }
}

/// Turns an allocation error into the panic or abort an infallible API promises.
#[cold]
#[track_caller]
pub(crate) fn handle_error(err: TryReserveError) -> ! {
    match err.kind {
        TryReserveErrorKind::CapacityOverflow => panic!("{err}"),
        TryReserveErrorKind::AllocError { layout } => std::alloc::handle_alloc_error(layout),
    }
}
