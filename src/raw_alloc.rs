//! Untyped storage acquisition and release.
//!
//! Everything in this module deals with memory lifetime only. No constructor or
//! destructor ever runs here; the containers decide which slots of a [`Block`]
//! hold live objects.

use allocator_api2::alloc::{Allocator, Global};
use std::alloc::Layout;
use std::ptr::NonNull;

use crate::TryReserveError;

/// A block of uninitialized storage sized for `cap` values of `T`.
///
/// A block never owns the objects placed in it: dropping a `Block` does
/// nothing, and [`deallocate`] must only be called once every slot that was
/// initialized has been destroyed.
#[derive(Debug)]
pub(crate) struct Block<T> {
    ptr: NonNull<T>,
    cap: usize,
}

impl<T> Clone for Block<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Block<T> {}

impl<T> Block<T> {
    const IS_ZST: bool = std::mem::size_of::<T>() == 0;

    /// An empty block. No allocation stands behind it.
    #[inline]
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    /// Rebuilds a block from the pointer and count of an earlier allocation.
    ///
    /// # Safety
    ///
    /// `ptr` and `cap` must be those of a block returned by [`allocate`].
    #[inline]
    pub(crate) const unsafe fn from_raw_parts(ptr: *mut T, cap: usize) -> Self {
        Self {
            ptr: NonNull::new_unchecked(ptr),
            cap,
        }
    }

    #[inline]
    pub(crate) const fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Number of slots in the block.
    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        if Self::IS_ZST {
            usize::MAX
        } else {
            self.cap
        }
    }

    #[inline]
    fn layout(&self) -> Layout {
        // Layout was validated when the block was allocated.
        unsafe {
            Layout::from_size_align_unchecked(
                self.cap * std::mem::size_of::<T>(),
                std::mem::align_of::<T>(),
            )
        }
    }
}

/// Largest number of `T` a single block can hold.
#[inline]
pub(crate) const fn max_size<T>() -> usize {
    let size = std::mem::size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

/// Acquires uninitialized storage for `n` values of `T`.
///
/// `allocate(0)` and zero-sized `T` return a dangling block without calling
/// the allocator.
pub(crate) fn allocate<T>(n: usize) -> Result<Block<T>, TryReserveError> {
    if n == 0 || Block::<T>::IS_ZST {
        return Ok(Block {
            ptr: NonNull::dangling(),
            cap: n,
        });
    }

    let layout = Layout::array::<T>(n).map_err(|_| TryReserveError::capacity_overflow())?;
    if layout.size() > isize::MAX as usize {
        return Err(TryReserveError::capacity_overflow());
    }

    #[cfg(test)]
    fault::check(layout)?;

    let ptr = Global
        .allocate(layout)
        .map_err(|_| TryReserveError::alloc_error(layout))?;

    Ok(Block {
        ptr: ptr.cast(),
        cap: n,
    })
}

/// Releases a block obtained from [`allocate`].
///
/// # Safety
///
/// `block` must come from [`allocate`], must not have been released already,
/// and must not contain live objects.
pub(crate) unsafe fn deallocate<T>(block: Block<T>) {
    if block.cap == 0 || Block::<T>::IS_ZST {
        return;
    }
    Global.deallocate(block.ptr.cast(), block.layout());
}

/// A freshly allocated block that goes back to the allocator unless committed.
///
/// Used around the fallible part of a growth path: if populating the new block
/// fails or unwinds, the block is released before the error surfaces.
pub(crate) struct Pending<T> {
    block: Block<T>,
}

impl<T> Pending<T> {
    /// The block must hold no live objects whenever the guard can drop.
    #[inline]
    pub(crate) fn new(block: Block<T>) -> Self {
        Self { block }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.block.as_ptr()
    }

    /// Keeps the block.
    #[inline]
    pub(crate) fn commit(self) -> Block<T> {
        let block = self.block;
        std::mem::forget(self);
        block
    }
}

impl<T> Drop for Pending<T> {
    fn drop(&mut self) {
        unsafe { deallocate(self.block) };
    }
}
