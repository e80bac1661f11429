//! Raw block management for `DynArray`.
//!
//! This module owns the storage block and the growth policy, similar to how
//! `RawVec` works for `Vec` in the standard library. It never tracks how many
//! slots are initialized; that is the array's job.

use std::marker::PhantomData;

use crate::raw_alloc::{self, Block};
use crate::TryReserveError;

/// Storage block of a `DynArray` without element management.
pub(crate) struct RawArray<T> {
    block: Block<T>,
    _marker: PhantomData<T>,
}

impl<T> RawArray<T> {
    /// Capacity of the first allocation when growing from empty, and the
    /// minimum capacity of the counted constructors.
    pub(crate) const BASELINE: usize = 16;

    /// Creates a `RawArray` without allocating.
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            block: Block::empty(),
            _marker: PhantomData,
        }
    }

    /// Allocates room for exactly `capacity` elements.
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            block: raw_alloc::allocate(capacity)?,
            _marker: PhantomData,
        })
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.block.as_ptr()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.block.capacity()
    }

    /// Capacity after growing to fit `add` more slots.
    ///
    /// From empty this is `max(add, BASELINE)`; otherwise the capacity doubles,
    /// or grows by `add` if that is larger. Close to `max_size` the doubling
    /// stops and the result is clamped.
    pub(crate) fn grow_amount(&self, add: usize) -> Result<usize, TryReserveError> {
        let cap = self.capacity();
        let max = raw_alloc::max_size::<T>();
        let wanted = cap
            .checked_add(add)
            .filter(|&n| n <= max)
            .ok_or_else(TryReserveError::capacity_overflow)?;

        if cap == 0 {
            return Ok(add.max(Self::BASELINE).min(max));
        }
        if cap > max / 2 {
            return Ok(wanted.saturating_add(Self::BASELINE).min(max));
        }
        Ok((cap * 2).max(wanted))
    }

    /// Allocates a block sized by [`grow_amount`](Self::grow_amount).
    pub(crate) fn allocate_grown(&self, add: usize) -> Result<Block<T>, TryReserveError> {
        raw_alloc::allocate(self.grow_amount(add)?)
    }

    /// Installs `block` and returns the previous one.
    ///
    /// The caller is responsible for having relocated the live elements and for
    /// releasing the returned block.
    #[inline]
    pub(crate) fn replace(&mut self, block: Block<T>) -> Block<T> {
        std::mem::replace(&mut self.block, block)
    }
}

impl<T> Drop for RawArray<T> {
    fn drop(&mut self) {
        // Only frees memory; the array drops its elements first.
        unsafe { raw_alloc::deallocate(self.block) };
    }
}

// Safety: RawArray owns its allocation and T determines thread safety
unsafe impl<T: Send> Send for RawArray<T> {}
unsafe impl<T: Sync> Sync for RawArray<T> {}
