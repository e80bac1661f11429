//! Bulk transfers into uninitialized memory.
//!
//! Every constructing operation writes through an [`InitGuard`]. If a clone or
//! a user closure panics half way, the guard destroys the elements it already
//! built, so the destination returns to being plain uninitialized storage.

use crate::cursor::Cursor;
use crate::lifecycle;

/// Tracks a run of slots initialized from `dst` onward.
pub(crate) struct InitGuard<T> {
    dst: *mut T,
    len: usize,
}

impl<T> InitGuard<T> {
    #[inline]
    pub(crate) fn new(dst: *mut T) -> Self {
        Self { dst, len: 0 }
    }

    /// Constructs `value` in the next slot.
    ///
    /// # Safety
    ///
    /// The next slot must be valid, uninitialized storage.
    #[inline]
    pub(crate) unsafe fn push(&mut self, value: T) {
        lifecycle::construct(self.dst.add(self.len), value);
        self.len += 1;
    }

    /// Keeps the initialized run and returns its length.
    #[inline]
    pub(crate) fn finish(self) -> usize {
        let len = self.len;
        std::mem::forget(self);
        len
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        unsafe { lifecycle::destroy_range(self.dst, self.len) };
    }
}

/// Clones `[first, last)` into `dst` and returns the number of elements written.
///
/// # Safety
///
/// `last` must be reachable from `first`, every position in between must be a
/// live element, and `dst` must have room for all of them.
pub(crate) unsafe fn copy_cursor_range<C>(mut first: C, last: &C, dst: *mut C::Item) -> usize
where
    C: Cursor,
    C::Item: Clone,
{
    let mut guard = InitGuard::new(dst);
    while first != *last {
        guard.push(first.get().clone());
        first.step();
    }
    guard.finish()
}

/// Clones every element of `src` into `dst`.
///
/// # Safety
///
/// `dst` must have room for `src.len()` elements and must not overlap `src`.
pub(crate) unsafe fn clone_slice<T: Clone>(src: &[T], dst: *mut T) {
    if !std::mem::needs_drop::<T>() {
        // No drop glue means nothing to roll back either.
        let out =
            std::slice::from_raw_parts_mut(dst.cast::<std::mem::MaybeUninit<T>>(), src.len());
        for (slot, value) in out.iter_mut().zip(src) {
            slot.write(value.clone());
        }
        return;
    }
    let mut guard = InitGuard::new(dst);
    for value in src {
        guard.push(value.clone());
    }
    guard.finish();
}

/// Writes `n` clones of `value` starting at `dst`.
///
/// # Safety
///
/// `dst` must have room for `n` elements.
pub(crate) unsafe fn fill_n<T: Clone>(dst: *mut T, n: usize, value: &T) {
    let mut guard = InitGuard::new(dst);
    for _ in 0..n {
        guard.push(value.clone());
    }
    guard.finish();
}

/// Writes `n` values produced by `f` starting at `dst`.
///
/// # Safety
///
/// `dst` must have room for `n` elements.
pub(crate) unsafe fn fill_with<T, F: FnMut() -> T>(dst: *mut T, n: usize, mut f: F) {
    let mut guard = InitGuard::new(dst);
    for _ in 0..n {
        guard.push(f());
    }
    guard.finish();
}

/// Relocates `n` elements from `src` to `dst`. The ranges may overlap.
///
/// Relocation is a bitwise move: afterwards the source slots are logically
/// uninitialized and the destination slots own the values.
///
/// # Safety
///
/// Both ranges must be valid for `n` elements.
#[inline]
pub(crate) unsafe fn move_range<T>(src: *const T, dst: *mut T, n: usize) {
    if n > 0 {
        std::ptr::copy(src, dst, n);
    }
}
