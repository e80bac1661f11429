//! In-place construction and destruction over raw slots.
//!
//! Storage comes from [`crate::raw_alloc`]; these helpers begin and end the
//! lifetime of the objects living in it.

/// Begins the lifetime of `value` in `slot`.
///
/// # Safety
///
/// `slot` must be valid for writes, properly aligned, and must not hold a live
/// object (the previous one would be leaked).
#[inline]
pub(crate) unsafe fn construct<T>(slot: *mut T, value: T) {
    std::ptr::write(slot, value);
}

/// Ends the lifetime of the object in `slot`.
///
/// # Safety
///
/// `slot` must hold a live object that is not used afterwards.
#[inline]
pub(crate) unsafe fn destroy<T>(slot: *mut T) {
    std::ptr::drop_in_place(slot);
}

/// Ends the lifetime of `len` contiguous objects starting at `first`.
///
/// # Safety
///
/// Every slot in `[first, first + len)` must hold a live object.
#[inline]
pub(crate) unsafe fn destroy_range<T>(first: *mut T, len: usize) {
    if std::mem::needs_drop::<T>() && len > 0 {
        std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(first, len));
    }
}

/// Moves the object out of `slot`, leaving the slot uninitialized.
///
/// # Safety
///
/// `slot` must hold a live object; the slot must be treated as uninitialized
/// afterwards.
#[inline]
pub(crate) unsafe fn take<T>(slot: *mut T) -> T {
    std::ptr::read(slot)
}
