//! Owning iterator for `DynArray`.

use std::iter::FusedIterator;

use super::raw::RawArray;
use crate::lifecycle;

/// An owning iterator over the elements of a [`DynArray`](crate::DynArray).
///
/// This struct is created by the `into_iter` method on `DynArray`
/// (provided by the [`IntoIterator`] trait).
pub struct IntoIter<T> {
    /// Keeps the block alive; dropped after the remaining elements.
    pub(crate) buf: RawArray<T>,
    /// Index of the next element from the front.
    pub(crate) start: usize,
    /// One past the next element from the back.
    pub(crate) end: usize,
}

impl<T> IntoIter<T> {
    /// Returns the remaining items as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe {
            std::slice::from_raw_parts_mut(self.buf.ptr().add(self.start), self.end - self.start)
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        // Safety: start < end, so the slot holds a live element we now own
        let value = unsafe { lifecycle::take(self.buf.ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }

    #[inline]
    fn count(self) -> usize {
        self.end - self.start
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        Some(unsafe { lifecycle::take(self.buf.ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // Drop remaining elements that weren't consumed; the block goes with `buf`
        let remaining = self.end - self.start;
        self.end = self.start;
        unsafe { lifecycle::destroy_range(self.buf.ptr().add(self.start), remaining) };
    }
}

impl<T: Clone> Clone for IntoIter<T> {
    fn clone(&self) -> Self {
        crate::DynArray::from(self.as_slice()).into_iter()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
