//! Iterators over `SegmentedDeque`.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::cursor::Pos;
use super::{buffer_size, SegmentedDeque};

/// Immutable deque iterator.
///
/// Created by [`SegmentedDeque::iter`].
pub struct Iter<'a, T, const B: usize = 0> {
    front: Pos<T>,
    back: Pos<T>,
    len: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, const B: usize> Iter<'a, T, B> {
    const BS: usize = buffer_size::<T>(B);

    pub(crate) fn new(front: Pos<T>, back: Pos<T>, len: usize) -> Self {
        Self {
            front,
            back,
            len,
            _marker: PhantomData,
        }
    }
}

impl<T, const B: usize> Clone for Iter<'_, T, B> {
    fn clone(&self) -> Self {
        Self::new(self.front, self.back, self.len)
    }
}

impl<'a, T, const B: usize> Iterator for Iter<'a, T, B> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // Safety: a live element precedes `back`, so the next buffer exists
        // whenever `front` leaves its current one.
        unsafe {
            let item = &*self.front.cur;
            self.front.step(Self::BS);
            Some(item)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T, const B: usize> DoubleEndedIterator for Iter<'a, T, B> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        unsafe {
            self.back.step_back(Self::BS);
            Some(&*self.back.cur)
        }
    }
}

impl<T, const B: usize> ExactSizeIterator for Iter<'_, T, B> {}

impl<T, const B: usize> FusedIterator for Iter<'_, T, B> {}

impl<T: std::fmt::Debug, const B: usize> std::fmt::Debug for Iter<'_, T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Mutable deque iterator.
///
/// Created by [`SegmentedDeque::iter_mut`].
pub struct IterMut<'a, T, const B: usize = 0> {
    front: Pos<T>,
    back: Pos<T>,
    len: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, const B: usize> IterMut<'a, T, B> {
    const BS: usize = buffer_size::<T>(B);

    pub(crate) fn new(front: Pos<T>, back: Pos<T>, len: usize) -> Self {
        Self {
            front,
            back,
            len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T, const B: usize> Iterator for IterMut<'a, T, B> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // Safety: each slot is yielded once
        unsafe {
            let item = &mut *self.front.cur;
            self.front.step(Self::BS);
            Some(item)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T, const B: usize> DoubleEndedIterator for IterMut<'a, T, B> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        unsafe {
            self.back.step_back(Self::BS);
            Some(&mut *self.back.cur)
        }
    }
}

impl<T, const B: usize> ExactSizeIterator for IterMut<'_, T, B> {}

impl<T, const B: usize> FusedIterator for IterMut<'_, T, B> {}

// Safety: the iterators hand out references into a deque they borrow
unsafe impl<T: Sync, const B: usize> Send for Iter<'_, T, B> {}
unsafe impl<T: Sync, const B: usize> Sync for Iter<'_, T, B> {}
unsafe impl<T: Send, const B: usize> Send for IterMut<'_, T, B> {}
unsafe impl<T: Sync, const B: usize> Sync for IterMut<'_, T, B> {}

/// An owning iterator over the elements of a deque.
///
/// Buffers are released as the iterator leaves them.
pub struct IntoIter<T, const B: usize = 0> {
    inner: SegmentedDeque<T, B>,
}

impl<T, const B: usize> IntoIter<T, B> {
    pub(crate) fn new(inner: SegmentedDeque<T, B>) -> Self {
        Self { inner }
    }
}

impl<T, const B: usize> Iterator for IntoIter<T, B> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.inner.len();
        (len, Some(len))
    }
}

impl<T, const B: usize> DoubleEndedIterator for IntoIter<T, B> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.inner.pop_back()
    }
}

impl<T, const B: usize> ExactSizeIterator for IntoIter<T, B> {}

impl<T, const B: usize> FusedIterator for IntoIter<T, B> {}

impl<T: std::fmt::Debug, const B: usize> std::fmt::Debug for IntoIter<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.inner).finish()
    }
}
