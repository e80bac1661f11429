//! Two-level positions inside a `SegmentedDeque`.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use super::buffer_size;
use crate::cursor::{self, Category};

/// Internal position: the element slot plus the bounds of its buffer and the
/// map slot that owns the buffer.
pub(crate) struct Pos<T> {
    pub(crate) cur: *mut T,
    pub(crate) first: *mut T,
    pub(crate) last: *mut T,
    pub(crate) node: *mut *mut T,
}

impl<T> Clone for Pos<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Pos<T> {}

impl<T> Pos<T> {
    pub(crate) const fn dangling() -> Self {
        Self {
            cur: std::ptr::null_mut(),
            first: std::ptr::null_mut(),
            last: std::ptr::null_mut(),
            node: std::ptr::null_mut(),
        }
    }

    /// Retargets to the buffer stored in `node`. `cur` is left as is.
    ///
    /// # Safety
    ///
    /// `node` must be a map slot holding a buffer of `bs` elements.
    #[inline]
    pub(crate) unsafe fn set_node(&mut self, node: *mut *mut T, bs: usize) {
        self.node = node;
        self.first = *node;
        self.last = self.first.add(bs);
    }

    /// Offset of `cur` inside its buffer.
    #[inline]
    pub(crate) fn offset(&self) -> usize {
        unsafe { self.cur.offset_from(self.first) as usize }
    }

    /// # Safety
    ///
    /// If `cur` is the last slot of its buffer, the next map slot must hold a buffer.
    #[inline]
    pub(crate) unsafe fn step(&mut self, bs: usize) {
        self.cur = self.cur.add(1);
        if self.cur == self.last {
            self.set_node(self.node.add(1), bs);
            self.cur = self.first;
        }
    }

    /// # Safety
    ///
    /// If `cur` is the first slot of its buffer, the previous map slot must hold a buffer.
    #[inline]
    pub(crate) unsafe fn step_back(&mut self, bs: usize) {
        if self.cur == self.first {
            self.set_node(self.node.sub(1), bs);
            self.cur = self.last;
        }
        self.cur = self.cur.sub(1);
    }
}

/// A random-access position inside a [`SegmentedDeque`](crate::SegmentedDeque).
///
/// A cursor stores the map slot of its buffer and its offset inside that
/// buffer. Arithmetic works on those two numbers alone, so a cursor can be
/// moved anywhere; the buffer is only looked up by [`get`](cursor::Cursor::get).
/// Pushing or popping invalidates every cursor.
pub struct Cursor<'a, T, const B: usize = 0> {
    node: *const *mut T,
    offset: isize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T, const B: usize> Cursor<'a, T, B> {
    const BS: isize = buffer_size::<T>(B) as isize;

    #[inline]
    pub(crate) fn new(pos: &Pos<T>) -> Self {
        Self {
            node: pos.node,
            offset: pos.offset() as isize,
            _marker: PhantomData,
        }
    }

    /// Map slots between `origin`'s buffer and this one.
    #[inline]
    fn node_distance(&self, origin: &Self) -> isize {
        (self.node as isize).wrapping_sub(origin.node as isize)
            / std::mem::size_of::<*mut T>() as isize
    }
}

impl<T, const B: usize> Clone for Cursor<'_, T, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const B: usize> Copy for Cursor<'_, T, B> {}

impl<T, const B: usize> PartialEq for Cursor<'_, T, B> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.node, other.node) && self.offset == other.offset
    }
}

impl<T, const B: usize> Eq for Cursor<'_, T, B> {}

impl<T, const B: usize> PartialOrd for Cursor<'_, T, B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T, const B: usize> Ord for Cursor<'_, T, B> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset_from_impl(other).cmp(&0)
    }
}

impl<T, const B: usize> std::fmt::Debug for Cursor<'_, T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("node", &self.node)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T, const B: usize> Cursor<'_, T, B> {
    fn jump_impl(&mut self, n: isize) {
        let bs = Self::BS;
        let offset = n + self.offset;
        if (0..bs).contains(&offset) {
            self.offset = offset;
            return;
        }
        let node_offset = if offset > 0 {
            offset / bs
        } else {
            -((-offset - 1) / bs) - 1
        };
        self.node = self.node.wrapping_offset(node_offset);
        self.offset = offset - node_offset * bs;
    }

    fn offset_from_impl(&self, origin: &Self) -> isize {
        Self::BS * self.node_distance(origin) + self.offset - origin.offset
    }
}

impl<T, const B: usize> cursor::Cursor for Cursor<'_, T, B> {
    type Item = T;

    const CATEGORY: Category = Category::RandomAccess;

    #[inline]
    fn step(&mut self) {
        self.offset += 1;
        if self.offset == Self::BS {
            self.node = self.node.wrapping_add(1);
            self.offset = 0;
        }
    }

    #[inline]
    fn step_back(&mut self) {
        if self.offset == 0 {
            self.node = self.node.wrapping_sub(1);
            self.offset = Self::BS;
        }
        self.offset -= 1;
    }

    #[inline]
    fn jump(&mut self, n: isize) {
        self.jump_impl(n);
    }

    #[inline]
    fn offset_from(&self, origin: &Self) -> isize {
        self.offset_from_impl(origin)
    }

    #[inline]
    unsafe fn get(&self) -> &T {
        &*(*self.node).offset(self.offset)
    }
}

impl<T, const B: usize> AddAssign<isize> for Cursor<'_, T, B> {
    fn add_assign(&mut self, n: isize) {
        self.jump_impl(n);
    }
}

impl<T, const B: usize> SubAssign<isize> for Cursor<'_, T, B> {
    fn sub_assign(&mut self, n: isize) {
        self.jump_impl(-n);
    }
}

impl<T, const B: usize> Add<isize> for Cursor<'_, T, B> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T, const B: usize> Sub<isize> for Cursor<'_, T, B> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<'a, T, const B: usize> Sub for Cursor<'a, T, B> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.offset_from_impl(&origin)
    }
}
