//! Random access cursor over a `DynArray`.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::cursor::{self, Category};

/// A position inside a [`DynArray`](crate::DynArray).
///
/// Cursors are plain positions: moving one never touches memory, and the
/// array does not check that it stays in bounds. Any operation that
/// reallocates or shifts elements invalidates every cursor.
pub struct Cursor<'a, T> {
    base: *const T,
    index: isize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Cursor<'a, T> {
    #[inline]
    pub(crate) fn new(base: *const T, index: usize) -> Self {
        Self {
            base,
            index: index as isize,
            _marker: PhantomData,
        }
    }

    /// Index of the position inside the array.
    #[inline]
    pub fn index(&self) -> isize {
        self.index
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && std::ptr::eq(self.base, other.base)
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> PartialOrd for Cursor<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        std::ptr::eq(self.base, other.base).then(|| self.index.cmp(&other.index))
    }
}

impl<T> std::fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).finish()
    }
}

impl<T> cursor::Cursor for Cursor<'_, T> {
    type Item = T;

    const CATEGORY: Category = Category::RandomAccess;

    #[inline]
    fn step(&mut self) {
        self.index += 1;
    }

    #[inline]
    fn step_back(&mut self) {
        self.index -= 1;
    }

    #[inline]
    fn jump(&mut self, n: isize) {
        self.index += n;
    }

    #[inline]
    fn offset_from(&self, origin: &Self) -> isize {
        self.index - origin.index
    }

    #[inline]
    unsafe fn get(&self) -> &T {
        &*self.base.offset(self.index)
    }
}

impl<T> AddAssign<isize> for Cursor<'_, T> {
    fn add_assign(&mut self, n: isize) {
        self.index += n;
    }
}

impl<T> SubAssign<isize> for Cursor<'_, T> {
    fn sub_assign(&mut self, n: isize) {
        self.index -= n;
    }
}

impl<T> Add<isize> for Cursor<'_, T> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T> Sub<isize> for Cursor<'_, T> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<'a, T> Sub for Cursor<'a, T> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.index - origin.index
    }
}
