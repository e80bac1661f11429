//! Bidirectional cursor over an `ArenaList`.

use super::ArenaList;
use crate::cursor::{self, Category};

/// A position inside an [`ArenaList`]. The end position is the sentinel root.
pub struct Cursor<'a, T> {
    list: &'a ArenaList<T>,
    index: usize,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(list: &'a ArenaList<T>, index: usize) -> Self {
        Self { list, index }
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
        self.index == other.index && std::ptr::eq(self.list, other.list)
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> std::fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("index", &self.index).finish()
    }
}

impl<T> cursor::Cursor for Cursor<'_, T> {
    type Item = T;

    const CATEGORY: Category = Category::Bidirectional;

    #[inline]
    fn step(&mut self) {
        self.index = self.list.nodes[self.index].next;
    }

    #[inline]
    fn step_back(&mut self) {
        self.index = self.list.nodes[self.index].prev;
    }

    /// Panics at the end position.
    unsafe fn get(&self) -> &T {
        match self.list.nodes[self.index].value.as_ref() {
            Some(value) => value,
            None => panic!("cursor at index {} does not address an element", self.index),
        }
    }
}
