//! A doubly-linked list kept in an index arena.
//!
//! Nodes live in a [`DynArray`] and refer to each other by index. Slot 0 is
//! the sentinel root: its `next` is the head and its `prev` the tail, so an
//! empty list is a root linked to itself. Removed slots are chained into a
//! free list and reused by later insertions.

mod cursor;

pub use cursor::Cursor;

use std::iter::FusedIterator;

use crate::DynArray;

const ROOT: usize = 0;

/// Stable reference to an element of an [`ArenaList`].
///
/// A handle stays valid until its element is removed. Using it afterwards
/// yields `None` or, once the slot has been reused, another element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(usize);

struct Node<T> {
    prev: usize,
    next: usize,
    value: Option<T>,
}

/// A doubly-linked list whose nodes live in one contiguous arena.
pub struct ArenaList<T> {
    nodes: DynArray<Node<T>>,
    /// Head of the free list, `ROOT` when empty.
    free: usize,
    len: usize,
}

impl<T> ArenaList<T> {
    pub fn new() -> Self {
        let mut nodes = DynArray::new();
        nodes.push(Node {
            prev: ROOT,
            next: ROOT,
            value: None,
        });
        Self {
            nodes,
            free: ROOT,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_live(&self, index: usize) -> bool {
        index != ROOT && self.nodes.get(index).is_some_and(|n| n.value.is_some())
    }

    fn alloc(&mut self, value: T) -> usize {
        if self.free != ROOT {
            let index = self.free;
            let node = &mut self.nodes[index];
            self.free = node.next;
            node.value = Some(value);
            return index;
        }
        self.nodes.push(Node {
            prev: ROOT,
            next: ROOT,
            value: Some(value),
        });
        self.nodes.len() - 1
    }

    /// Links the detached node `index` in front of `at`.
    fn link_before(&mut self, index: usize, at: usize) {
        let prev = self.nodes[at].prev;
        self.nodes[index].prev = prev;
        self.nodes[index].next = at;
        self.nodes[prev].next = index;
        self.nodes[at].prev = index;
        self.len += 1;
    }

    /// Takes the node `index` out of the chain without freeing its slot.
    fn detach(&mut self, index: usize) {
        let Node { prev, next, .. } = self.nodes[index];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.len -= 1;
    }

    fn unlink(&mut self, index: usize) -> T {
        self.detach(index);

        let node = &mut self.nodes[index];
        node.next = self.free;
        self.free = index;
        match node.value.take() {
            Some(value) => value,
            None => unreachable!("unlinked a free slot"),
        }
    }

    fn insert_at(&mut self, at: usize, value: T) -> Handle {
        let index = self.alloc(value);
        self.link_before(index, at);
        Handle(index)
    }

    /// Appends an element and returns its handle.
    pub fn push_back(&mut self, value: T) -> Handle {
        self.insert_at(ROOT, value)
    }

    /// Prepends an element and returns its handle.
    pub fn push_front(&mut self, value: T) -> Handle {
        let head = self.nodes[ROOT].next;
        self.insert_at(head, value)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.nodes[ROOT].next;
        (head != ROOT).then(|| self.unlink(head))
    }

    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.nodes[ROOT].prev;
        (tail != ROOT).then(|| self.unlink(tail))
    }

    pub fn front(&self) -> Option<&T> {
        self.nodes[self.nodes[ROOT].next].value.as_ref()
    }

    pub fn back(&self) -> Option<&T> {
        self.nodes[self.nodes[ROOT].prev].value.as_ref()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        let head = self.nodes[ROOT].next;
        self.nodes[head].value.as_mut()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        let tail = self.nodes[ROOT].prev;
        self.nodes[tail].value.as_mut()
    }

    /// Inserts `value` in front of the element at `at`.
    ///
    /// # Panics
    ///
    /// Panics if `at` does not refer to an element of this list.
    pub fn insert_before(&mut self, at: Handle, value: T) -> Handle {
        assert!(self.is_live(at.0), "handle {at:?} does not refer to an element");
        self.insert_at(at.0, value)
    }

    /// Removes the element at `handle`, or returns `None` if the handle no
    /// longer refers to one.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        self.is_live(handle.0).then(|| self.unlink(handle.0))
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if handle.0 == ROOT {
            return None;
        }
        self.nodes.get(handle.0)?.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if handle.0 == ROOT {
            return None;
        }
        self.nodes.get_mut(handle.0)?.value.as_mut()
    }

    /// Moves every element of `other` to the back of `self`, leaving `other`
    /// empty. Handles into `other` are invalidated.
    ///
    /// Each list owns its arena, so the values are moved one by one: this is
    /// O(`other.len()`). Use [`move_before`](Self::move_before) to relink
    /// within one list in O(1).
    pub fn splice_back(&mut self, other: &mut Self) {
        self.splice_at(ROOT, other);
    }

    /// Moves every element of `other` in front of the element at `at`,
    /// keeping their order and leaving `other` empty. Handles into `other`
    /// are invalidated.
    ///
    /// Runs in O(`other.len()`), like [`splice_back`](Self::splice_back).
    ///
    /// # Panics
    ///
    /// Panics if `at` does not refer to an element of this list.
    pub fn splice_before(&mut self, at: Handle, other: &mut Self) {
        assert!(self.is_live(at.0), "handle {at:?} does not refer to an element");
        self.splice_at(at.0, other);
    }

    fn splice_at(&mut self, at: usize, other: &mut Self) {
        self.nodes.reserve(other.len.saturating_sub(self.free_count()));
        while let Some(value) = other.pop_front() {
            self.insert_at(at, value);
        }
        other.clear();
    }

    fn free_count(&self) -> usize {
        self.nodes.len() - 1 - self.len
    }

    /// Relinks the element at `handle` in front of the element at `at`.
    /// Nothing is moved or reallocated and every handle stays valid. O(1).
    ///
    /// # Panics
    ///
    /// Panics if either handle does not refer to an element of this list.
    pub fn move_before(&mut self, handle: Handle, at: Handle) {
        assert!(self.is_live(handle.0), "handle {handle:?} does not refer to an element");
        assert!(self.is_live(at.0), "handle {at:?} does not refer to an element");
        if handle == at {
            return;
        }
        self.detach(handle.0);
        self.link_before(handle.0, at.0);
    }

    /// Relinks the element at `handle` to the back of the list. O(1).
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to an element of this list.
    pub fn move_to_back(&mut self, handle: Handle) {
        assert!(self.is_live(handle.0), "handle {handle:?} does not refer to an element");
        self.detach(handle.0);
        self.link_before(handle.0, ROOT);
    }

    /// Removes every element and releases the free list.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT].prev = ROOT;
        self.nodes[ROOT].next = ROOT;
        self.free = ROOT;
        self.len = 0;
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.nodes[ROOT].next,
            back: self.nodes[ROOT].prev,
            len: self.len,
        }
    }

    /// Cursor at the first element.
    pub fn cursor_begin(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.nodes[ROOT].next)
    }

    /// Cursor at the root, one past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor::new(self, ROOT)
    }
}

impl<T> Default for ArenaList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for ArenaList<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ArenaList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for ArenaList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ArenaList<T> {}

impl<T> Extend<T> for ArenaList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for ArenaList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

/// Iterator over the elements of an [`ArenaList`], front to back.
pub struct Iter<'a, T> {
    list: &'a ArenaList<T>,
    front: usize,
    back: usize,
    len: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = &self.list.nodes[self.front];
        self.front = node.next;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let node = &self.list.nodes[self.back];
        self.back = node.prev;
        node.value.as_ref()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// Owning iterator over the elements of an [`ArenaList`].
pub struct IntoIter<T> {
    list: ArenaList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len, Some(self.list.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.list.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for ArenaList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a ArenaList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
