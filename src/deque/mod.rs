//! A double-ended queue stored as a map of fixed-size buffers.
//!
//! The map is an array of buffer pointers. Elements live in the buffers, and
//! two positions (`start` and `finish`) mark the first element and the slot
//! after the last one. Growing at either end allocates whole buffers, so
//! elements never move once constructed; when the map itself runs out of
//! slots on one side it is recentered or replaced by a larger one.
//!
//! ```
//! use rawseq::SegmentedDeque;
//!
//! let mut deque: SegmentedDeque<i32, 4> = SegmentedDeque::new();
//! for i in 0..5 {
//!     deque.push_back(i);
//! }
//! deque.push_front(-1);
//! assert_eq!(deque.len(), 6);
//! assert_eq!(deque.front(), Some(&-1));
//! assert_eq!(deque.pop_back(), Some(4));
//! ```

mod cursor;
mod iter;

pub use cursor::Cursor;
pub use iter::{IntoIter, Iter, IterMut};

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::raw_alloc::{self, Block, Pending};
use crate::{handle_error, lifecycle, TryReserveError};
use cursor::Pos;

/// Smallest number of slots in a map.
pub const MIN_MAP_SIZE: usize = 8;

/// Element count of one buffer: `b` if non-zero, otherwise about 4 KiB worth
/// of elements and never fewer than 16.
pub(crate) const fn buffer_size<T>(b: usize) -> usize {
    let size = std::mem::size_of::<T>();
    if b != 0 {
        b
    } else if size == 0 || 4096 / size < 16 {
        16
    } else {
        4096 / size
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

/// A double-ended queue of `T` stored in buffers of `B` elements.
///
/// `B = 0` (the default) picks the buffer size from the size of `T`.
/// Zero-sized types are not supported.
pub struct SegmentedDeque<T, const B: usize = 0> {
    map: Block<*mut T>,
    start: Pos<T>,
    finish: Pos<T>,
    _marker: PhantomData<T>,
}

/// Drops the buffers a fill did not reach if the fill unwinds.
struct FillGuard<'a, T, const B: usize> {
    deque: &'a mut SegmentedDeque<T, B>,
}

impl<T, const B: usize> Drop for FillGuard<'_, T, B> {
    fn drop(&mut self) {
        self.deque.release_beyond(End::Back);
    }
}

impl<T, const B: usize> SegmentedDeque<T, B> {
    /// Number of elements in one buffer.
    pub const BUFFER_SIZE: usize = buffer_size::<T>(B);

    /// Creates an empty deque with one buffer.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or the allocation fails.
    pub fn new() -> Self {
        Self::try_with_nodes(0).unwrap_or_else(|e| handle_error(e))
    }

    /// Creates a deque of `n` default values.
    pub fn with_len(n: usize) -> Self
    where
        T: Default,
    {
        Self::fill(n, T::default)
    }

    /// Creates a deque of `n` clones of `value`.
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        Self::fill(n, || value.clone())
    }

    fn fill<F: FnMut() -> T>(n: usize, mut f: F) -> Self {
        let mut deque = Self::try_with_nodes(n).unwrap_or_else(|e| handle_error(e));
        let guard = FillGuard { deque: &mut deque };
        for _ in 0..n {
            unsafe {
                lifecycle::construct(guard.deque.finish.cur, f());
                guard.deque.finish.step(Self::BUFFER_SIZE);
            }
        }
        drop(guard);
        deque
    }

    /// Allocates a centered map with buffers for `nelem` elements. The deque
    /// is empty; the buffers after the first are spare until filled.
    fn try_with_nodes(nelem: usize) -> Result<Self, TryReserveError> {
        assert!(
            std::mem::size_of::<T>() != 0,
            "SegmentedDeque does not support zero-sized types"
        );
        let bs = Self::BUFFER_SIZE;
        let nnode = nelem / bs + 1;
        let map_size = MIN_MAP_SIZE.max(nnode + 2);

        let map = Pending::new(raw_alloc::allocate::<*mut T>(map_size)?);
        unsafe {
            for i in 0..map_size {
                map.as_ptr().add(i).write(std::ptr::null_mut());
            }
            let node = map.as_ptr().add((map_size - nnode) / 2);
            create_buffers(node, nnode, bs)?;

            let mut start = Pos::dangling();
            start.set_node(node, bs);
            start.cur = start.first;
            Ok(Self {
                map: map.commit(),
                start,
                finish: start,
                _marker: PhantomData,
            })
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        let nodes = unsafe { self.finish.node.offset_from(self.start.node) } as usize;
        Self::BUFFER_SIZE * nodes + self.finish.offset() - self.start.offset()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.cur == self.finish.cur
    }

    /// Number of elements in one buffer.
    #[inline]
    pub const fn buffer_size(&self) -> usize {
        Self::BUFFER_SIZE
    }

    /// Number of buffers holding elements or the end position.
    #[inline]
    pub fn buffer_count(&self) -> usize {
        unsafe { self.finish.node.offset_from(self.start.node) as usize + 1 }
    }

    /// Number of slots in the map.
    #[inline]
    pub fn map_size(&self) -> usize {
        self.map.capacity()
    }

    /// Cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T, B> {
        Cursor::new(&self.start)
    }

    /// Cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T, B> {
        Cursor::new(&self.finish)
    }

    pub fn iter(&self) -> Iter<'_, T, B> {
        Iter::new(self.start, self.finish, self.len())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T, B> {
        IterMut::new(self.start, self.finish, self.len())
    }

    /// Slot of the element at `index`, which must be in bounds.
    #[inline]
    unsafe fn slot(&self, index: usize) -> *mut T {
        let bs = Self::BUFFER_SIZE;
        let offset = index + self.start.offset();
        (*self.start.node.add(offset / bs)).add(offset % bs)
    }

    /// Returns the element at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.len()).then(|| unsafe { &*self.slot(index) })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        (index < self.len()).then(|| unsafe { &mut *self.slot(index) })
    }

    #[inline]
    pub fn front(&self) -> Option<&T> {
        (!self.is_empty()).then(|| unsafe { &*self.start.cur })
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        (!self.is_empty()).then(|| unsafe { &mut *self.start.cur })
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        let len = self.len();
        len.checked_sub(1).and_then(|i| self.get(i))
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        self.get_mut(len - 1)
    }

    /// Appends an element to the back.
    ///
    /// # Panics
    ///
    /// Panics if a buffer or a larger map cannot be allocated.
    #[inline]
    pub fn push_back(&mut self, value: T) {
        unsafe {
            // Fast path: room in the last buffer
            if self.finish.cur != self.finish.last.sub(1) {
                lifecycle::construct(self.finish.cur, value);
                self.finish.cur = self.finish.cur.add(1);
                return;
            }
        }
        if let Err(err) = self.try_push_back(value) {
            handle_error(err);
        }
    }

    /// Appends an element, returning an error if storage cannot be acquired.
    ///
    /// On error the deque is unchanged and `value` is dropped.
    pub fn try_push_back(&mut self, value: T) -> Result<(), TryReserveError> {
        unsafe {
            if self.finish.cur != self.finish.last.sub(1) {
                lifecycle::construct(self.finish.cur, value);
                self.finish.cur = self.finish.cur.add(1);
            } else {
                self.try_require_capacity(1, End::Back)?;
                lifecycle::construct(self.finish.cur, value);
                self.finish.step(Self::BUFFER_SIZE);
            }
        }
        Ok(())
    }

    /// Prepends an element to the front.
    ///
    /// # Panics
    ///
    /// Panics if a buffer or a larger map cannot be allocated.
    #[inline]
    pub fn push_front(&mut self, value: T) {
        unsafe {
            if self.start.cur != self.start.first {
                self.start.cur = self.start.cur.sub(1);
                lifecycle::construct(self.start.cur, value);
                return;
            }
        }
        if let Err(err) = self.try_push_front(value) {
            handle_error(err);
        }
    }

    /// Prepends an element, returning an error if storage cannot be acquired.
    ///
    /// On error the deque is unchanged and `value` is dropped.
    pub fn try_push_front(&mut self, value: T) -> Result<(), TryReserveError> {
        unsafe {
            if self.start.cur == self.start.first {
                self.try_require_capacity(1, End::Front)?;
            }
            self.start.step_back(Self::BUFFER_SIZE);
            lifecycle::construct(self.start.cur, value);
        }
        Ok(())
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// A buffer left empty is released.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        unsafe {
            if self.finish.cur == self.finish.first {
                self.finish.step_back(Self::BUFFER_SIZE);
                self.release_beyond(End::Back);
            } else {
                self.finish.cur = self.finish.cur.sub(1);
            }
            Some(lifecycle::take(self.finish.cur))
        }
    }

    /// Removes the first element and returns it, or `None` if empty.
    ///
    /// A buffer left empty is released.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        unsafe {
            let value = lifecycle::take(self.start.cur);
            if self.start.cur == self.start.last.sub(1) {
                // `finish` never sits on a buffer's last slot, so the next buffer exists.
                self.start.step(Self::BUFFER_SIZE);
                self.release_beyond(End::Front);
            } else {
                self.start.cur = self.start.cur.add(1);
            }
            Some(value)
        }
    }

    /// Drops every element and releases all buffers but one.
    pub fn clear(&mut self) {
        let (start, finish) = (self.start, self.finish);
        // Empty first so a panicking destructor cannot cause a double drop
        self.finish = self.start;
        unsafe { destroy_span(start, finish, Self::BUFFER_SIZE) };
        self.release_beyond(End::Back);
    }

    /// Number of free element slots at `end` of the edge buffer.
    fn vacancies(&self, end: End) -> usize {
        match end {
            End::Back => Self::BUFFER_SIZE - self.finish.offset() - 1,
            End::Front => self.start.offset(),
        }
    }

    /// Spare buffers already allocated past `end`, and the empty map slots
    /// after them.
    fn spare_and_free(&self, end: End) -> (usize, usize) {
        let base = self.map.as_ptr();
        let size = self.map_size();
        unsafe {
            match end {
                End::Back => {
                    let mut i = self.finish.node.offset_from(base) as usize + 1;
                    let edge = i;
                    while i < size && !(*base.add(i)).is_null() {
                        i += 1;
                    }
                    (i - edge, size - i)
                }
                End::Front => {
                    let edge = self.start.node.offset_from(base) as usize;
                    let mut i = edge;
                    while i > 0 && !(*base.add(i - 1)).is_null() {
                        i -= 1;
                    }
                    (edge - i, i)
                }
            }
        }
    }

    /// Makes sure `n` more elements fit at `end` without further allocation.
    ///
    /// Grows the map first if it has too few free slots on that side, then
    /// allocates the missing buffers. On error nothing has changed apart from
    /// a possibly reorganized map.
    fn try_require_capacity(&mut self, n: usize, end: End) -> Result<(), TryReserveError> {
        let bs = Self::BUFFER_SIZE;
        let vacancies = self.vacancies(end);
        if n <= vacancies {
            return Ok(());
        }
        let needed = (n - vacancies).div_ceil(bs);
        let (spare, free) = self.spare_and_free(end);
        if needed <= spare {
            return Ok(());
        }
        let missing = needed - spare;
        if missing > free {
            self.try_reallocate_map(missing, end)?;
        }
        unsafe {
            match end {
                End::Back => create_buffers(self.finish.node.add(1 + spare), missing, bs),
                End::Front => create_buffers(self.start.node.sub(spare + missing), missing, bs),
            }
        }
    }

    /// Reorganizes the map so that `add` more nodes fit at `end`.
    ///
    /// The occupied slots (live buffers and spare ones) keep their order.
    /// When the map is more than twice the resulting node count they are
    /// recentered in place; otherwise they move to the middle of a new map.
    fn try_reallocate_map(&mut self, add: usize, end: End) -> Result<(), TryReserveError> {
        let old_base = self.map.as_ptr();
        let old_size = self.map_size();
        let (front_spare, _) = self.spare_and_free(End::Front);
        let (back_spare, _) = self.spare_and_free(End::Back);

        unsafe {
            let lo = self.start.node.offset_from(old_base) as usize - front_spare;
            let hi = self.finish.node.offset_from(old_base) as usize + 1 + back_spare;
            let old_nodes = hi - lo;
            let new_nodes = old_nodes
                .checked_add(add)
                .ok_or_else(TryReserveError::capacity_overflow)?;
            let shift = if end == End::Front { add } else { 0 };

            let (new_base, new_lo) = if old_size > 2 * new_nodes {
                let new_lo = (old_size - new_nodes) / 2 + shift;
                std::ptr::copy(old_base.add(lo), old_base.add(new_lo), old_nodes);
                for i in lo..hi {
                    if i < new_lo || i >= new_lo + old_nodes {
                        old_base.add(i).write(std::ptr::null_mut());
                    }
                }
                tracing::trace!(
                    map_size = old_size,
                    nodes = new_nodes,
                    ?end,
                    "deque map recentered"
                );
                (old_base, new_lo)
            } else {
                let new_size = old_size
                    .checked_add(old_size.max(add))
                    .and_then(|n| n.checked_add(2))
                    .ok_or_else(TryReserveError::capacity_overflow)?;
                let map = raw_alloc::allocate::<*mut T>(new_size)?;
                let new_base = map.as_ptr();
                for i in 0..new_size {
                    new_base.add(i).write(std::ptr::null_mut());
                }
                let new_lo = (new_size - new_nodes) / 2 + shift;
                std::ptr::copy_nonoverlapping(old_base.add(lo), new_base.add(new_lo), old_nodes);
                raw_alloc::deallocate(std::mem::replace(&mut self.map, map));
                tracing::trace!(
                    old_map_size = old_size,
                    new_map_size = new_size,
                    ?end,
                    "deque map reallocated"
                );
                (new_base, new_lo)
            };

            let retarget = |node: *mut *mut T| {
                let index = node.offset_from(old_base) as usize;
                new_base.add(index - lo + new_lo)
            };
            self.start.node = retarget(self.start.node);
            self.finish.node = retarget(self.finish.node);
        }
        Ok(())
    }

    /// Releases every buffer past `end` and nulls its map slot.
    fn release_beyond(&mut self, end: End) {
        let base = self.map.as_ptr();
        let size = self.map_size();
        let bs = Self::BUFFER_SIZE;
        let mut released = 0usize;
        unsafe {
            match end {
                End::Back => {
                    let mut i = self.finish.node.offset_from(base) as usize + 1;
                    while i < size && !(*base.add(i)).is_null() {
                        release_buffer(base.add(i), bs);
                        released += 1;
                        i += 1;
                    }
                }
                End::Front => {
                    let mut i = self.start.node.offset_from(base) as usize;
                    while i > 0 && !(*base.add(i - 1)).is_null() {
                        i -= 1;
                        release_buffer(base.add(i), bs);
                        released += 1;
                    }
                }
            }
        }
        if released > 0 {
            tracing::trace!(count = released, ?end, "deque buffers released");
        }
    }
}

/// Allocates `count` buffers into the map slots starting at `node`.
///
/// If one allocation fails, the buffers created by this call are released
/// and their slots nulled again.
unsafe fn create_buffers<T>(
    node: *mut *mut T,
    count: usize,
    bs: usize,
) -> Result<(), TryReserveError> {
    for i in 0..count {
        match raw_alloc::allocate::<T>(bs) {
            Ok(block) => node.add(i).write(block.as_ptr()),
            Err(err) => {
                for j in 0..i {
                    release_buffer(node.add(j), bs);
                }
                return Err(err);
            }
        }
    }
    tracing::trace!(count, buffer_size = bs, "deque buffers allocated");
    Ok(())
}

/// Frees the buffer in `node` and nulls the slot.
unsafe fn release_buffer<T>(node: *mut *mut T, bs: usize) {
    raw_alloc::deallocate(Block::from_raw_parts(*node, bs));
    node.write(std::ptr::null_mut());
}

/// Drops the elements in `[start, finish)` buffer by buffer.
unsafe fn destroy_span<T>(start: Pos<T>, finish: Pos<T>, bs: usize) {
    if start.node == finish.node {
        lifecycle::destroy_range(start.cur, finish.offset() - start.offset());
        return;
    }
    lifecycle::destroy_range(start.cur, bs - start.offset());
    let mut node = start.node.add(1);
    while node < finish.node {
        lifecycle::destroy_range(*node, bs);
        node = node.add(1);
    }
    lifecycle::destroy_range(finish.first, finish.offset());
}

impl<T, const B: usize> Drop for SegmentedDeque<T, B> {
    fn drop(&mut self) {
        unsafe {
            destroy_span(self.start, self.finish, Self::BUFFER_SIZE);
            let base = self.map.as_ptr();
            for i in 0..self.map_size() {
                if !(*base.add(i)).is_null() {
                    release_buffer(base.add(i), Self::BUFFER_SIZE);
                }
            }
            raw_alloc::deallocate(self.map);
        }
    }
}

// Safety: the deque owns its buffers and T determines thread safety
unsafe impl<T: Send, const B: usize> Send for SegmentedDeque<T, B> {}
unsafe impl<T: Sync, const B: usize> Sync for SegmentedDeque<T, B> {}

impl<T, const B: usize> Default for SegmentedDeque<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, const B: usize> Clone for SegmentedDeque<T, B> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T, const B: usize> Index<usize> for SegmentedDeque<T, B> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index out of bounds: the len is {} but the index is {index}", self.len()),
        }
    }
}

impl<T, const B: usize> IndexMut<usize> for SegmentedDeque<T, B> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("index out of bounds: the len is {len} but the index is {index}"),
        }
    }
}

impl<T, const B: usize> Extend<T> for SegmentedDeque<T, B> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        if let Err(err) = self.try_require_capacity(lower, End::Back) {
            handle_error(err);
        }
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<T, const B: usize> FromIterator<T> for SegmentedDeque<T, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const B: usize> IntoIterator for SegmentedDeque<T, B> {
    type Item = T;
    type IntoIter = IntoIter<T, B>;

    fn into_iter(self) -> IntoIter<T, B> {
        IntoIter::new(self)
    }
}

impl<'a, T, const B: usize> IntoIterator for &'a SegmentedDeque<T, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B>;

    fn into_iter(self) -> Iter<'a, T, B> {
        self.iter()
    }
}

impl<'a, T, const B: usize> IntoIterator for &'a mut SegmentedDeque<T, B> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, B>;

    fn into_iter(self) -> IterMut<'a, T, B> {
        self.iter_mut()
    }
}

impl<T: std::fmt::Debug, const B: usize> std::fmt::Debug for SegmentedDeque<T, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, const B: usize> PartialEq for SegmentedDeque<T, B> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, const B: usize> Eq for SegmentedDeque<T, B> {}

impl<T: std::hash::Hash, const B: usize> std::hash::Hash for SegmentedDeque<T, B> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        self.iter().for_each(|elem| elem.hash(state));
    }
}
