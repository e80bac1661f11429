//! A contiguous growable array.
//!
//! [`DynArray`] keeps its elements in one block: slots `[0, len)` are live and
//! slots `[len, capacity)` are allocated but uninitialized. When an element has
//! to be added to a full array, a larger block is allocated, the elements are
//! relocated into it, and only then is the old block released.
//!
//! # Example
//!
//! ```
//! use rawseq::DynArray;
//!
//! let mut arr: DynArray<i32> = DynArray::new();
//! arr.push(1);
//! arr.push(3);
//! arr.insert(1, 2);
//! assert_eq!(arr, [1, 2, 3]);
//! assert!(arr.capacity() >= 16);
//! ```

mod cursor;
mod into_iter;
pub(crate) mod raw;

pub use cursor::Cursor;
pub use into_iter::IntoIter;

use std::cmp::Ordering;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut, Index, IndexMut, Range};
use std::slice::SliceIndex;

use crate::raw_alloc::{self, Block, Pending};
use crate::{handle_error, lifecycle, uninit, TryReserveError};
use raw::RawArray;

/// A contiguous growable array.
///
/// Growth follows an amortized doubling policy: the first allocation holds
/// 16 elements (or more if more are requested), and every later one at least
/// doubles the capacity.
pub struct DynArray<T> {
    /// Storage block
    buf: RawArray<T>,
    /// Number of initialized elements
    len: usize,
}

/// Undoes the tail shift of an in-place `insert_n` if a clone panics.
struct GapGuard<T> {
    gap: *mut T,
    width: usize,
    tail: usize,
    written: usize,
}

impl<T> Drop for GapGuard<T> {
    fn drop(&mut self) {
        unsafe {
            lifecycle::destroy_range(self.gap, self.written);
            uninit::move_range(self.gap.add(self.width), self.gap, self.tail);
        }
    }
}

impl<T> DynArray<T> {
    const IS_ZST: bool = std::mem::size_of::<T>() == 0;

    /// Creates an empty array.
    ///
    /// Does not allocate until elements are added.
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: RawArray::new(),
            len: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or the allocation fails.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::try_with_capacity(capacity).unwrap_or_else(|e| handle_error(e))
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            buf: RawArray::try_with_capacity(capacity)?,
            len: 0,
        })
    }

    /// Empty array sized for `n` elements, never below the baseline capacity.
    fn with_initial(n: usize) -> Self {
        Self::try_with_capacity(n.max(RawArray::<T>::BASELINE)).unwrap_or_else(|e| handle_error(e))
    }

    /// Creates an array of `n` default values.
    pub fn with_len(n: usize) -> Self
    where
        T: Default,
    {
        let mut arr = Self::with_initial(n);
        unsafe { uninit::fill_with(arr.as_mut_ptr(), n, T::default) };
        arr.len = n;
        arr
    }

    /// Creates an array of `n` clones of `value`.
    ///
    /// ```
    /// use rawseq::DynArray;
    ///
    /// let arr = DynArray::from_elem("x", 3);
    /// assert_eq!(arr, ["x", "x", "x"]);
    /// ```
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut arr = Self::with_initial(n);
        unsafe { uninit::fill_n(arr.as_mut_ptr(), n, &value) };
        arr.len = n;
        arr
    }

    /// Creates an array by cloning the elements of the cursor range `[first, last)`.
    ///
    /// Multi-pass cursors are measured first and the array is allocated once;
    /// input cursors are consumed element by element.
    ///
    /// # Safety
    ///
    /// `last` must be reachable from `first` by stepping forward, and every
    /// position in between must address a live element.
    pub unsafe fn from_cursors<C>(mut first: C, last: C) -> Self
    where
        C: crate::cursor::Cursor<Item = T>,
        T: Clone,
    {
        if !C::CATEGORY.is_multi_pass() {
            let mut arr = Self::new();
            while first != last {
                arr.push(first.get().clone());
                first.step();
            }
            return arr;
        }

        let n = crate::cursor::distance(&first, &last);
        let mut arr = Self::with_initial(n);
        arr.len = uninit::copy_cursor_range(first, &last, arr.as_mut_ptr());
        arr
    }

    /// Returns the number of elements in the array.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Largest number of elements an array of `T` can ever hold.
    #[inline]
    pub const fn max_size(&self) -> usize {
        raw_alloc::max_size::<T>()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Cursor at the first element.
    #[inline]
    pub fn cursor_begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_ptr(), 0)
    }

    /// Cursor one past the last element.
    #[inline]
    pub fn cursor_end(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_ptr(), self.len)
    }

    /// Moves the live elements into `block`, leaving `gap` uninitialized slots
    /// at `index`, installs the block and releases the previous one.
    ///
    /// # Safety
    ///
    /// `block` must hold at least `len + gap` slots, none of them live.
    unsafe fn relocate(&mut self, block: Block<T>, index: usize, gap: usize) {
        let old = self.buf.ptr();
        let new = block.as_ptr();
        uninit::move_range(old, new, index);
        uninit::move_range(old.add(index), new.add(index + gap), self.len - index);
        let old_block = self.buf.replace(block);
        tracing::trace!(
            old_capacity = old_block.capacity(),
            new_capacity = block.capacity(),
            len = self.len,
            "dyn array reallocated"
        );
        raw_alloc::deallocate(old_block);
    }

    /// Appends an element to the back of the array.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows or the allocation fails.
    #[inline]
    pub fn push(&mut self, value: T) {
        // Fast path: spare capacity
        if self.len < self.capacity() {
            unsafe { lifecycle::construct(self.as_mut_ptr().add(self.len), value) };
            self.len += 1;
            return;
        }
        self.push_slow(value);
    }

    #[cold]
    #[inline(never)]
    fn push_slow(&mut self, value: T) {
        if let Err(err) = self.try_push(value) {
            handle_error(err);
        }
    }

    /// Appends an element, returning an error instead of panicking if the array
    /// has to grow and cannot.
    ///
    /// On error the array is unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<(), TryReserveError> {
        if self.len == self.capacity() {
            let block = self.buf.allocate_grown(1)?;
            unsafe { self.relocate(block, self.len, 0) };
        }
        unsafe { lifecycle::construct(self.as_mut_ptr().add(self.len), value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and returns it, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { lifecycle::take(self.as_mut_ptr().add(self.len)) })
    }

    /// Inserts `element` at `index`, shifting everything after it to the right,
    /// and returns `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, or if growing fails.
    pub fn insert(&mut self, index: usize, element: T) -> usize {
        self.try_insert(index, element)
            .unwrap_or_else(|e| handle_error(e))
    }

    /// Fallible version of [`insert`](Self::insert). On error the array is unchanged.
    pub fn try_insert(&mut self, index: usize, element: T) -> Result<usize, TryReserveError> {
        let len = self.len;
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");

        if len == self.capacity() {
            // Prefix and suffix go to either side of the new slot.
            let block = self.buf.allocate_grown(1)?;
            unsafe { self.relocate(block, index, 1) };
        } else if index < len {
            unsafe {
                let p = self.as_mut_ptr().add(index);
                uninit::move_range(p, p.add(1), len - index);
            }
        }

        unsafe { lifecycle::construct(self.as_mut_ptr().add(index), element) };
        self.len += 1;
        Ok(index)
    }

    /// Inserts `n` clones of `value` at `index` and returns `index`.
    ///
    /// If a clone panics, the clones made so far are dropped and the array is
    /// restored to its previous contents before the panic continues.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, or if growing fails.
    pub fn insert_n(&mut self, index: usize, n: usize, value: &T) -> usize
    where
        T: Clone,
    {
        self.try_insert_n(index, n, value)
            .unwrap_or_else(|e| handle_error(e))
    }

    /// Fallible version of [`insert_n`](Self::insert_n). On error the array is unchanged.
    pub fn try_insert_n(&mut self, index: usize, n: usize, value: &T) -> Result<usize, TryReserveError>
    where
        T: Clone,
    {
        let len = self.len;
        assert!(index <= len, "insertion index (is {index}) should be <= len (is {len})");
        if n == 0 {
            return Ok(index);
        }

        if self.capacity() - len >= n {
            unsafe {
                let gap = self.as_mut_ptr().add(index);
                let tail = len - index;
                uninit::move_range(gap, gap.add(n), tail);
                let mut guard = GapGuard {
                    gap,
                    width: n,
                    tail,
                    written: 0,
                };
                while guard.written < n {
                    lifecycle::construct(gap.add(guard.written), value.clone());
                    guard.written += 1;
                }
                std::mem::forget(guard);
            }
        } else {
            // The clones are the only fallible step; build them in the new
            // block before anything moves out of the old one.
            let pending = Pending::new(self.buf.allocate_grown(n)?);
            unsafe { uninit::fill_n(pending.as_ptr().add(index), n, value) };
            let block = pending.commit();
            unsafe { self.relocate(block, index, n) };
        }

        self.len += n;
        Ok(index)
    }

    /// Removes and returns the element at `index`, shifting everything after it
    /// to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");
        unsafe {
            let p = self.as_mut_ptr().add(index);
            let value = lifecycle::take(p);
            uninit::move_range(p.add(1), p, len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Drops the element at `index` and returns the index of the element that
    /// followed it (now at `index`).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        let len = self.len;
        assert!(index < len, "removal index (is {index}) should be < len (is {len})");
        unsafe {
            let p = self.as_mut_ptr().add(index);
            self.len = index;
            lifecycle::destroy(p);
            uninit::move_range(p.add(1), p, len - index - 1);
        }
        self.len = len - 1;
        index
    }

    /// Drops the elements in `range` and returns `range.start`.
    ///
    /// The capacity is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or extends past `len`.
    pub fn erase_range(&mut self, range: Range<usize>) -> usize {
        let Range { start, end } = range;
        assert!(start <= end, "erase range starts at {start} but ends at {end}");
        assert!(end <= self.len, "erase range end (is {end}) should be <= len (is {})", self.len);

        let tail = self.len - end;
        unsafe {
            let p = self.as_mut_ptr();
            // Shrink first: a panicking destructor then leaks the tail instead
            // of dropping it twice.
            self.len = start;
            lifecycle::destroy_range(p.add(start), end - start);
            uninit::move_range(p.add(end), p.add(start), tail);
        }
        self.len = start + tail;
        start
    }

    /// Shortens the array to `len` elements, dropping the rest.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let remaining = self.len - len;
        // Update len BEFORE dropping to prevent double-free if drop panics
        self.len = len;
        unsafe { lifecycle::destroy_range(self.as_mut_ptr().add(len), remaining) };
    }

    /// Drops every element. The capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes to `new_len`, filling new slots with clones of `value`.
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        if new_len <= self.len {
            self.truncate(new_len);
        } else {
            self.insert_n(self.len, new_len - self.len, &value);
        }
    }

    /// Resizes to `new_len`, filling new slots with values returned by `f`.
    pub fn resize_with<F>(&mut self, new_len: usize, f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        let add = new_len - self.len;
        self.reserve(add);
        unsafe { uninit::fill_with(self.as_mut_ptr().add(self.len), add, f) };
        self.len = new_len;
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Reverses the order of the elements in place.
    #[inline]
    pub fn reverse(&mut self) {
        self.as_mut_slice().reverse();
    }

    /// Reserves capacity for at least `additional` more elements, following the
    /// growth policy.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or the allocation fails.
    pub fn reserve(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve(additional) {
            handle_error(err);
        }
    }

    /// Tries to reserve capacity for at least `additional` more elements.
    ///
    /// On error the array is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        if self.capacity() - self.len >= additional {
            return Ok(());
        }
        let needed = self
            .len
            .checked_add(additional)
            .ok_or_else(TryReserveError::capacity_overflow)?;
        let block = self.buf.allocate_grown(needed - self.capacity())?;
        unsafe { self.relocate(block, self.len, 0) };
        Ok(())
    }

    /// Reserves room for exactly `additional` more elements.
    pub fn reserve_exact(&mut self, additional: usize) {
        if let Err(err) = self.try_reserve_exact(additional) {
            handle_error(err);
        }
    }

    /// Tries to reserve room for exactly `additional` more elements.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        if self.capacity() - self.len >= additional {
            return Ok(());
        }
        let needed = self
            .len
            .checked_add(additional)
            .ok_or_else(TryReserveError::capacity_overflow)?;
        let block = raw_alloc::allocate(needed)?;
        unsafe { self.relocate(block, self.len, 0) };
        Ok(())
    }

    /// Shrinks the capacity to the current length.
    pub fn shrink_to_fit(&mut self) {
        if Self::IS_ZST || self.capacity() == self.len {
            return;
        }
        let block = raw_alloc::allocate(self.len).unwrap_or_else(|e| handle_error(e));
        unsafe { self.relocate(block, self.len, 0) };
    }

    /// Appends clones of every element in `other`.
    pub fn extend_from_slice(&mut self, other: &[T])
    where
        T: Clone,
    {
        self.reserve(other.len());
        unsafe { uninit::clone_slice(other, self.as_mut_ptr().add(self.len)) };
        self.len += other.len();
    }

    /// Replaces the contents with clones of `src`, reusing the current block
    /// when it is large enough.
    pub fn assign_from_slice(&mut self, src: &[T])
    where
        T: Clone,
    {
        self.clear();
        self.extend_from_slice(src);
    }

    /// Replaces the contents with the items of `iter`.
    pub fn assign<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.clear();
        self.extend(iter);
    }

    /// Exchanges the contents of two arrays without moving any element.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        unsafe { lifecycle::destroy_range(self.as_mut_ptr(), self.len) };
        // RawArray will be dropped automatically and free the memory
    }
}

impl<T: Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        if self.is_empty() {
            return Self::new();
        }
        Self::from(self.as_slice())
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign_from_slice(source.as_slice());
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynArray<T> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynArray<T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T: PartialEq<U>, U> PartialEq<DynArray<U>> for DynArray<T> {
    fn eq(&self, other: &DynArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for DynArray<T> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U> PartialEq<&[U]> for DynArray<T> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for DynArray<T> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U> PartialEq<Vec<U>> for DynArray<T> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: PartialOrd> PartialOrd for DynArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for DynArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: std::hash::Hash> std::hash::Hash for DynArray<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Clone + 'a> Extend<&'a T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new();
        arr.extend(iter);
        arr
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(src: &[T]) -> Self {
        let mut arr = Self::with_initial(src.len());
        unsafe { uninit::clone_slice(src, arr.as_mut_ptr()) };
        arr.len = src.len();
        arr
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(src: [T; N]) -> Self {
        let mut arr = Self::with_initial(N);
        let src = ManuallyDrop::new(src);
        unsafe { uninit::move_range(src.as_ptr(), arr.as_mut_ptr(), N) };
        arr.len = N;
        arr
    }
}

impl<T> From<Vec<T>> for DynArray<T> {
    fn from(mut src: Vec<T>) -> Self {
        let n = src.len();
        let mut arr = Self::with_initial(n);
        unsafe {
            // The vector keeps its block but gives up ownership of the elements.
            src.set_len(0);
            uninit::move_range(src.as_ptr(), arr.as_mut_ptr(), n);
        }
        arr.len = n;
        arr
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let this = ManuallyDrop::new(self);
        // Safety: `this` is never dropped, so the block moves into the iterator
        let buf = unsafe { std::ptr::read(&this.buf) };
        IntoIter {
            buf,
            start: 0,
            end: this.len,
        }
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Creates a [`DynArray`] from a list of elements or from `value; count`.
///
/// ```
/// use rawseq::dynarr;
///
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr.len(), 3);
/// let zeros = dynarr![0u8; 4];
/// assert_eq!(zeros, [0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::DynArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynArray::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynArray::from([$($x),+])
    };
}
