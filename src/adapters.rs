//! Stack and queue adapters over [`SegmentedDeque`].

use crate::SegmentedDeque;

/// Last-in first-out adapter. Elements are pushed and popped at the back.
///
/// ```
/// use rawseq::Stack;
///
/// let mut stack = Stack::new();
/// stack.push(1);
/// stack.push(2);
/// assert_eq!(stack.top(), Some(&2));
/// assert_eq!(stack.pop(), Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Stack<T> {
    inner: SegmentedDeque<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self {
            inner: SegmentedDeque::new(),
        }
    }

    /// Creates a stack of `n` default values.
    pub fn with_len(n: usize) -> Self
    where
        T: Default,
    {
        Self {
            inner: SegmentedDeque::with_len(n),
        }
    }

    /// Creates a stack of `n` clones of `value`.
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        Self {
            inner: SegmentedDeque::from_elem(value, n),
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.inner.push_back(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop_back()
    }

    /// The most recently pushed element.
    #[inline]
    pub fn top(&self) -> Option<&T> {
        self.inner.back()
    }

    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.inner.back_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Extend<T> for Stack<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<T> FromIterator<T> for Stack<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

/// First-in first-out adapter. Elements are pushed at the back and popped at
/// the front.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Queue<T> {
    inner: SegmentedDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            inner: SegmentedDeque::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.inner.push_back(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    /// The element that will be popped next.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.inner.front()
    }

    /// The most recently pushed element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.inner.back()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
