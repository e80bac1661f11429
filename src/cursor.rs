//! Traversal categories for positional cursors.
//!
//! A [`Cursor`] is a position inside a container that can be moved and compared,
//! in the manner of an STL iterator. Each cursor type declares its
//! [`Category`] once, and the helpers here pick the algorithm from it: random
//! access cursors are always moved and measured in constant time, everything
//! else is stepped.

/// How a cursor can traverse its sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Single pass, forward only.
    Input,
    /// Multi-pass, forward only.
    Forward,
    /// Multi-pass, both directions one step at a time.
    Bidirectional,
    /// Multi-pass, constant-time jumps and distances.
    RandomAccess,
}

impl Category {
    /// Whether the same range can be traversed more than once.
    #[inline]
    pub const fn is_multi_pass(self) -> bool {
        !matches!(self, Category::Input)
    }

    #[inline]
    pub const fn is_random_access(self) -> bool {
        matches!(self, Category::RandomAccess)
    }
}

/// A position inside a sequence.
///
/// Cursors do not check that they stay inside their container. Moving one
/// outside the range it was created from and then dereferencing it is
/// undefined behavior, which is why [`Cursor::get`] is `unsafe`.
pub trait Cursor: Clone + PartialEq {
    type Item;

    const CATEGORY: Category;

    /// Moves to the next position.
    fn step(&mut self);

    /// Moves to the previous position.
    ///
    /// # Panics
    ///
    /// The default implementation panics; cursors of category
    /// [`Category::Bidirectional`] or above override it.
    fn step_back(&mut self) {
        panic!("{:?} cursor cannot move backward", Self::CATEGORY);
    }

    /// Moves by `n` positions in constant time.
    ///
    /// Only called for [`Category::RandomAccess`] cursors, which must override it.
    fn jump(&mut self, n: isize) {
        let _ = n;
        unreachable!("{:?} cursor has no constant-time jump", Self::CATEGORY);
    }

    /// Signed number of positions from `origin` to `self`, in constant time.
    ///
    /// Only called for [`Category::RandomAccess`] cursors, which must override it.
    fn offset_from(&self, origin: &Self) -> isize {
        let _ = origin;
        unreachable!("{:?} cursor has no constant-time distance", Self::CATEGORY);
    }

    /// Returns the element at the cursor.
    ///
    /// # Safety
    ///
    /// The cursor must address a live element of a container that is still
    /// borrowed for the cursor's lifetime.
    unsafe fn get(&self) -> &Self::Item;
}

/// Moves `cursor` by `n` positions.
///
/// # Panics
///
/// Panics if `n` is negative and the cursor cannot move backward.
pub fn advance<C: Cursor>(cursor: &mut C, n: isize) {
    match C::CATEGORY {
        Category::RandomAccess => cursor.jump(n),
        Category::Bidirectional if n < 0 => {
            for _ in 0..n.unsigned_abs() {
                cursor.step_back();
            }
        }
        _ => {
            assert!(n >= 0, "cannot move a {:?} cursor backward", C::CATEGORY);
            for _ in 0..n {
                cursor.step();
            }
        }
    }
}

/// Number of positions from `first` to `last`.
///
/// `last` must be reachable from `first` by stepping forward.
pub fn distance<C: Cursor>(first: &C, last: &C) -> usize {
    match C::CATEGORY {
        Category::RandomAccess => {
            let n = last.offset_from(first);
            debug_assert!(n >= 0, "last precedes first");
            n as usize
        }
        _ => {
            let mut probe = first.clone();
            let mut n = 0;
            while probe != *last {
                probe.step();
                n += 1;
            }
            n
        }
    }
}
