//! Comparison tests between the rawseq containers and the std collections
//!
//! Random operation sequences are applied to `DynArray` and `Vec`, to
//! `SegmentedDeque` and `VecDeque`, and to `ArenaList` and `LinkedList`, and
//! the contents are compared after every step.

use proptest::prelude::*;
use rawseq::{ArenaList, DynArray, Queue, SegmentedDeque, Stack};
use std::collections::hash_map::DefaultHasher;
use std::collections::{LinkedList, VecDeque};
use std::hash::{Hash, Hasher};

/// Small buffers so that short sequences already cross buffer and map
/// boundaries.
type TestDeque<T> = SegmentedDeque<T, 4>;

// ============================================================================
// COMPARISON TESTING INFRASTRUCTURE
// ============================================================================

/// A trait that abstracts the array operations under test.
/// Both Vec<T> and DynArray<T> implement these operations.
trait VecLike<T> {
    fn new_vec() -> Self;
    fn push_val(&mut self, value: T);
    fn pop_val(&mut self) -> Option<T>;
    fn insert_val(&mut self, index: usize, value: T);
    fn insert_n_val(&mut self, index: usize, n: usize, value: &T)
    where
        T: Clone;
    fn remove_val(&mut self, index: usize) -> T;
    fn erase_range_val(&mut self, start: usize, end: usize);
    fn truncate_val(&mut self, len: usize);
    fn resize_val(&mut self, len: usize, value: T)
    where
        T: Clone;
    fn clear_val(&mut self);
    fn reverse_val(&mut self);
    fn extend_val<I: IntoIterator<Item = T>>(&mut self, iter: I);
    fn shrink_val(&mut self);
    fn as_slice_val(&self) -> &[T];
}

impl<T> VecLike<T> for Vec<T> {
    fn new_vec() -> Self {
        Vec::new()
    }
    fn push_val(&mut self, value: T) {
        self.push(value);
    }
    fn pop_val(&mut self) -> Option<T> {
        self.pop()
    }
    fn insert_val(&mut self, index: usize, value: T) {
        self.insert(index, value);
    }
    fn insert_n_val(&mut self, index: usize, n: usize, value: &T)
    where
        T: Clone,
    {
        self.splice(index..index, std::iter::repeat(value.clone()).take(n));
    }
    fn remove_val(&mut self, index: usize) -> T {
        self.remove(index)
    }
    fn erase_range_val(&mut self, start: usize, end: usize) {
        self.drain(start..end);
    }
    fn truncate_val(&mut self, len: usize) {
        self.truncate(len);
    }
    fn resize_val(&mut self, len: usize, value: T)
    where
        T: Clone,
    {
        self.resize(len, value);
    }
    fn clear_val(&mut self) {
        self.clear();
    }
    fn reverse_val(&mut self) {
        self.reverse();
    }
    fn extend_val<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend(iter);
    }
    fn shrink_val(&mut self) {
        self.shrink_to_fit();
    }
    fn as_slice_val(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> VecLike<T> for DynArray<T> {
    fn new_vec() -> Self {
        DynArray::new()
    }
    fn push_val(&mut self, value: T) {
        self.push(value);
    }
    fn pop_val(&mut self) -> Option<T> {
        self.pop()
    }
    fn insert_val(&mut self, index: usize, value: T) {
        let at = self.insert(index, value);
        assert_eq!(at, index, "insert() returned the wrong position");
    }
    fn insert_n_val(&mut self, index: usize, n: usize, value: &T)
    where
        T: Clone,
    {
        self.insert_n(index, n, value);
    }
    fn remove_val(&mut self, index: usize) -> T {
        self.remove(index)
    }
    fn erase_range_val(&mut self, start: usize, end: usize) {
        let cap = self.capacity();
        assert_eq!(self.erase_range(start..end), start);
        assert_eq!(self.capacity(), cap, "erase changed the capacity");
    }
    fn truncate_val(&mut self, len: usize) {
        self.truncate(len);
    }
    fn resize_val(&mut self, len: usize, value: T)
    where
        T: Clone,
    {
        self.resize(len, value);
    }
    fn clear_val(&mut self) {
        self.clear();
    }
    fn reverse_val(&mut self) {
        self.reverse();
    }
    fn extend_val<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend(iter);
    }
    fn shrink_val(&mut self) {
        self.shrink_to_fit();
    }
    fn as_slice_val(&self) -> &[T] {
        self.as_slice()
    }
}

/// Array operations.
#[derive(Debug, Clone)]
enum VecOp<T> {
    Push(T),
    Pop,
    Insert(usize, T),
    InsertN(usize, usize, T),
    Remove(usize),
    EraseRange(usize, usize),
    Truncate(usize),
    Resize(usize, T),
    Clear,
    Reverse,
    Extend(Vec<T>),
    ShrinkToFit,
}

/// Apply an operation to both arrays and compare results.
fn apply_op<T: Clone + PartialEq + std::fmt::Debug>(
    std_vec: &mut Vec<T>,
    arr: &mut DynArray<T>,
    op: &VecOp<T>,
) {
    match op {
        VecOp::Push(v) => {
            std_vec.push_val(v.clone());
            arr.push_val(v.clone());
        }
        VecOp::Pop => {
            let std_result = std_vec.pop_val();
            let arr_result = arr.pop_val();
            assert_eq!(std_result, arr_result, "pop() mismatch");
        }
        VecOp::Insert(idx, v) => {
            if *idx <= std_vec.len() {
                std_vec.insert_val(*idx, v.clone());
                arr.insert_val(*idx, v.clone());
            }
        }
        VecOp::InsertN(idx, n, v) => {
            if *idx <= std_vec.len() {
                std_vec.insert_n_val(*idx, *n, v);
                arr.insert_n_val(*idx, *n, v);
            }
        }
        VecOp::Remove(idx) => {
            if *idx < std_vec.len() {
                let std_result = std_vec.remove_val(*idx);
                let arr_result = arr.remove_val(*idx);
                assert_eq!(std_result, arr_result, "remove() mismatch");
            }
        }
        VecOp::EraseRange(a, b) => {
            let (start, end) = (*a.min(b), *a.max(b));
            if end <= std_vec.len() {
                std_vec.erase_range_val(start, end);
                arr.erase_range_val(start, end);
            }
        }
        VecOp::Truncate(len) => {
            std_vec.truncate_val(*len);
            arr.truncate_val(*len);
        }
        VecOp::Resize(len, v) => {
            std_vec.resize_val(*len, v.clone());
            arr.resize_val(*len, v.clone());
        }
        VecOp::Clear => {
            std_vec.clear_val();
            arr.clear_val();
        }
        VecOp::Reverse => {
            std_vec.reverse_val();
            arr.reverse_val();
        }
        VecOp::Extend(vals) => {
            std_vec.extend_val(vals.clone());
            arr.extend_val(vals.clone());
        }
        VecOp::ShrinkToFit => {
            std_vec.shrink_val();
            arr.shrink_val();
        }
    }
}

/// Verify that both arrays have the same content.
fn assert_vecs_equal<T: Clone + PartialEq + std::fmt::Debug>(std_vec: &[T], arr: &DynArray<T>) {
    assert_eq!(std_vec.len(), arr.len(), "length mismatch");
    assert_eq!(std_vec.is_empty(), arr.is_empty(), "is_empty mismatch");
    assert!(arr.len() <= arr.capacity(), "len exceeds capacity");
    assert_eq!(std_vec, arr.as_slice_val(), "content mismatch");

    assert_eq!(std_vec.first(), arr.front(), "front() mismatch");
    assert_eq!(std_vec.last(), arr.back(), "back() mismatch");
    assert_eq!(std_vec.get(std_vec.len()), arr.get(arr.len()));
}

/// Deque operations.
#[derive(Debug, Clone)]
enum DequeOp<T> {
    PushBack(T),
    PushFront(T),
    PopBack,
    PopFront,
    Clear,
    Extend(Vec<T>),
}

fn apply_deque_op<T: Clone + PartialEq + std::fmt::Debug>(
    std_deque: &mut VecDeque<T>,
    deque: &mut TestDeque<T>,
    op: &DequeOp<T>,
) {
    match op {
        DequeOp::PushBack(v) => {
            std_deque.push_back(v.clone());
            deque.push_back(v.clone());
        }
        DequeOp::PushFront(v) => {
            std_deque.push_front(v.clone());
            deque.push_front(v.clone());
        }
        DequeOp::PopBack => {
            assert_eq!(std_deque.pop_back(), deque.pop_back(), "pop_back() mismatch");
        }
        DequeOp::PopFront => {
            assert_eq!(std_deque.pop_front(), deque.pop_front(), "pop_front() mismatch");
        }
        DequeOp::Clear => {
            std_deque.clear();
            deque.clear();
        }
        DequeOp::Extend(vals) => {
            std_deque.extend(vals.iter().cloned());
            deque.extend(vals.iter().cloned());
        }
    }
}

fn assert_deques_equal<T: PartialEq + std::fmt::Debug>(
    std_deque: &VecDeque<T>,
    deque: &TestDeque<T>,
) {
    assert_eq!(std_deque.len(), deque.len(), "length mismatch");
    assert_eq!(deque.end() - deque.begin(), deque.len() as isize, "cursor distance mismatch");
    assert!(std_deque.iter().eq(deque.iter()), "forward mismatch");
    assert!(std_deque.iter().rev().eq(deque.iter().rev()), "backward mismatch");
    assert_eq!(std_deque.front(), deque.front(), "front() mismatch");
    assert_eq!(std_deque.back(), deque.back(), "back() mismatch");
    for i in 0..std_deque.len() {
        assert_eq!(std_deque.get(i), deque.get(i), "get({}) mismatch", i);
    }
    assert_eq!(deque.get(deque.len()), None);
}

/// List operations. Positions index into the current element order.
#[derive(Debug, Clone)]
enum ListOp<T> {
    PushBack(T),
    PushFront(T),
    PopBack,
    PopFront,
    InsertBefore(usize, T),
    Remove(usize),
}

fn apply_list_op<T: Clone + PartialEq + std::fmt::Debug>(
    std_list: &mut LinkedList<T>,
    list: &mut ArenaList<T>,
    handles: &mut Vec<rawseq::Handle>,
    op: &ListOp<T>,
) {
    match op {
        ListOp::PushBack(v) => {
            std_list.push_back(v.clone());
            handles.push(list.push_back(v.clone()));
        }
        ListOp::PushFront(v) => {
            std_list.push_front(v.clone());
            handles.insert(0, list.push_front(v.clone()));
        }
        ListOp::PopBack => {
            assert_eq!(std_list.pop_back(), list.pop_back(), "pop_back() mismatch");
            handles.pop();
        }
        ListOp::PopFront => {
            assert_eq!(std_list.pop_front(), list.pop_front(), "pop_front() mismatch");
            if !handles.is_empty() {
                handles.remove(0);
            }
        }
        ListOp::InsertBefore(pos, v) => {
            if *pos < handles.len() {
                let mut tail = std_list.split_off(*pos);
                std_list.push_back(v.clone());
                std_list.append(&mut tail);
                let handle = list.insert_before(handles[*pos], v.clone());
                handles.insert(*pos, handle);
            }
        }
        ListOp::Remove(pos) => {
            if *pos < handles.len() {
                let mut tail = std_list.split_off(*pos);
                let expected = tail.pop_front();
                std_list.append(&mut tail);
                assert_eq!(expected, list.remove(handles.remove(*pos)), "remove() mismatch");
            }
        }
    }
}

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for generating a single array operation.
fn vec_op_strategy() -> impl Strategy<Value = VecOp<i32>> {
    prop_oneof![
        any::<i32>().prop_map(VecOp::Push),
        Just(VecOp::Pop),
        (0usize..100, any::<i32>()).prop_map(|(idx, v)| VecOp::Insert(idx, v)),
        (0usize..100, 0usize..40, any::<i32>()).prop_map(|(idx, n, v)| VecOp::InsertN(idx, n, v)),
        (0usize..100).prop_map(VecOp::Remove),
        (0usize..100, 0usize..100).prop_map(|(a, b)| VecOp::EraseRange(a, b)),
        (0usize..200).prop_map(VecOp::Truncate),
        (0usize..200, any::<i32>()).prop_map(|(len, v)| VecOp::Resize(len, v)),
        Just(VecOp::Clear),
        Just(VecOp::Reverse),
        prop::collection::vec(any::<i32>(), 0..50).prop_map(VecOp::Extend),
        Just(VecOp::ShrinkToFit),
    ]
}

/// Strategy for generating a sequence of operations.
fn ops_sequence_strategy() -> impl Strategy<Value = Vec<VecOp<i32>>> {
    prop::collection::vec(vec_op_strategy(), 0..200)
}

fn deque_op_strategy() -> impl Strategy<Value = DequeOp<i32>> {
    prop_oneof![
        3 => any::<i32>().prop_map(DequeOp::PushBack),
        3 => any::<i32>().prop_map(DequeOp::PushFront),
        2 => Just(DequeOp::PopBack),
        2 => Just(DequeOp::PopFront),
        1 => prop::collection::vec(any::<i32>(), 0..40).prop_map(DequeOp::Extend),
        1 => Just(DequeOp::Clear),
    ]
}

fn list_op_strategy() -> impl Strategy<Value = ListOp<i32>> {
    prop_oneof![
        any::<i32>().prop_map(ListOp::PushBack),
        any::<i32>().prop_map(ListOp::PushFront),
        Just(ListOp::PopBack),
        Just(ListOp::PopFront),
        (0usize..50, any::<i32>()).prop_map(|(pos, v)| ListOp::InsertBefore(pos, v)),
        (0usize..50).prop_map(ListOp::Remove),
    ]
}

fn hash_of<H: Hash>(value: &H) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// PROPTEST TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Test that a random sequence of array operations produces identical results.
    #[test]
    fn proptest_array_operations_match(ops in ops_sequence_strategy()) {
        let mut std_vec: Vec<i32> = Vec::new_vec();
        let mut arr: DynArray<i32> = DynArray::new_vec();

        for op in &ops {
            apply_op(&mut std_vec, &mut arr, op);
            assert_vecs_equal(&std_vec, &arr);
        }
    }

    /// Test push followed by the different ways of iterating.
    #[test]
    fn proptest_array_push_and_iter(values in prop::collection::vec(any::<i32>(), 0..500)) {
        let mut arr: DynArray<i32> = DynArray::new();
        for v in &values {
            arr.push(*v);
        }

        let collected: Vec<_> = arr.iter().copied().collect();
        prop_assert_eq!(&collected, &values);

        let rev: Vec<_> = arr.clone().into_iter().rev().collect();
        let std_rev: Vec<_> = values.iter().rev().copied().collect();
        prop_assert_eq!(rev, std_rev);

        let from_cursors = unsafe { DynArray::from_cursors(arr.cursor_begin(), arr.cursor_end()) };
        prop_assert_eq!(from_cursors, values);
    }

    /// Insert at any position followed by erase at the returned position is a no-op.
    #[test]
    fn proptest_array_insert_erase_roundtrip(
        values in prop::collection::vec(any::<i32>(), 0..100),
        pos in 0usize..101,
        value in any::<i32>()
    ) {
        let mut arr: DynArray<i32> = values.iter().copied().collect();
        let pos = pos.min(arr.len());
        let at = arr.insert(pos, value);
        prop_assert_eq!(arr[at], value);
        arr.erase(at);
        prop_assert_eq!(arr, values);
    }

    /// Appending N elements reallocates O(log N) times.
    #[test]
    fn proptest_array_growth_is_geometric(n in 1usize..20_000) {
        let mut arr: DynArray<u8> = DynArray::new();
        let mut reallocations = 0u32;
        let mut cap = 0;
        for _ in 0..n {
            arr.push(0);
            if arr.capacity() != cap {
                prop_assert!(cap == 0 || arr.capacity() >= 2 * cap);
                cap = arr.capacity();
                reallocations += 1;
            }
        }
        prop_assert!(reallocations <= 1 + (n as f64 / 16.0).log2().ceil().max(0.0) as u32);
    }

    /// Clone, equality, ordering and hashing agree with Vec.
    #[test]
    fn proptest_array_traits(
        a in prop::collection::vec(any::<i32>(), 0..50),
        b in prop::collection::vec(any::<i32>(), 0..50)
    ) {
        let arr_a: DynArray<i32> = DynArray::from(a.clone());
        let arr_b: DynArray<i32> = DynArray::from(&b[..]);

        prop_assert_eq!(arr_a == arr_b, a == b);
        prop_assert_eq!(arr_a.cmp(&arr_b), a.cmp(&b));
        prop_assert_eq!(hash_of(&arr_a), hash_of(&a.as_slice()));
        prop_assert_eq!(arr_a.clone(), a);

        let mut assigned = arr_b.clone();
        assigned.clone_from(&arr_a);
        prop_assert_eq!(assigned, arr_a);
    }

    /// Test that a random sequence of deque operations produces identical results.
    #[test]
    fn proptest_deque_operations_match(ops in prop::collection::vec(deque_op_strategy(), 0..300)) {
        let mut std_deque: VecDeque<i32> = VecDeque::new();
        let mut deque: TestDeque<i32> = TestDeque::new();

        for op in &ops {
            apply_deque_op(&mut std_deque, &mut deque, op);
            assert_deques_equal(&std_deque, &deque);
        }
    }

    /// Cursor jumps agree with element indices, and jumping back returns to the start.
    #[test]
    fn proptest_deque_cursor_jumps(
        front in 0usize..40,
        back in 0usize..40,
        from in 0usize..80,
        k in -80isize..80
    ) {
        use rawseq::Cursor as _;

        let mut deque: TestDeque<usize> = TestDeque::new();
        for i in 0..back {
            deque.push_back(front + i);
        }
        for i in (0..front).rev() {
            deque.push_front(i);
        }
        let len = deque.len();
        prop_assume!(len > 0);
        let from = from % len;

        let cursor = deque.begin() + from as isize;
        prop_assert_eq!(unsafe { *cursor.get() }, from);
        prop_assert_eq!(cursor + k - k, cursor);
        prop_assert_eq!((cursor + k) - cursor, k);

        let target = from as isize + k;
        if (0..len as isize).contains(&target) {
            prop_assert_eq!(unsafe { *(cursor + k).get() }, target as usize);
        }
    }

    /// Clone, equality and hashing of deques.
    #[test]
    fn proptest_deque_traits(values in prop::collection::vec(any::<i32>(), 0..100)) {
        let deque: TestDeque<i32> = values.iter().copied().collect();
        let copy = deque.clone();
        prop_assert_eq!(&copy, &deque);
        prop_assert_eq!(hash_of(&copy), hash_of(&deque));

        let owned: Vec<_> = deque.into_iter().collect();
        prop_assert_eq!(owned, values);
    }

    /// Test that a random sequence of list operations produces identical results.
    #[test]
    fn proptest_list_operations_match(ops in prop::collection::vec(list_op_strategy(), 0..200)) {
        let mut std_list: LinkedList<i32> = LinkedList::new();
        let mut list: ArenaList<i32> = ArenaList::new();
        let mut handles = Vec::new();

        for op in &ops {
            apply_list_op(&mut std_list, &mut list, &mut handles, op);
            prop_assert_eq!(std_list.len(), list.len());
            prop_assert!(std_list.iter().eq(list.iter()));
            prop_assert!(std_list.iter().rev().eq(list.iter().rev()));
            for (handle, expected) in handles.iter().zip(std_list.iter()) {
                prop_assert_eq!(list.get(*handle), Some(expected));
            }
        }
    }

    /// Stack and queue order.
    #[test]
    fn proptest_adapters(values in prop::collection::vec(any::<i32>(), 0..300)) {
        let mut stack = Stack::new();
        let mut queue = Queue::new();
        for v in &values {
            stack.push(*v);
            queue.push(*v);
        }
        prop_assert_eq!(stack.len(), values.len());
        prop_assert_eq!(queue.len(), values.len());

        let popped: Vec<_> = std::iter::from_fn(|| stack.pop()).collect();
        let expected: Vec<_> = values.iter().rev().copied().collect();
        prop_assert_eq!(popped, expected);

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        prop_assert_eq!(drained, values);
    }
}

// ============================================================================
// DROP ACCOUNTING
// ============================================================================

mod drops {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Tracked(Rc<Cell<isize>>);

    impl Tracked {
        fn new(live: &Rc<Cell<isize>>) -> Self {
            live.set(live.get() + 1);
            Tracked(live.clone())
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            Tracked::new(&self.0)
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Every element constructed by an array operation is dropped exactly once.
        #[test]
        fn proptest_array_drops_balance(ops in ops_sequence_strategy()) {
            let live = Rc::new(Cell::new(0));
            {
                let mut arr: DynArray<Tracked> = DynArray::new();
                for op in &ops {
                    match op {
                        VecOp::Push(_) => arr.push(Tracked::new(&live)),
                        VecOp::Pop => drop(arr.pop()),
                        VecOp::Insert(i, _) if *i <= arr.len() => {
                            arr.insert(*i, Tracked::new(&live));
                        }
                        VecOp::InsertN(i, n, _) if *i <= arr.len() => {
                            let proto = Tracked::new(&live);
                            arr.insert_n(*i, *n, &proto);
                        }
                        VecOp::Remove(i) if *i < arr.len() => drop(arr.remove(*i)),
                        VecOp::EraseRange(a, b) if *a.max(b) <= arr.len() => {
                            arr.erase_range(*a.min(b)..*a.max(b));
                        }
                        VecOp::Truncate(n) => arr.truncate(*n),
                        VecOp::Clear => arr.clear(),
                        _ => {}
                    }
                    prop_assert_eq!(live.get(), arr.len() as isize);
                }
            }
            prop_assert_eq!(live.get(), 0);
        }

        /// Every element pushed into a deque is dropped exactly once.
        #[test]
        fn proptest_deque_drops_balance(ops in prop::collection::vec(deque_op_strategy(), 0..300)) {
            let live = Rc::new(Cell::new(0));
            {
                let mut deque: TestDeque<Tracked> = TestDeque::new();
                for op in &ops {
                    match op {
                        DequeOp::PushBack(_) => deque.push_back(Tracked::new(&live)),
                        DequeOp::PushFront(_) => deque.push_front(Tracked::new(&live)),
                        DequeOp::PopBack => drop(deque.pop_back()),
                        DequeOp::PopFront => drop(deque.pop_front()),
                        DequeOp::Clear => deque.clear(),
                        DequeOp::Extend(vals) => {
                            deque.extend(vals.iter().map(|_| Tracked::new(&live)));
                        }
                    }
                    prop_assert_eq!(live.get(), deque.len() as isize);
                }
            }
            prop_assert_eq!(live.get(), 0);
        }
    }
}
