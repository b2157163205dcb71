//! Fixed-capacity indexed binary heap.
//!
//! Unlike [std::collections::BinaryHeap], every item carries a dense key and the heap keeps a
//! table from key to array slot. This makes membership tests O(1) and lets the priority of an
//! item already in the heap be raised in O(log n), which A* needs when it finds a cheaper route
//! to an open cell.
use crate::error::{Error, Result};

const NOT_IN_HEAP: usize = usize::MAX;

/// An item that can be stored in a [PriorityHeap]. The heap is a max-heap over [Ord]: the
/// greatest item is the root. Keys must be unique among live items and smaller than the heap
/// capacity.
pub trait HeapItem: Ord {
    fn heap_key(&self) -> usize;
}

#[derive(Clone, Debug)]
pub struct PriorityHeap<T> {
    items: Vec<T>,
    positions: Vec<usize>,
}

impl<T: HeapItem> PriorityHeap<T> {
    pub fn with_capacity(capacity: usize) -> PriorityHeap<T> {
        PriorityHeap {
            items: Vec::with_capacity(capacity),
            positions: vec![NOT_IN_HEAP; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The highest priority item, if any.
    pub fn peek(&self) -> Option<&T> {
        self.items.first()
    }

    /// Empties the heap without giving up its storage.
    pub fn clear(&mut self) {
        for item in &self.items {
            self.positions[item.heap_key()] = NOT_IN_HEAP;
        }
        self.items.clear();
    }

    pub fn contains(&self, key: usize) -> bool {
        self.index_of(key).is_some()
    }

    /// Current array slot of the item with the given key.
    pub fn index_of(&self, key: usize) -> Option<usize> {
        match self.positions.get(key) {
            Some(&ix) if ix != NOT_IN_HEAP => Some(ix),
            _ => None,
        }
    }

    /// Adds an item and sifts it up to its place. Fails if the heap is full or the item's key
    /// does not fit the key space.
    pub fn insert(&mut self, item: T) -> Result<()> {
        let key = item.heap_key();
        if self.items.len() >= self.capacity() || key >= self.capacity() {
            return Err(Error::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        debug_assert!(!self.contains(key), "key {key} inserted twice");
        let ix = self.items.len();
        self.items.push(item);
        self.positions[key] = ix;
        self.sift_up(ix);
        Ok(())
    }

    /// Removes and returns the root.
    pub fn extract_top(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        self.positions[top.heap_key()] = NOT_IN_HEAP;
        if let Some(moved) = self.items.first() {
            self.positions[moved.heap_key()] = 0;
            self.sift_down(0);
        }
        Some(top)
    }

    /// Replaces the stored item sharing `item`'s key and restores heap order by sifting up.
    ///
    /// Only sifts up: the new item must rank at least as high as the one it replaces, which
    /// holds in A* because an open cell's cost only ever decreases. A caller whose update can
    /// lower an item's rank has to extract and reinsert instead. Returns `false` if no item with
    /// that key is in the heap.
    pub fn reprioritize(&mut self, item: T) -> bool {
        let Some(ix) = self.index_of(item.heap_key()) else {
            return false;
        };
        debug_assert!(item >= self.items[ix], "reprioritize lowered an item's rank");
        self.items[ix] = item;
        self.sift_up(ix);
        true
    }

    fn sift_up(&mut self, mut ix: usize) {
        while ix > 0 {
            let parent = (ix - 1) / 2;
            if self.items[ix] > self.items[parent] {
                self.swap(ix, parent);
                ix = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut ix: usize) {
        let n = self.items.len();
        loop {
            let left = 2 * ix + 1;
            let right = left + 1;
            if left >= n {
                return;
            }
            // Swap with the strictly higher ranked child, preferring the left one on ties
            let mut child = left;
            if right < n && self.items[right] > self.items[left] {
                child = right;
            }
            if self.items[child] > self.items[ix] {
                self.swap(ix, child);
                ix = child;
            } else {
                return;
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.items.swap(a, b);
        self.positions[self.items[a].heap_key()] = a;
        self.positions[self.items[b].heap_key()] = b;
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        for (ix, item) in self.items.iter().enumerate() {
            assert_eq!(self.positions[item.heap_key()], ix);
            if ix > 0 {
                assert!(self.items[(ix - 1) / 2] >= *item);
            }
        }
        let live = self.positions.iter().filter(|&&p| p != NOT_IN_HEAP).count();
        assert_eq!(live, self.items.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use std::cmp::{Ordering, Reverse};

    /// Min-heap item: smaller cost means higher priority.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Item {
        key: usize,
        cost: i32,
    }

    impl Ord for Item {
        fn cmp(&self, other: &Self) -> Ordering {
            other.cost.cmp(&self.cost).then(other.key.cmp(&self.key))
        }
    }

    impl PartialOrd for Item {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl HeapItem for Item {
        fn heap_key(&self) -> usize {
            self.key
        }
    }

    #[test]
    fn extracts_in_sorted_order() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let n = rng.gen_range(1..64);
            let mut heap = PriorityHeap::with_capacity(n);
            let mut costs = Vec::new();
            for key in 0..n {
                let cost = rng.gen_range(0..20);
                costs.push(cost);
                heap.insert(Item { key, cost }).unwrap();
                heap.assert_invariants();
            }
            costs.sort();
            let mut extracted = Vec::new();
            while let Some(item) = heap.extract_top() {
                heap.assert_invariants();
                extracted.push(item.cost);
            }
            assert_eq!(extracted, costs);
        }
    }

    #[test]
    fn random_operations_keep_invariants() {
        const N: usize = 50;
        let mut rng = StdRng::seed_from_u64(7);
        let mut heap = PriorityHeap::with_capacity(N);
        let mut live: Vec<Option<i32>> = vec![None; N];
        for _ in 0..5000 {
            let key = rng.gen_range(0..N);
            match (rng.gen_range(0..3), live[key]) {
                (0, None) => {
                    let cost = rng.gen_range(0..1000);
                    heap.insert(Item { key, cost }).unwrap();
                    live[key] = Some(cost);
                }
                (1, Some(cost)) => {
                    let cost = cost - rng.gen_range(0..50);
                    assert!(heap.reprioritize(Item { key, cost }));
                    live[key] = Some(cost);
                }
                _ => {
                    if let Some(top) = heap.extract_top() {
                        let best = live.iter().flatten().min().copied();
                        assert_eq!(Some(top.cost), best);
                        live[top.key] = None;
                    }
                }
            }
            heap.assert_invariants();
            for (key, cost) in live.iter().enumerate() {
                assert_eq!(heap.contains(key), cost.is_some());
            }
        }
    }

    #[test]
    fn reprioritize_moves_item_to_root() {
        let mut heap = PriorityHeap::with_capacity(4);
        for (key, cost) in [(0, 5), (1, 7), (2, 9), (3, 11)] {
            heap.insert(Item { key, cost }).unwrap();
        }
        assert!(heap.reprioritize(Item { key: 3, cost: 1 }));
        heap.assert_invariants();
        assert_eq!(heap.index_of(3), Some(0));
        assert_eq!(heap.extract_top().map(|i| i.key), Some(3));
        assert!(!heap.reprioritize(Item { key: 3, cost: 0 }));
    }

    #[test]
    fn capacity_is_fixed() {
        let mut heap = PriorityHeap::with_capacity(2);
        heap.insert(Item { key: 0, cost: 1 }).unwrap();
        heap.insert(Item { key: 1, cost: 2 }).unwrap();
        assert_eq!(
            heap.insert(Item { key: 0, cost: 3 }),
            Err(Error::CapacityExceeded { capacity: 2 })
        );
        let mut heap = PriorityHeap::with_capacity(2);
        assert!(heap.insert(Item { key: 5, cost: 1 }).is_err());
    }

    #[test]
    fn contains_and_clear() {
        let mut heap = PriorityHeap::with_capacity(8);
        assert!(!heap.contains(3));
        assert!(!heap.contains(100));
        heap.insert(Item { key: 3, cost: 4 }).unwrap();
        heap.insert(Item { key: 6, cost: 2 }).unwrap();
        assert!(heap.contains(3));
        assert_eq!(heap.peek().map(|i| i.key), Some(6));
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(3));
        assert_eq!(heap.extract_top(), None);
    }

    #[test]
    fn matches_std_binary_heap() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut heap = PriorityHeap::with_capacity(200);
        let mut reference = std::collections::BinaryHeap::new();
        for key in 0..200 {
            let cost = rng.gen_range(-100..100);
            heap.insert(Item { key, cost }).unwrap();
            reference.push(Reverse((cost, key)));
        }
        while let Some(Reverse((cost, key))) = reference.pop() {
            assert_eq!(heap.extract_top(), Some(Item { key, cost }));
        }
    }
}
