//! Array-backed binary min-heap used while building the Huffman tree.
//!
//! Equal elements are ordered by the sift rules alone: sifting up stops as soon
//! as the parent is `<=` the new element, and sifting down only moves past a
//! child that is strictly `<`. An element that is already nearer the root is
//! therefore never displaced by a later equal one. Tree construction depends on
//! this to rebuild the same tree on both sides of the codec.

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    slots: Vec<T>,
    capacity: usize,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            capacity: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots allocated for the heap, grown as `2 * capacity + 1`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn grow(&mut self) {
        let capacity = 2 * self.capacity + 1;
        let mut slots = Vec::with_capacity(capacity);
        // keep index order so the heap shape survives the move
        slots.extend(self.slots.drain(..));
        self.slots = slots;
        self.capacity = capacity;
    }
}

impl<T: PartialOrd> MinHeap<T> {
    pub fn insert(&mut self, item: T) {
        if self.slots.len() == self.capacity {
            self.grow();
        }
        self.slots.push(item);
        self.sift_up(self.slots.len() - 1);
    }

    pub fn extract_min(&mut self) -> Result<T> {
        if self.slots.is_empty() {
            return Err(Error::HeapUnderflow);
        }
        let min = self.slots.swap_remove(0);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    pub fn peek(&self) -> Option<&T> {
        self.slots.first()
    }

    /// Whether every non-root slot is `>=` its parent.
    pub fn is_valid(&self) -> bool {
        (1..self.slots.len()).all(|i| self.slots[(i - 1) / 2] <= self.slots[i])
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.slots[parent] <= self.slots[index] {
                return;
            }
            self.slots.swap(parent, index);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.slots[left] < self.slots[smallest] {
                smallest = left;
            }
            if right < len && self.slots[right] < self.slots[smallest] {
                smallest = right;
            }
            if smallest == index {
                return;
            }
            self.slots.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derivative::Derivative;

    #[derive(Debug, Clone, Copy, Derivative)]
    #[derivative(PartialEq, PartialOrd)]
    struct Tagged {
        key: u32,
        #[derivative(PartialEq = "ignore")]
        #[derivative(PartialOrd = "ignore")]
        tag: usize,
    }

    fn tagged(key: u32, tag: usize) -> Tagged {
        Tagged { key, tag }
    }

    #[test]
    fn extract_in_ascending_order() {
        let mut heap = MinHeap::new();
        for key in [9, 4, 7, 1, 8, 2, 2, 6, 0, 5] {
            heap.insert(key);
            assert!(heap.is_valid());
        }

        let mut out = Vec::new();
        while !heap.is_empty() {
            out.push(heap.extract_min().unwrap());
            assert!(heap.is_valid());
        }
        assert_eq!(out, vec![0, 1, 2, 2, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn extract_on_empty_heap_underflows() {
        let mut heap: MinHeap<u32> = MinHeap::new();
        assert!(matches!(heap.extract_min(), Err(Error::HeapUnderflow)));

        heap.insert(3);
        heap.extract_min().unwrap();
        assert!(matches!(heap.extract_min(), Err(Error::HeapUnderflow)));
    }

    #[test]
    fn capacity_grows_as_double_plus_one() {
        let mut heap = MinHeap::new();
        assert_eq!(heap.capacity(), 0);

        let mut seen = Vec::new();
        for key in 0..20u32 {
            heap.insert(key);
            if seen.last() != Some(&heap.capacity()) {
                seen.push(heap.capacity());
            }
        }
        assert_eq!(seen, vec![1, 3, 7, 15, 31]);
        assert_eq!(heap.len(), 20);
    }

    #[test]
    fn growth_preserves_heap_shape() {
        let mut heap = MinHeap::new();
        for key in [5, 3, 8] {
            heap.insert(key);
        }
        let before = heap.slots.clone();
        assert_eq!(heap.capacity(), 3);

        heap.insert(10);
        assert_eq!(heap.capacity(), 7);
        assert_eq!(&heap.slots[..3], &before[..]);
    }

    #[test]
    fn equal_keys_keep_earlier_element_on_top() {
        let mut heap = MinHeap::new();
        heap.insert(tagged(3, 0));
        heap.insert(tagged(3, 1));
        heap.insert(tagged(3, 2));

        assert_eq!(heap.peek().map(|t| t.tag), Some(0));
        assert_eq!(heap.extract_min().unwrap().tag, 0);
    }

    #[test]
    fn later_equal_key_does_not_overtake_resident() {
        // mirrors the "aaabbc" build: a resident 3 and a merged 3 arriving later
        let mut heap = MinHeap::new();
        heap.insert(tagged(3, 0));
        heap.insert(tagged(3, 1));

        assert_eq!(heap.extract_min().unwrap().tag, 0);
        assert_eq!(heap.extract_min().unwrap().tag, 1);
    }

    #[test]
    fn mixed_keys_stay_valid_through_interleaving() {
        let mut heap = MinHeap::new();
        let mut tag = 0;
        for round in 0..50u32 {
            heap.insert(tagged((round * 7) % 11, tag));
            tag += 1;
            heap.insert(tagged((round * 3) % 5, tag));
            tag += 1;
            assert!(heap.is_valid());

            let min = heap.extract_min().unwrap();
            assert!(heap.is_valid());
            if let Some(next) = heap.peek() {
                assert!(min.key <= next.key);
            }
        }
        assert_eq!(heap.len(), 50);
    }
}
