// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the implementation of a priority queue backed by a
//! binary heap.

use binary_heap_plus::BinaryHeap;

use crate::{NodeRef, Priority, PriorityQueue};
use super::{CompareEntries, Entry};

/// The simplest queue implementation you can think of: it basically consists
/// of a binary heap that pushes and pops nodes.
///
/// # Note
/// This is the default queue realization.
pub struct BinaryHeapQueue<P, O: Priority<P>> {
    heap: BinaryHeap<Entry<P>, CompareEntries<O>>,
    seq: u64,
}
impl<P, O: Priority<P>> BinaryHeapQueue<P, O> {
    /// Creates a new queue ordered by the given priority
    pub fn new(priority: O) -> Self {
        BinaryHeapQueue {
            heap: BinaryHeap::from_vec_cmp(vec![], CompareEntries(priority)),
            seq: 0,
        }
    }
}
impl<P, O: Priority<P>> PriorityQueue for BinaryHeapQueue<P, O> {
    type Payload = P;

    fn insert(&mut self, node: NodeRef<P>) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Entry { node, seq })
    }
    fn extract_best(&mut self) -> Option<NodeRef<P>> {
        self.heap.pop().map(|e| e.node)
    }
    fn clear(&mut self) {
        self.heap.clear()
    }
    fn len(&self) -> usize {
        self.heap.len()
    }
    fn for_each_node(&self, f: &mut dyn FnMut(&NodeRef<P>)) {
        self.heap.iter().for_each(|e| f(&e.node))
    }
}

#[cfg(test)]
mod test_binary_heap_queue {
    use crate::*;
    use super::super::test_queues::*;

    #[test]
    fn extracts_best_first_when_minimizing() {
        extracts_best_first(BinaryHeapQueue::new(BestFirst(Direction::Minimize)));
    }
    #[test]
    fn depth_first_breaks_ties_by_arrival() {
        depth_first_is_fifo_on_ties(BinaryHeapQueue::new(DepthFirst));
    }
    #[test]
    fn clearing_releases_every_node() {
        clear_releases_the_nodes(BinaryHeapQueue::new(BestFirst(Direction::Minimize)));
    }
    #[test]
    fn insertions_and_extractions_can_be_interleaved() {
        interleaved_operations(BinaryHeapQueue::new(BestFirst(Direction::Minimize)));
    }
    #[test]
    fn behaves_like_a_sorted_vector() {
        agrees_with_a_sorted_vector(BinaryHeapQueue::new(BestFirst(Direction::Minimize)));
    }
    #[test]
    fn maximizing_reverses_the_order() {
        let mut queue = BinaryHeapQueue::new(BestFirst(Direction::Maximize));
        queue.insert(node(0, 0, 1.0));
        queue.insert(node(1, 0, 3.0));
        assert_eq!(NodeId(1), queue.extract_best().unwrap().id());
    }
}
