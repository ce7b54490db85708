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

//! This module provides the implementation of a queue which orders its nodes
//! according to two criteria at once.

use std::cmp::Ordering;
use std::cmp::Ordering::{Greater, Less};

use compare::Compare;

use crate::{BreadthFirst, NodeRef, Priority, PriorityQueue};
use super::{CompareEntries, Entry};

/// This is a type-safe identifier for some slot of the queue. Basically, it
/// equates to the position of the identified entry in the `slots` vector of
/// the `DualIndexQueue`.
#[derive(Debug, Copy, Clone)]
struct Slot(usize);

/// A binary heap of slots which knows the position of each slot it holds,
/// so that any slot can be removed from it in O(log n).
#[derive(Debug, Default)]
struct IndexedHeap {
    /// The position of the slots in the heap
    pos: Vec<usize>,
    /// This is the actual heap which orders the slots
    heap: Vec<Slot>,
}
impl IndexedHeap {
    fn len(&self) -> usize {
        self.heap.len()
    }
    fn clear(&mut self) {
        self.pos.clear();
        self.heap.clear();
    }
    fn peek(&self) -> Option<Slot> {
        self.heap.first().copied()
    }
    fn push(&mut self, slot: Slot, cmp: &dyn Fn(Slot, Slot) -> Ordering) {
        if self.pos.len() <= slot.0 {
            self.pos.resize(slot.0 + 1, 0);
        }
        self.heap.push(slot);
        self.pos[slot.0] = self.heap.len() - 1;
        self.bubble_up(self.heap.len() - 1, cmp);
    }
    /// Removes the given slot from the heap wherever it sits
    fn remove(&mut self, slot: Slot, cmp: &dyn Fn(Slot, Slot) -> Ordering) {
        let at = self.pos[slot.0];
        let last = self.heap.len() - 1;
        self.swap(at, last);
        self.heap.pop();
        if at < self.heap.len() {
            let at = self.bubble_up(at, cmp);
            self.bubble_down(at, cmp);
        }
    }
    fn swap(&mut self, x: usize, y: usize) {
        self.heap.swap(x, y);
        self.pos[self.heap[x].0] = x;
        self.pos[self.heap[y].0] = y;
    }
    /// Moves the slot at `me` up as long as it beats its parent and returns
    /// its final position.
    fn bubble_up(&mut self, mut me: usize, cmp: &dyn Fn(Slot, Slot) -> Ordering) -> usize {
        while me > 0 {
            let parent = (me - 1) / 2;
            if cmp(self.heap[me], self.heap[parent]) != Greater {
                break;
            }
            self.swap(me, parent);
            me = parent;
        }
        me
    }
    fn bubble_down(&mut self, mut me: usize, cmp: &dyn Fn(Slot, Slot) -> Ordering) {
        loop {
            let left = me * 2 + 1;
            let right = me * 2 + 2;
            if left >= self.heap.len() {
                return;
            }
            let kid = if right < self.heap.len() && cmp(self.heap[left], self.heap[right]) == Less {
                right
            } else {
                left
            };
            if cmp(self.heap[me], self.heap[kid]) != Less {
                return;
            }
            self.swap(me, kid);
            me = kid;
        }
    }
}

/// A queue which indexes its nodes twice: once according to its priority,
/// and once according to a breadth first order. The best node is taken from
/// the first index while `extract_transfer` yields the shallowest node,
/// which is the one standing for the largest part of the search space. This
/// makes it a good fit for work stealing and load balancing.
pub struct DualIndexQueue<P, O: Priority<P>> {
    primary_cmp: CompareEntries<O>,
    secondary_cmp: CompareEntries<BreadthFirst>,
    /// The actual entries; freed slots are `None`
    slots: Vec<Option<Entry<P>>>,
    primary: IndexedHeap,
    secondary: IndexedHeap,
    /// The positions in the `slots` vector that can be recycled
    recycle_bin: Vec<Slot>,
    seq: u64,
}
impl<P, O: Priority<P>> DualIndexQueue<P, O> {
    pub fn new(priority: O) -> Self {
        DualIndexQueue {
            primary_cmp: CompareEntries(priority),
            secondary_cmp: CompareEntries(BreadthFirst),
            slots: vec![],
            primary: IndexedHeap::default(),
            secondary: IndexedHeap::default(),
            recycle_bin: vec![],
            seq: 0,
        }
    }

    /// Removes the given slot from both indices and returns its node
    fn take(&mut self, slot: Slot) -> Option<NodeRef<P>> {
        let (slots, pcmp, scmp) = (&self.slots, &self.primary_cmp, &self.secondary_cmp);
        let primary = |x: Slot, y: Slot| compare_slots(slots, pcmp, x, y);
        let secondary = |x: Slot, y: Slot| compare_slots(slots, scmp, x, y);
        self.primary.remove(slot, &primary);
        self.secondary.remove(slot, &secondary);

        self.recycle_bin.push(slot);
        self.slots[slot.0].take().map(|e| e.node)
    }
}

fn compare_slots<P, C: Compare<Entry<P>>>(slots: &[Option<Entry<P>>], cmp: &C, x: Slot, y: Slot) -> Ordering {
    match (&slots[x.0], &slots[y.0]) {
        (Some(a), Some(b)) => cmp.compare(a, b),
        // freed slots never sit in a heap
        _ => Ordering::Equal,
    }
}

impl<P, O: Priority<P>> PriorityQueue for DualIndexQueue<P, O> {
    type Payload = P;

    fn insert(&mut self, node: NodeRef<P>) {
        let entry = Some(Entry { node, seq: self.seq });
        self.seq += 1;

        let slot = if let Some(slot) = self.recycle_bin.pop() {
            self.slots[slot.0] = entry;
            slot
        } else {
            self.slots.push(entry);
            Slot(self.slots.len() - 1)
        };

        let (slots, pcmp, scmp) = (&self.slots, &self.primary_cmp, &self.secondary_cmp);
        let primary = |x: Slot, y: Slot| compare_slots(slots, pcmp, x, y);
        let secondary = |x: Slot, y: Slot| compare_slots(slots, scmp, x, y);
        self.primary.push(slot, &primary);
        self.secondary.push(slot, &secondary);
    }
    fn extract_best(&mut self) -> Option<NodeRef<P>> {
        let slot = self.primary.peek()?;
        self.take(slot)
    }
    fn extract_transfer(&mut self) -> Option<NodeRef<P>> {
        let slot = self.secondary.peek()?;
        self.take(slot)
    }
    fn clear(&mut self) {
        self.slots.clear();
        self.primary.clear();
        self.secondary.clear();
        self.recycle_bin.clear();
    }
    fn len(&self) -> usize {
        self.primary.len()
    }
    fn for_each_node(&self, f: &mut dyn FnMut(&NodeRef<P>)) {
        self.slots.iter().flatten().for_each(|e| f(&e.node))
    }
}
