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

//! This module provides the implementation of a priority queue backed by an
//! ordered list.

use std::collections::VecDeque;
use std::cmp::Ordering::Greater;

use compare::Compare;

use crate::{NodeRef, Priority, PriorityQueue};
use super::{CompareEntries, Entry};

/// A queue which keeps its nodes sorted from the best to the worst one.
/// Extracting the best node is O(1) whereas insertion is O(n). This queue is
/// mostly useful for small frontiers, or when the nodes tend to be inserted
/// in order (depth first explorations for instance).
pub struct OrderedListQueue<P, O: Priority<P>> {
    cmp: CompareEntries<O>,
    list: VecDeque<Entry<P>>,
    seq: u64,
}
impl<P, O: Priority<P>> OrderedListQueue<P, O> {
    pub fn new(priority: O) -> Self {
        OrderedListQueue { cmp: CompareEntries(priority), list: VecDeque::new(), seq: 0 }
    }
}
impl<P, O: Priority<P>> PriorityQueue for OrderedListQueue<P, O> {
    type Payload = P;

    fn insert(&mut self, node: NodeRef<P>) {
        let entry = Entry { node, seq: self.seq };
        self.seq += 1;
        let at = self.list.partition_point(|e| self.cmp.compare(e, &entry) == Greater);
        self.list.insert(at, entry);
    }
    fn extract_best(&mut self) -> Option<NodeRef<P>> {
        self.list.pop_front().map(|e| e.node)
    }
    fn clear(&mut self) {
        self.list.clear()
    }
    fn len(&self) -> usize {
        self.list.len()
    }
    fn for_each_node(&self, f: &mut dyn FnMut(&NodeRef<P>)) {
        self.list.iter().for_each(|e| f(&e.node))
    }
}
