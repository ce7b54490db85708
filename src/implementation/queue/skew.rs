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
//! skew heap.

use std::cmp::Ordering::Less;

use compare::Compare;

use crate::{NodeRef, Priority, PriorityQueue};
use super::{CompareEntries, Entry};

type Link<P> = Option<Box<SkewNode<P>>>;

struct SkewNode<P> {
    entry: Entry<P>,
    left: Link<P>,
    right: Link<P>,
}

/// A self adjusting heap. Both insertion and extraction boil down to the
/// merge of two heaps which runs in amortized O(log n).
///
/// # Note
/// Neither the merge nor the destruction of the heap are recursive: a skew
/// heap may grow arbitrarily unbalanced (think of a depth first exploration)
/// and recursing along its spines could blow the stack.
pub struct SkewHeapQueue<P, O: Priority<P>> {
    cmp: CompareEntries<O>,
    root: Link<P>,
    size: usize,
    seq: u64,
}
impl<P, O: Priority<P>> SkewHeapQueue<P, O> {
    pub fn new(priority: O) -> Self {
        SkewHeapQueue { cmp: CompareEntries(priority), root: None, size: 0, seq: 0 }
    }

    /// Merges two heaps. The heap whose root is the best goes on top, its
    /// right subtree is merged with the other heap and the children of the
    /// top node are swapped.
    fn merge(cmp: &CompareEntries<O>, mut a: Link<P>, mut b: Link<P>) -> Link<P> {
        let mut spine: Vec<Box<SkewNode<P>>> = vec![];
        loop {
            match (a, b) {
                (None, rest) | (rest, None) => {
                    let mut acc = rest;
                    while let Some(mut top) = spine.pop() {
                        top.right = top.left.take();
                        top.left  = acc;
                        acc = Some(top);
                    }
                    return acc;
                }
                (Some(x), Some(y)) => {
                    let (mut top, other) = if cmp.compare(&x.entry, &y.entry) == Less {
                        (y, x)
                    } else {
                        (x, y)
                    };
                    a = top.right.take();
                    b = Some(other);
                    spine.push(top);
                }
            }
        }
    }
}
impl<P, O: Priority<P>> PriorityQueue for SkewHeapQueue<P, O> {
    type Payload = P;

    fn insert(&mut self, node: NodeRef<P>) {
        let entry = Entry { node, seq: self.seq };
        self.seq += 1;
        self.size += 1;
        let single = Some(Box::new(SkewNode { entry, left: None, right: None }));
        let root = self.root.take();
        self.root = Self::merge(&self.cmp, root, single);
    }
    fn extract_best(&mut self) -> Option<NodeRef<P>> {
        let mut top = self.root.take()?;
        self.size -= 1;
        let left = top.left.take();
        let right = top.right.take();
        self.root = Self::merge(&self.cmp, left, right);
        Some(top.entry.node)
    }
    fn clear(&mut self) {
        self.size = 0;
        dismantle(self.root.take());
    }
    fn len(&self) -> usize {
        self.size
    }
    fn for_each_node(&self, f: &mut dyn FnMut(&NodeRef<P>)) {
        let mut todo: Vec<&SkewNode<P>> = self.root.iter().map(|b| b.as_ref()).collect();
        while let Some(n) = todo.pop() {
            f(&n.entry.node);
            todo.extend(n.left.as_deref());
            todo.extend(n.right.as_deref());
        }
    }
}
impl<P, O: Priority<P>> Drop for SkewHeapQueue<P, O> {
    fn drop(&mut self) {
        dismantle(self.root.take());
    }
}

/// Frees a heap without recursion
fn dismantle<P>(root: Link<P>) {
    let mut todo: Vec<Box<SkewNode<P>>> = root.into_iter().collect();
    while let Some(mut n) = todo.pop() {
        todo.extend(n.left.take());
        todo.extend(n.right.take());
    }
}
