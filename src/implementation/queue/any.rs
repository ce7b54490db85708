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

//! This module provides a queue whose realization is selected at runtime.

use crate::{NodeRef, Priority, PriorityQueue};
use super::{BinaryHeapQueue, DualIndexQueue, OrderedListQueue, SkewHeapQueue};

/// The available realizations of the priority queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// A binary heap (see `BinaryHeapQueue`)
    #[default]
    BinaryHeap,
    /// A skew heap (see `SkewHeapQueue`)
    SkewHeap,
    /// An ordered list (see `OrderedListQueue`)
    OrderedList,
    /// A doubly indexed heap (see `DualIndexQueue`)
    DualIndex,
}

/// A priority queue of any of the available kinds
pub enum AnyQueue<P, O: Priority<P>> {
    BinaryHeap(BinaryHeapQueue<P, O>),
    SkewHeap(SkewHeapQueue<P, O>),
    OrderedList(OrderedListQueue<P, O>),
    DualIndex(DualIndexQueue<P, O>),
}
impl<P, O: Priority<P>> AnyQueue<P, O> {
    /// Creates an empty queue of the given `kind`
    pub fn new(kind: QueueKind, priority: O) -> Self {
        match kind {
            QueueKind::BinaryHeap  => AnyQueue::BinaryHeap(BinaryHeapQueue::new(priority)),
            QueueKind::SkewHeap    => AnyQueue::SkewHeap(SkewHeapQueue::new(priority)),
            QueueKind::OrderedList => AnyQueue::OrderedList(OrderedListQueue::new(priority)),
            QueueKind::DualIndex   => AnyQueue::DualIndex(DualIndexQueue::new(priority)),
        }
    }
    pub fn kind(&self) -> QueueKind {
        match self {
            AnyQueue::BinaryHeap(_)  => QueueKind::BinaryHeap,
            AnyQueue::SkewHeap(_)    => QueueKind::SkewHeap,
            AnyQueue::OrderedList(_) => QueueKind::OrderedList,
            AnyQueue::DualIndex(_)   => QueueKind::DualIndex,
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $q:ident => $body:expr) => {
        match $self {
            AnyQueue::BinaryHeap($q)  => $body,
            AnyQueue::SkewHeap($q)    => $body,
            AnyQueue::OrderedList($q) => $body,
            AnyQueue::DualIndex($q)   => $body,
        }
    };
}

impl<P, O: Priority<P>> PriorityQueue for AnyQueue<P, O> {
    type Payload = P;

    fn insert(&mut self, node: NodeRef<P>) {
        dispatch!(self, q => q.insert(node))
    }
    fn extract_best(&mut self) -> Option<NodeRef<P>> {
        dispatch!(self, q => q.extract_best())
    }
    fn extract_transfer(&mut self) -> Option<NodeRef<P>> {
        dispatch!(self, q => q.extract_transfer())
    }
    fn clear(&mut self) {
        dispatch!(self, q => q.clear())
    }
    fn len(&self) -> usize {
        dispatch!(self, q => q.len())
    }
    fn for_each_node(&self, f: &mut dyn FnMut(&NodeRef<P>)) {
        dispatch!(self, q => q.for_each_node(f))
    }
}
