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

//! This module defines the `PriorityQueue` trait.

use crate::NodeRef;

/// This trait abstracts away the implementation details of the priority
/// queues which store the nodes remaining to explore.
///
/// # Note:
/// A queue owns one reference to each of the nodes it holds. Inserting a node
/// transfers the caller's reference to the queue, extracting it transfers the
/// queue's reference back to the caller.
pub trait PriorityQueue {
    type Payload;

    /// This is how you push a node onto the queue.
    fn insert(&mut self, node: NodeRef<Self::Payload>);
    /// This method yields the most promising node from the queue (or None
    /// when the queue is empty).
    ///
    /// # Note:
    /// Amongst nodes of equal priority, the node which has been inserted first
    /// is extracted first.
    fn extract_best(&mut self) -> Option<NodeRef<Self::Payload>>;
    /// Removes the node which should preferably be handed to another worker
    /// when balancing the load. By default, this is the best node.
    fn extract_transfer(&mut self) -> Option<NodeRef<Self::Payload>> {
        self.extract_best()
    }
    /// This method clears the queue: it releases all of its nodes.
    fn clear(&mut self);
    /// Yields the length of the queue.
    fn len(&self) -> usize;
    /// Returns true iff the queue is empty (len == 0)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Calls `f` on each node held by the queue (in no particular order)
    fn for_each_node(&self, f: &mut dyn FnMut(&NodeRef<Self::Payload>));
}
