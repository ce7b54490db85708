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

//! This module defines the `Goal` trait: the incumbent tracker.

use crate::{MergeKind, MergePolicy, Node, NodeRef};

/// A goal keeps track of the best solution(s) found so far and decides
/// whether a node can still lead to an improvement.
///
/// # Note:
/// The goal is the only piece of mutable state which is shared by all the
/// workers of a search. Whenever it is shared between threads, it must be
/// kept behind a lock.
pub trait Goal: Send {
    type Payload;

    /// Returns false iff `node` is proved unable to improve on the incumbent.
    /// A problem node failing this test must be discarded.
    fn is_eligible(&self, node: &Node<Self::Payload>) -> bool;

    /// Records the solution `node`. Returns true iff the goal was improved.
    /// When the goal keeps the node, it clones the handle (acquiring a new
    /// reference to it) and releases the node it held before.
    ///
    /// Statistics are only recorded when `from_merge` is false.
    ///
    /// # Panics
    /// It is a programming error to call this method with a problem node.
    fn update(&mut self, node: &NodeRef<Self::Payload>, from_merge: bool) -> bool;

    /// Folds the state of `other` into this goal (interim synchronization).
    /// Merging the same goal twice never changes the result the second time.
    fn current_merge(&mut self, other: &Self) -> bool;

    /// Folds the state of `other` into this goal at shutdown.
    fn final_merge(&mut self, other: &Self) -> bool;

    /// Merges `other` into self the way `kind` prescribes it
    fn merge(&mut self, other: &Self, kind: MergeKind) -> bool {
        match kind {
            MergeKind::Current => self.current_merge(other),
            MergeKind::Final   => self.final_merge(other),
        }
    }

    /// The incumbent node (if any)
    fn best(&self) -> Option<&NodeRef<Self::Payload>>;
    /// The cost of the incumbent node (if any)
    fn best_cost(&self) -> Option<f64> {
        self.best().and_then(|n| n.eval())
    }

    /// Returns true iff the goal changed since the last call to `clear_updated`
    fn is_updated(&self) -> bool;
    /// Clears the 'updated' flag
    fn clear_updated(&mut self);
    /// Flags the goal as updated. This is how an aggregate goal learns that
    /// one of its parts made a local discovery.
    fn mark_updated(&mut self);
    /// Configures the way merges affect the 'updated' flag
    fn set_merge_policy(&mut self, policy: MergePolicy);

    /// Creates an empty goal with the same configuration as self. The `origin`
    /// uniquely identifies the worker which is going to own the new goal.
    fn spawn(&self, origin: usize) -> Self where Self: Sized;
}
