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

//! This module defines the `Priority` trait: the policy which decides of the
//! order in which the pending nodes are extracted from a priority queue.

use std::cmp::Ordering;

use crate::Node;

/// A priority is a stateless policy comparing two nodes. It must define a
/// total preorder over the nodes: `compare(a, b) == Greater` means that `a`
/// is to be explored before `b`.
///
/// # Note:
/// Implementations are only allowed to look at the observable fields of the
/// nodes (depth, evaluation) and at their own configuration. Given two nodes,
/// a priority must always give the same answer.
pub trait Priority<P> {
    /// Compares two nodes; the one with the highest priority is `Greater`
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering;

    /// Returns true iff `a` must be explored before `b`
    fn is_better(&self, a: &Node<P>, b: &Node<P>) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
    /// Returns true iff neither `a` nor `b` is better than the other
    fn is_equal(&self, a: &Node<P>, b: &Node<P>) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl<P, T: Priority<P> + ?Sized> Priority<P> for &T {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        (**self).compare(a, b)
    }
}
