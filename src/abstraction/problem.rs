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

//! This module defines the `Instance` and `GenChild` traits which are the two
//! abstractions a client must implement to describe its search space.

use crate::{Direction, ExpansionError, Node, NodeIds};

/// The instance of the problem being solved. It provides the root(s) of the
/// search tree and (optionally) an initial incumbent solution.
pub trait Instance {
    /// The problem specific data carried by the nodes of the search tree
    type Payload;

    /// Gives the instance a chance to prepare itself before the search starts
    fn init(&mut self) {}
    /// Returns the root nodes of the search tree. The identifiers of these
    /// nodes should be drawn from `ids`.
    fn roots(&self, ids: &NodeIds) -> Vec<Node<Self::Payload>>;
    /// Returns a solution known before the search starts (if any). When
    /// present, this node *must* be a solution node.
    fn initial_incumbent(&self, _ids: &NodeIds) -> Option<Node<Self::Payload>> {
        None
    }
}

/// This is the branching rule of the problem: it expands one node into its
/// children.
///
/// # Note:
/// The node being expanded must not be mutated. Its children are to be
/// created through the `Children` collector which takes care of assigning
/// their identifier and depth.
pub trait GenChild {
    type Payload;

    /// Expands `node` and pushes all of its children onto `children`.
    /// Returning an error aborts the whole search.
    fn expand(&self, node: &Node<Self::Payload>, children: &mut Children<'_, Self::Payload>) -> Result<(), ExpansionError>;
}

/// The collector used by `GenChild` implementations to create the children of
/// some node. It also gives access to a snapshot of the incumbent so that the
/// branching rule can avoid creating children which are known to be useless.
pub struct Children<'a, P> {
    parent: &'a Node<P>,
    ids: &'a NodeIds,
    direction: Direction,
    incumbent: Option<f64>,
    nodes: Vec<Node<P>>,
}

impl<'a, P> Children<'a, P> {
    pub fn new(parent: &'a Node<P>, ids: &'a NodeIds, direction: Direction, incumbent: Option<f64>) -> Self {
        Children { parent, ids, direction, incumbent, nodes: vec![] }
    }
    /// The node being expanded
    pub fn parent(&self) -> &Node<P> {
        self.parent
    }
    /// Creates a problem child of the parent node with the given bound
    pub fn problem(&mut self, eval: Option<f64>, payload: P) {
        let id = self.ids.next_id();
        self.nodes.push(self.parent.child(id, eval, payload));
    }
    /// Creates a solution child of the parent node with the given cost
    pub fn solution(&mut self, cost: f64, payload: P) {
        let id = self.ids.next_id();
        self.nodes.push(self.parent.child(id, None, payload).into_solution(cost));
    }
    /// The cost of the incumbent at the time the expansion started
    pub fn incumbent(&self) -> Option<f64> {
        self.incumbent
    }
    /// Returns false iff a node with the given bound is proved to be worse
    /// than the incumbent.
    pub fn can_improve(&self, bound: f64) -> bool {
        match self.incumbent {
            Some(best) => !self.direction.is_better(best, bound),
            None => true,
        }
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn into_nodes(self) -> Vec<Node<P>> {
        self.nodes
    }
}
