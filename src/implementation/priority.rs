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

//! This module provides the implementation of the priorities (comparators)
//! which can be used to order the priority queues of the engine.
//!
//! All of these are small copyable values: a priority either is a pure
//! function of the depth and evaluation of the nodes, or it only carries the
//! configuration (direction, threshold) it was created with.

use std::cmp::Ordering;

use crate::{Direction, Node, Priority, SearchConfig};

/// Depth first: the deepest node is explored first.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthFirst;
impl<P> Priority<P> for DepthFirst {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        a.depth().cmp(&b.depth())
    }
}

/// Breadth first: the shallowest node is explored first.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthFirst;
impl<P> Priority<P> for BreadthFirst {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        b.depth().cmp(&a.depth())
    }
}

/// Best first: the node having the best evaluation is explored first. Nodes
/// without evaluation come last.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestFirst(pub Direction);
impl<P> Priority<P> for BestFirst {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        self.0.compare_eval(a.eval(), b.eval())
    }
}

/// Best first, ties broken in favor of the deepest node.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestD(pub Direction);
impl<P> Priority<P> for BestD {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        self.0.compare_eval(a.eval(), b.eval())
            .then_with(|| a.depth().cmp(&b.depth()))
    }
}

/// Best first, ties broken in favor of the shallowest node.
#[derive(Debug, Default, Clone, Copy)]
pub struct BestE(pub Direction);
impl<P> Priority<P> for BestE {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        self.0.compare_eval(a.eval(), b.eval())
            .then_with(|| b.depth().cmp(&a.depth()))
    }
}

/// Depth first, ties broken in favor of the best evaluation: a node is better
/// than an other one when it is deeper, or as deep and better evaluated.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthE(pub Direction);
impl<P> Priority<P> for DepthE {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        a.depth().cmp(&b.depth())
            .then_with(|| self.0.compare_eval(a.eval(), b.eval()))
    }
}

/// Breadth first, ties broken in favor of the best evaluation.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthE(pub Direction);
impl<P> Priority<P> for BreadthE {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        b.depth().cmp(&a.depth())
            .then_with(|| self.0.compare_eval(a.eval(), b.eval()))
    }
}

/// A hybrid strategy which explores the shallow part of the tree best first
/// and switches to depth first once the nodes reach the given depth
/// `threshold`. This bounds the size of the queue.
///
/// Nodes strictly shallower than the threshold are compared by evaluation
/// only. As soon as one of the two nodes lies at or below the threshold,
/// the nodes are compared by depth and then by evaluation (which means that a
/// node below the threshold always beats a node above it). A threshold of 0
/// disables the switch: the nodes are then always compared by evaluation.
///
/// # Example
/// ```
/// # use parsearch::*;
/// let prio = BestThenDepth::new(Direction::Minimize, 3);
/// let shallow_good = Node::new(NodeId(0), 1, NodeKind::Problem, Some(1.0), ());
/// let shallow_bad  = Node::new(NodeId(1), 2, NodeKind::Problem, Some(9.0), ());
/// let deep_bad     = Node::new(NodeId(2), 3, NodeKind::Problem, Some(50.0), ());
///
/// assert!(prio.is_better(&shallow_good, &shallow_bad));
/// assert!(prio.is_better(&deep_bad, &shallow_good));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct BestThenDepth {
    direction: Direction,
    threshold: usize,
}
impl BestThenDepth {
    pub fn new(direction: Direction, threshold: usize) -> Self {
        BestThenDepth { direction, threshold }
    }
    /// Creates the priority from the `direction` and `depth_threshold` of the
    /// configuration
    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.direction, config.depth_threshold)
    }
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}
impl<P> Priority<P> for BestThenDepth {
    fn compare(&self, a: &Node<P>, b: &Node<P>) -> Ordering {
        let disabled = self.threshold == 0;
        if disabled || (a.depth() < self.threshold && b.depth() < self.threshold) {
            self.direction.compare_eval(a.eval(), b.eval())
        } else {
            a.depth().cmp(&b.depth())
                .then_with(|| self.direction.compare_eval(a.eval(), b.eval()))
        }
    }
}


#[cfg(test)]
#[allow(clippy::many_single_char_names)]
mod test_priority {
    use std::cmp::Ordering;

    use crate::*;

    fn node(depth: usize, eval: Option<f64>) -> Node<()> {
        Node::new(NodeId(0), depth, NodeKind::Problem, eval, ())
    }

    /// All the sample nodes used to check the consistency of the priorities
    fn samples() -> Vec<Node<()>> {
        let mut out = vec![];
        for depth in 0..5 {
            for eval in [None, Some(-1.0), Some(0.0), Some(2.5), Some(7.0)] {
                out.push(node(depth, eval));
            }
        }
        out
    }

    fn check_consistency<O: Priority<()>>(prio: O) {
        let nodes = samples();
        for a in nodes.iter() {
            // irreflexive
            assert!(!prio.is_better(a, a));
            assert!(prio.is_equal(a, a));
            for b in nodes.iter() {
                // antisymmetric, and equality agrees with neither-better
                let ab = prio.is_better(a, b);
                let ba = prio.is_better(b, a);
                assert!(!(ab && ba));
                assert_eq!(!ab && !ba, prio.is_equal(a, b));
                for c in nodes.iter() {
                    // transitive
                    if ab && prio.is_better(b, c) {
                        assert!(prio.is_better(a, c));
                    }
                }
            }
        }
    }

    #[test]
    fn all_priorities_are_consistent() {
        for dir in [Direction::Minimize, Direction::Maximize] {
            check_consistency(DepthFirst);
            check_consistency(BreadthFirst);
            check_consistency(BestFirst(dir));
            check_consistency(BestD(dir));
            check_consistency(BestE(dir));
            check_consistency(DepthE(dir));
            check_consistency(BreadthE(dir));
            check_consistency(BestThenDepth::new(dir, 0));
            check_consistency(BestThenDepth::new(dir, 2));
            check_consistency(BestThenDepth::new(dir, 10));
        }
    }

    #[test]
    fn depth_first_prefers_deep_nodes() {
        assert_eq!(Ordering::Greater, DepthFirst.compare(&node(3, None), &node(2, Some(1.0))));
        assert_eq!(Ordering::Less, BreadthFirst.compare(&node(3, None), &node(2, Some(1.0))));
        assert!(DepthFirst.is_equal(&node(2, Some(5.0)), &node(2, Some(1.0))));
    }

    #[test]
    fn best_first_follows_the_direction() {
        let a = node(0, Some(1.0));
        let b = node(0, Some(2.0));
        assert!(BestFirst(Direction::Minimize).is_better(&a, &b));
        assert!(BestFirst(Direction::Maximize).is_better(&b, &a));
    }

    #[test]
    fn best_d_and_best_e_break_ties_differently() {
        let shallow = node(1, Some(4.0));
        let deep = node(3, Some(4.0));
        assert!(BestD(Direction::Minimize).is_better(&deep, &shallow));
        assert!(BestE(Direction::Minimize).is_better(&shallow, &deep));
        // but the cost always comes first
        let cheap = node(0, Some(1.0));
        assert!(BestD(Direction::Minimize).is_better(&cheap, &deep));
        assert!(BestE(Direction::Minimize).is_better(&cheap, &shallow));
    }

    #[test]
    fn depth_e_is_lexicographic() {
        let prio = DepthE(Direction::Minimize);
        assert!(prio.is_better(&node(3, Some(100.0)), &node(2, Some(1.0))));
        assert!(prio.is_better(&node(2, Some(1.0)), &node(2, Some(3.0))));
        let prio = BreadthE(Direction::Minimize);
        assert!(prio.is_better(&node(2, Some(100.0)), &node(3, Some(1.0))));
    }

    #[test]
    fn best_then_depth_switches_at_the_threshold() {
        let prio = BestThenDepth::new(Direction::Minimize, 2);
        // both above the threshold: cost only
        assert!(prio.is_better(&node(0, Some(1.0)), &node(1, Some(2.0))));
        assert!(prio.is_equal(&node(0, Some(1.0)), &node(1, Some(1.0))));
        // both at or below the threshold: depth then cost
        assert!(prio.is_better(&node(3, Some(9.0)), &node(2, Some(1.0))));
        assert!(prio.is_better(&node(2, Some(1.0)), &node(2, Some(9.0))));
        // mixed
        assert!(prio.is_better(&node(2, Some(9.0)), &node(1, Some(1.0))));
    }

    #[test]
    fn a_zero_threshold_means_best_first() {
        let prio = BestThenDepth::from_config(&SearchConfig::default());
        assert_eq!(0, prio.threshold());
        let shallow_good = node(1, Some(1.0));
        let deep_bad = node(5, Some(100.0));
        assert!(prio.is_better(&shallow_good, &deep_bad));
        assert!(!prio.is_better(&deep_bad, &shallow_good));
        assert!(prio.is_equal(&node(0, Some(3.0)), &node(4, Some(3.0))));
    }

    #[test]
    fn best_then_depth_reads_the_configuration() {
        let config = SearchConfigBuilder::default().depth_threshold(7_usize).build().unwrap();
        assert_eq!(7, BestThenDepth::from_config(&config).threshold());
    }
}
