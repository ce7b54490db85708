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

//! This module provides the realizations of the `PriorityQueue` trait.
//!
//! All of them wrap the nodes they hold in an `Entry` which remembers the
//! order in which the nodes have been inserted. Comparing two entries first
//! compares their nodes with the priority of the queue and falls back to the
//! insertion order; which is how the queues guarantee that the node inserted
//! first is the first one to come out among nodes of equal priority.

use std::cmp::Ordering;

use compare::Compare;

use crate::{NodeRef, Priority};

mod binary;
mod skew;
mod list;
mod dual;
mod any;

pub use binary::*;
pub use skew::*;
pub use list::*;
pub use dual::*;
pub use any::*;

/// A node along with its insertion sequence number
#[derive(Debug)]
pub(crate) struct Entry<P> {
    pub(crate) node: NodeRef<P>,
    pub(crate) seq: u64,
}

/// Adapts a `Priority` so that it can order the entries of a queue. The best
/// entry compares as the greatest one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CompareEntries<O>(pub(crate) O);
impl<P, O: Priority<P>> Compare<Entry<P>> for CompareEntries<O> {
    fn compare(&self, l: &Entry<P>, r: &Entry<P>) -> Ordering {
        self.0.compare(&l.node, &r.node)
            .then_with(|| r.seq.cmp(&l.seq))
    }
}

#[cfg(test)]
pub(crate) mod test_queues {
    //! The behavior every queue realization must exhibit
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use crate::*;

    pub fn node(id: u64, depth: usize, eval: f64) -> NodeRef<()> {
        Node::new(NodeId(id), depth, NodeKind::Problem, Some(eval), ()).share()
    }

    fn drain<Q: PriorityQueue<Payload = ()>>(queue: &mut Q) -> Vec<u64> {
        let mut out = vec![];
        while let Some(n) = queue.extract_best() {
            out.push(n.id().id());
        }
        out
    }

    pub fn extracts_best_first<Q: PriorityQueue<Payload = ()>>(mut queue: Q) {
        for (i, cost) in [5.0, 2.0, 8.0, 1.0].iter().enumerate() {
            queue.insert(node(i as u64, 0, *cost));
        }
        assert_eq!(4, queue.len());
        assert_eq!(vec![3, 1, 0, 2], drain(&mut queue));
        assert!(queue.is_empty());
        assert!(queue.extract_best().is_none());
    }

    pub fn depth_first_is_fifo_on_ties<Q: PriorityQueue<Payload = ()>>(mut queue: Q) {
        for (i, depth) in [0, 2, 1, 2].iter().enumerate() {
            queue.insert(node(i as u64, *depth, 0.0));
        }
        assert_eq!(vec![1, 3, 2, 0], drain(&mut queue));
    }

    pub fn clear_releases_the_nodes<Q: PriorityQueue<Payload = ()>>(mut queue: Q) {
        let a = node(0, 0, 1.0);
        let b = node(1, 0, 2.0);
        queue.insert(a.clone());
        queue.insert(b.clone());
        assert_eq!(2, holders(&a));
        let mut seen = 0;
        queue.for_each_node(&mut |_| seen += 1);
        assert_eq!(2, seen);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(1, holders(&a));
        assert_eq!(1, holders(&b));
    }

    pub fn interleaved_operations<Q: PriorityQueue<Payload = ()>>(mut queue: Q) {
        queue.insert(node(0, 0, 4.0));
        queue.insert(node(1, 0, 3.0));
        assert_eq!(1, queue.extract_best().unwrap().id().id());
        queue.insert(node(2, 0, 9.0));
        queue.insert(node(3, 0, 4.0));
        queue.insert(node(4, 0, 0.5));
        assert_eq!(vec![4, 0, 3, 2], drain(&mut queue));
    }

    /// Compares the queue against a sorted vector on a pseudo random workload
    pub fn agrees_with_a_sorted_vector<Q: PriorityQueue<Payload = ()>>(mut queue: Q) {
        let mut reference: Vec<(u64, u64)> = vec![]; // (cost, id)
        let mut rng = SmallRng::seed_from_u64(0x2545_f491);
        for id in 0..500_u64 {
            let cost = rng.gen_range(0..20_u64);
            queue.insert(node(id, 0, cost as f64));
            reference.push((cost, id));
            if rng.gen_ratio(1, 3) {
                reference.sort_unstable();
                let expected = reference.remove(0);
                assert_eq!(Some(expected.1), queue.extract_best().map(|n| n.id().id()));
            }
        }
        reference.sort_unstable();
        let expected: Vec<u64> = reference.iter().map(|x| x.1).collect();
        assert_eq!(expected, drain(&mut queue));
    }
}
