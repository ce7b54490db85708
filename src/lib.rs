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

//! # Parsearch
//! Parsearch is a generic engine to run branch-and-bound (and divide-and-
//! conquer) tree searches on one thread, on a pool of threads or over a
//! group of processes. You describe your search space by implementing the
//! `Instance` trait (where does the search start) and the `GenChild` trait
//! (how does a node expand into its children). The engine takes care of the
//! rest: storing and ordering the pending nodes (`PriorityQueue`, `Priority`),
//! tracking the incumbent and pruning the nodes which cannot improve on it
//! (`Goal`), and spreading the work over all the available resources.
//!
//! ## Quick Example
//! The following picks exactly `k` of the given costs so as to pay as little
//! as possible.
//!
//! ```
//! use std::sync::Arc;
//! use parsearch::*;
//!
//! #[derive(Clone)]
//! struct Pick { costs: Vec<f64>, k: usize }
//!
//! #[derive(Clone)]
//! struct Partial { next: usize, taken: usize, cost: f64 }
//!
//! impl Instance for Pick {
//!     type Payload = Partial;
//!     fn roots(&self, ids: &NodeIds) -> Vec<Node<Partial>> {
//!         vec![Node::root(ids.next_id(), Some(0.0), Partial { next: 0, taken: 0, cost: 0.0 })]
//!     }
//! }
//! impl GenChild for Pick {
//!     type Payload = Partial;
//!     fn expand(&self, node: &Node<Partial>, children: &mut Children<'_, Partial>) -> Result<(), ExpansionError> {
//!         let p = node.payload();
//!         if p.taken == self.k {
//!             children.solution(p.cost, p.clone());
//!         } else if p.next < self.costs.len() {
//!             let take = Partial { next: p.next + 1, taken: p.taken + 1, cost: p.cost + self.costs[p.next] };
//!             let skip = Partial { next: p.next + 1, ..p.clone() };
//!             for child in [take, skip] {
//!                 if children.can_improve(child.cost) {
//!                     children.problem(Some(child.cost), child);
//!                 }
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut pick = Pick { costs: vec![5.0, 1.0, 4.0, 2.0], k: 2 };
//! let ctx = SearchContext::new(SearchConfig::default());
//! let queue = AnyQueue::new(QueueKind::BinaryHeap, BestFirst(Direction::Minimize));
//! let goal = BestSolutionGoal::new(Direction::Minimize);
//!
//! let mut search = Algorithm::new(ctx, Arc::new(pick.clone()), queue, goal);
//! search.to_init(&mut pick, true).unwrap();
//! let outcome = search.run().unwrap();
//!
//! assert!(outcome.is_exhausted);
//! assert_eq!(Some(3.0), outcome.best_cost);
//! ```
//!
//! ## Going parallel
//! `SharedSearch` runs the same kind of search with all the threads of a pool
//! working on one shared queue, while `PartitionedSearch` gives each thread a
//! queue of its own and rebalances them between two phases. Both can be
//! distributed over several processes with a `DistributedSearch`, given some
//! implementation of the `Communicator` trait (`LocalCluster` provides one
//! where each rank is a thread of the current process).

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;

#[cfg(test)]
mod test_utils;
