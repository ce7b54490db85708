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

//! This module provides the goal which keeps track of the best solution.

use std::io::{Read, Write};

use crate::{Direction, Goal, MergePolicy, Node, NodeRef, Pack, PackError, Packer, Unpack, Unpacker};

/// The goal of an optimization problem: it keeps the best solution found so
/// far. Among solutions of equal cost, the one which arrived first is kept.
#[derive(Debug)]
pub struct BestSolutionGoal<P> {
    direction: Direction,
    best: Option<NodeRef<P>>,
    /// the number of local (not merged) improvements of the incumbent
    improvements: u64,
    updated: bool,
    policy: MergePolicy,
}
impl<P> BestSolutionGoal<P> {
    pub fn new(direction: Direction) -> Self {
        BestSolutionGoal {
            direction,
            best: None,
            improvements: 0,
            updated: false,
            policy: MergePolicy::default(),
        }
    }
    pub fn direction(&self) -> Direction {
        self.direction
    }
    /// The number of times the incumbent was improved by a local discovery
    pub fn improvements(&self) -> u64 {
        self.improvements
    }
}
impl<P: Send + Sync> BestSolutionGoal<P> {
    /// Returns true iff `cost` is strictly better than the incumbent
    fn improves(&self, cost: f64) -> bool {
        match self.best_cost() {
            Some(best) => self.direction.is_better(cost, best),
            None => true,
        }
    }
    fn merge_from(&mut self, other: &Self, mark: bool) -> bool {
        let improved = match other.best.as_ref() {
            Some(node) => self.update(node, true),
            None => false,
        };
        if improved && mark {
            self.updated = true;
        }
        improved
    }
}
impl<P> Clone for BestSolutionGoal<P> {
    fn clone(&self) -> Self {
        BestSolutionGoal { best: self.best.clone(), ..*self }
    }
}
impl<P: Send + Sync> Goal for BestSolutionGoal<P> {
    type Payload = P;

    fn is_eligible(&self, node: &Node<P>) -> bool {
        match (self.best_cost(), node.eval()) {
            (Some(best), Some(bound)) => !self.direction.is_better(best, bound),
            _ => true,
        }
    }

    fn update(&mut self, node: &NodeRef<P>, from_merge: bool) -> bool {
        assert!(node.is_solution(), "goal updated with the problem node {:?}", node.id());
        let cost = node.eval().unwrap_or(f64::NAN);
        if !self.improves(cost) {
            return false;
        }
        log::trace!("new incumbent {:?} with cost {}", node.id(), cost);
        self.best = Some(node.clone());
        if !from_merge {
            self.improvements += 1;
            self.updated = true;
        }
        true
    }

    fn current_merge(&mut self, other: &Self) -> bool {
        self.merge_from(other, self.policy.mark_on_current)
    }
    fn final_merge(&mut self, other: &Self) -> bool {
        let improved = self.merge_from(other, false);
        if self.policy.mark_on_final {
            self.updated = true;
        }
        improved
    }

    fn best(&self) -> Option<&NodeRef<P>> {
        self.best.as_ref()
    }
    fn is_updated(&self) -> bool {
        self.updated
    }
    fn clear_updated(&mut self) {
        self.updated = false;
    }
    fn mark_updated(&mut self) {
        self.updated = true;
    }
    fn set_merge_policy(&mut self, policy: MergePolicy) {
        self.policy = policy;
    }
    fn spawn(&self, _origin: usize) -> Self {
        BestSolutionGoal { policy: self.policy, ..Self::new(self.direction) }
    }
}

// The 'updated' flag is never transmitted: an unpacked goal is a replica, not
// a fresh discovery.
impl<P: Pack> Pack for BestSolutionGoal<P> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        self.direction.pack(packer)?;
        packer.u64(self.improvements)?;
        self.best.pack(packer)
    }
}
impl<P: Unpack> Unpack for BestSolutionGoal<P> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        let direction = Direction::unpack(unpacker)?;
        let improvements = unpacker.u64()?;
        let best = Option::<NodeRef<P>>::unpack(unpacker)?;
        Ok(BestSolutionGoal { best, improvements, ..Self::new(direction) })
    }
}
