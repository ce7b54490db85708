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

//! This module provides the goal of a satisfaction problem: the search is
//! over as soon as any solution is found.

use std::io::{Read, Write};

use crate::{Goal, MergePolicy, Node, NodeRef, Pack, PackError, Packer, Unpack, Unpacker};

/// A goal which keeps the first solution it is given. Once it holds a
/// solution, no node is eligible anymore; which empties the queues.
#[derive(Debug)]
pub struct FirstSolutionGoal<P> {
    first: Option<NodeRef<P>>,
    updated: bool,
    policy: MergePolicy,
}
impl<P> Default for FirstSolutionGoal<P> {
    fn default() -> Self {
        FirstSolutionGoal { first: None, updated: false, policy: MergePolicy::default() }
    }
}
impl<P> FirstSolutionGoal<P> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn is_solved(&self) -> bool {
        self.first.is_some()
    }
}
impl<P> Clone for FirstSolutionGoal<P> {
    fn clone(&self) -> Self {
        FirstSolutionGoal { first: self.first.clone(), ..*self }
    }
}
impl<P: Send + Sync> Goal for FirstSolutionGoal<P> {
    type Payload = P;

    fn is_eligible(&self, _node: &Node<P>) -> bool {
        self.first.is_none()
    }
    fn update(&mut self, node: &NodeRef<P>, from_merge: bool) -> bool {
        assert!(node.is_solution(), "goal updated with the problem node {:?}", node.id());
        if self.first.is_some() {
            return false;
        }
        self.first = Some(node.clone());
        self.updated |= !from_merge;
        true
    }
    fn current_merge(&mut self, other: &Self) -> bool {
        let improved = other.first.as_ref().map_or(false, |n| self.update(n, true));
        self.updated |= improved && self.policy.mark_on_current;
        improved
    }
    fn final_merge(&mut self, other: &Self) -> bool {
        let improved = other.first.as_ref().map_or(false, |n| self.update(n, true));
        self.updated |= self.policy.mark_on_final;
        improved
    }
    fn best(&self) -> Option<&NodeRef<P>> {
        self.first.as_ref()
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
        FirstSolutionGoal { policy: self.policy, ..Self::default() }
    }
}

impl<P: Pack> Pack for FirstSolutionGoal<P> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        self.first.pack(packer)
    }
}
impl<P: Unpack> Unpack for FirstSolutionGoal<P> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        let first = Option::<NodeRef<P>>::unpack(unpacker)?;
        Ok(FirstSolutionGoal { first, ..Self::default() })
    }
}

#[cfg(test)]
mod test_first_solution_goal {
    use crate::*;

    fn solution(id: u64, cost: f64) -> NodeRef<()> {
        Node::root(NodeId(id), None, ()).into_solution(cost).share()
    }

    #[test]
    fn only_the_first_solution_is_kept() {
        let mut goal = FirstSolutionGoal::new();
        assert!(goal.update(&solution(0, 10.0), false));
        assert!(!goal.update(&solution(1, 1.0), false));
        assert_eq!(NodeId(0), goal.best().unwrap().id());
    }

    #[test]
    fn nothing_is_eligible_once_solved() {
        let mut goal = FirstSolutionGoal::new();
        let node = Node::root(NodeId(5), Some(1.0), ());
        assert!(goal.is_eligible(&node));
        goal.update(&solution(0, 10.0), false);
        assert!(goal.is_solved());
        assert!(!goal.is_eligible(&node));
    }

    #[test]
    fn merging_a_solved_goal_solves_the_receiver() {
        let mut remote = FirstSolutionGoal::new();
        remote.update(&solution(0, 1.0), false);
        let mut local = FirstSolutionGoal::new();
        assert!(local.current_merge(&remote));
        assert!(!local.current_merge(&remote));
        assert!(local.is_solved());
        assert!(!local.is_updated());
    }

    #[test]
    fn unpacked_goals_are_not_updated() {
        let mut goal = FirstSolutionGoal::new();
        goal.update(&solution(0, 1.0), false);
        let copy: FirstSolutionGoal<()> = MessageBuffer::of(&goal).unwrap().value().unwrap();
        assert!(copy.is_solved());
        assert!(!copy.is_updated());
    }
}
