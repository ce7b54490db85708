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

//! This module provides the goal of an enumeration problem: it counts the
//! solutions instead of keeping one of them.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::{Goal, MergePolicy, Node, NodeRef, Pack, PackError, Packer, Unpack, Unpacker};

/// A goal which counts all the solutions of the search space. No node is
/// ever pruned.
///
/// # Note
/// Each goal owns a unique `origin` (the path of `spawn` calls which created
/// it) and only ever increments the counter of that origin. The counters of
/// the other origins are snapshots which are merged by taking the maximum.
/// Hence, merging the same goal twice is harmless and no solution is ever
/// counted twice.
#[derive(Debug)]
pub struct CountSolutionsGoal<P> {
    origin: Vec<usize>,
    counts: BTreeMap<Vec<usize>, u64>,
    updated: bool,
    policy: MergePolicy,
    _phantom: std::marker::PhantomData<fn() -> P>,
}
impl<P> Default for CountSolutionsGoal<P> {
    fn default() -> Self {
        Self::new()
    }
}
impl<P> Clone for CountSolutionsGoal<P> {
    fn clone(&self) -> Self {
        CountSolutionsGoal {
            origin: self.origin.clone(),
            counts: self.counts.clone(),
            updated: self.updated,
            policy: self.policy,
            _phantom: Default::default(),
        }
    }
}
impl<P> CountSolutionsGoal<P> {
    pub fn new() -> Self {
        CountSolutionsGoal {
            origin: vec![],
            counts: BTreeMap::new(),
            updated: false,
            policy: MergePolicy::default(),
            _phantom: Default::default(),
        }
    }
    /// The total number of solutions known to this goal
    pub fn count(&self) -> u64 {
        self.counts.values().sum()
    }
    fn merge_from(&mut self, other: &Self) -> bool {
        let mut changed = false;
        for (origin, count) in other.counts.iter() {
            let mine = self.counts.entry(origin.clone()).or_insert(0);
            if *count > *mine {
                *mine = *count;
                changed = true;
            }
        }
        changed
    }
}
impl<P> Goal for CountSolutionsGoal<P> {
    type Payload = P;

    fn is_eligible(&self, _node: &Node<P>) -> bool {
        true
    }
    fn update(&mut self, node: &NodeRef<P>, from_merge: bool) -> bool {
        assert!(node.is_solution(), "goal updated with the problem node {:?}", node.id());
        *self.counts.entry(self.origin.clone()).or_insert(0) += 1;
        self.updated |= !from_merge;
        true
    }
    fn current_merge(&mut self, other: &Self) -> bool {
        let changed = self.merge_from(other);
        self.updated |= changed && self.policy.mark_on_current;
        changed
    }
    fn final_merge(&mut self, other: &Self) -> bool {
        let changed = self.merge_from(other);
        self.updated |= self.policy.mark_on_final;
        changed
    }
    fn best(&self) -> Option<&NodeRef<P>> {
        None
    }
    fn best_cost(&self) -> Option<f64> {
        Some(self.count() as f64)
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
    fn spawn(&self, origin: usize) -> Self {
        let mut path = self.origin.clone();
        path.push(origin);
        CountSolutionsGoal { origin: path, policy: self.policy, ..Self::new() }
    }
}

impl<P> Pack for CountSolutionsGoal<P> {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        self.origin.pack(packer)?;
        packer.len(self.counts.len())?;
        for (origin, count) in self.counts.iter() {
            origin.pack(packer)?;
            packer.u64(*count)?;
        }
        Ok(())
    }
}
impl<P> Unpack for CountSolutionsGoal<P> {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        let origin = Vec::<usize>::unpack(unpacker)?;
        let counts = unpacker.seq::<(Vec<usize>, u64)>()?.into_iter().collect();
        Ok(CountSolutionsGoal { origin, counts, ..Self::new() })
    }
}
