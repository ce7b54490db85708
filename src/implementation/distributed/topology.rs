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

//! The communication topologies of a distributed search.

use crate::MergePolicy;

/// Tells which ranks talk to one another when goals are exchanged and when
/// the load is balanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Each rank only forwards its goal to its successor and only receives
    /// nodes from its predecessor.
    Ring,
    /// Each rank talks to every other rank.
    #[default]
    AllToAll,
}

impl Topology {
    /// The merge policy to use unless configured otherwise. In a ring, an
    /// improvement received from the predecessor must be forwarded to the
    /// successor during the next round: an improving `current_merge` marks
    /// the goal as updated.
    pub fn default_merge_policy(self) -> MergePolicy {
        match self {
            Topology::Ring     => MergePolicy { mark_on_current: true,  mark_on_final: true },
            Topology::AllToAll => MergePolicy { mark_on_current: false, mark_on_final: true },
        }
    }
    /// The ranks to which `rank` sends its updated goal
    pub fn goal_targets(self, rank: usize, size: usize) -> Vec<usize> {
        match self {
            Topology::Ring if size > 1 => vec![(rank + 1) % size],
            Topology::Ring             => vec![],
            Topology::AllToAll         => (0..size).filter(|r| *r != rank).collect(),
        }
    }
    /// The ranks from which `rank` receives updated goals
    pub fn goal_sources(self, rank: usize, size: usize) -> Vec<usize> {
        match self {
            Topology::Ring if size > 1 => vec![(rank + size - 1) % size],
            Topology::Ring             => vec![],
            Topology::AllToAll         => (0..size).filter(|r| *r != rank).collect(),
        }
    }
}
