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

//! This module defines the `LocalEngine` trait: the view a distributed search
//! has on the search running inside one process.

use crate::{Goal, Instance, MergeKind, MergePolicy, NodeRef, PhaseOutcome, SearchError, StopToken};

/// A search engine running in one process. It is driven by phases: between
/// two phases, the engine is quiescent and its queue and goal can safely be
/// inspected, merged and rebalanced.
pub trait LocalEngine {
    type Payload;
    type Goal: Goal<Payload = Self::Payload> + Clone;

    /// Initializes the engine. Only when `seed_roots` is true will the root
    /// nodes of the instance be pushed onto the queue; the initial incumbent
    /// is always recorded.
    fn initialize<I>(&mut self, instance: &mut I, seed_roots: bool) -> Result<(), SearchError>
        where I: Instance<Payload = Self::Payload>;
    /// Expands a bounded number of nodes
    fn run_phase(&mut self) -> Result<PhaseOutcome, SearchError>;
    /// Number of nodes waiting in the local queue(s)
    fn load(&self) -> usize;
    /// Removes at most `max` nodes to hand them over to another process
    fn donate(&mut self, max: usize) -> Vec<NodeRef<Self::Payload>>;
    /// Accepts nodes donated by another process
    fn accept(&mut self, nodes: Vec<NodeRef<Self::Payload>>);
    /// A snapshot of the local goal
    fn goal(&self) -> Self::Goal;
    /// Merges a remote goal into the local one
    fn merge_goal(&mut self, other: &Self::Goal, kind: MergeKind) -> bool;
    /// Clears the 'updated' flag of the local goal
    fn clear_goal_updated(&mut self);
    /// Configures the merge policy of the local goal
    fn set_merge_policy(&mut self, policy: MergePolicy);
    /// The token which stops this engine
    fn stop_token(&self) -> StopToken;
    /// Completes a stop: the pending nodes are kept so that the engine can
    /// be suspended or resumed
    fn stop(&mut self) -> Result<(), SearchError>;
    /// Terminates the engine
    fn finish(&mut self) -> Result<(), SearchError>;
}
