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

//! This module provides the implementation of the sequential search
//! algorithm. That is the generic branch-and-bound loop which ties the queue,
//! the goal and the branching rule of a problem together on one single thread
//! of execution.
//!
//! It also serves as the building block of the partitioned thread pool engine
//! (one algorithm per worker) and of the distributed engine.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Instant;

use crate::{AlgoState, Children, Completion, GenChild, Goal, Instance, Lifecycle, LocalEngine,
    MergeKind, MergePolicy, Node, NodeRef, Pack, Packer, PhaseOutcome, PriorityQueue, SearchContext,
    SearchError, StopToken, TimeBudget, Unpack, Unpacker};

/// Expands one node with the given branching rule. The identifiers of the
/// children are drawn from the context and the expansion time is reported to
/// its statistics sink.
///
/// `incumbent` is the cost of the incumbent at the time the expansion starts.
pub(crate) fn expand_node<X: GenChild>(
    ctx: &SearchContext,
    expander: &X,
    node: &Node<X::Payload>,
    incumbent: Option<f64>,
) -> Result<Vec<Node<X::Payload>>, SearchError> {
    let start = Instant::now();
    let mut children = Children::new(node, &ctx.ids, ctx.direction(), incumbent);
    let result = expander.expand(node, &mut children);
    ctx.stats.evaluation(start.elapsed());
    result?;

    let children = children.into_nodes();
    ctx.stats.created(children.len());
    Ok(children)
}

/// The generic search algorithm.
///
/// Its lifecycle goes through the states of `AlgoState`:
/// `to_init` seeds the queue, `to_run` starts the exploration which goes on
/// until the queue is exhausted or a stop is requested through the
/// `StopToken` of its context. A stopped algorithm can be persisted with
/// `suspend_into`, reloaded with `resume_from` and resumed with `to_resume`.
///
/// # Example
/// ```
/// # use parsearch::*;
/// # use std::sync::Arc;
/// # struct Count;
/// # impl Instance for Count {
/// #     type Payload = u32;
/// #     fn roots(&self, ids: &NodeIds) -> Vec<Node<u32>> { vec![Node::root(ids.next_id(), None, 0)] }
/// # }
/// # impl GenChild for Count {
/// #     type Payload = u32;
/// #     fn expand(&self, n: &Node<u32>, c: &mut Children<'_, u32>) -> Result<(), ExpansionError> {
/// #         if n.depth() < 3 { c.problem(None, n.payload() * 2); c.problem(None, n.payload() * 2 + 1); }
/// #         else { c.solution(*n.payload() as f64, *n.payload()); }
/// #         Ok(())
/// #     }
/// # }
/// let ctx = SearchContext::new(SearchConfigBuilder::default().direction(Direction::Maximize).build().unwrap());
/// let queue = AnyQueue::new(QueueKind::BinaryHeap, DepthFirst);
/// let goal = BestSolutionGoal::new(Direction::Maximize);
/// let mut algo = Algorithm::new(ctx, Arc::new(Count), queue, goal);
///
/// algo.to_init(&mut Count, true).unwrap();
/// let outcome = algo.run().unwrap();
/// assert!(outcome.is_exhausted);
/// assert_eq!(Some(7.0), outcome.best_cost);
/// ```
pub struct Algorithm<X, G, Q>
where
    X: GenChild,
    G: Goal<Payload = X::Payload>,
    Q: PriorityQueue<Payload = X::Payload>,
{
    ctx: SearchContext,
    /// The branching rule of the problem
    expander: Arc<X>,
    /// The nodes that must still be explored
    queue: Q,
    /// The incumbent tracker
    goal: G,
    life: Lifecycle,
    /// The number of nodes this algorithm has extracted from its queue
    explored: u64,
}

impl<X, G, Q> Algorithm<X, G, Q>
where
    X: GenChild,
    G: Goal<Payload = X::Payload>,
    Q: PriorityQueue<Payload = X::Payload>,
{
    pub fn new(ctx: SearchContext, expander: Arc<X>, queue: Q, mut goal: G) -> Self {
        goal.set_merge_policy(ctx.config.effective_merge_policy());
        Algorithm { ctx, expander, queue, goal, life: Lifecycle::default(), explored: 0 }
    }

    pub fn state(&self) -> AlgoState {
        self.life.state()
    }
    pub fn context(&self) -> &SearchContext {
        &self.ctx
    }
    pub fn goal(&self) -> &G {
        &self.goal
    }
    pub fn goal_mut(&mut self) -> &mut G {
        &mut self.goal
    }
    pub fn queue(&self) -> &Q {
        &self.queue
    }
    pub fn explored(&self) -> u64 {
        self.explored
    }
    /// The token through which a stop can be requested from any thread
    pub fn stop_token(&self) -> StopToken {
        self.ctx.stop.clone()
    }

    // ------------------------------------------------------------------------
    // --- Transitions --------------------------------------------------------
    // ------------------------------------------------------------------------
    /// Prepares the instance, records its initial incumbent and (when
    /// `seed_roots` is true) pushes its roots onto the queue.
    pub fn to_init<I>(&mut self, instance: &mut I, seed_roots: bool) -> Result<(), SearchError>
    where I: Instance<Payload = X::Payload>
    {
        self.life.move_to(AlgoState::Initialized)?;
        instance.init();
        if let Some(incumbent) = instance.initial_incumbent(&self.ctx.ids) {
            self.goal.update(&incumbent.share(), false);
        }
        if seed_roots {
            let roots = instance.roots(&self.ctx.ids);
            self.ctx.stats.created(roots.len());
            for root in roots {
                self.offer(root.share());
            }
        }
        Ok(())
    }
    /// Moves to `Initialized` with the given nodes pending. This is how an
    /// algorithm which is part of a team gets its share of the roots.
    pub fn to_init_with(&mut self, nodes: Vec<NodeRef<X::Payload>>) -> Result<(), SearchError> {
        self.life.move_to(AlgoState::Initialized)?;
        nodes.into_iter().for_each(|n| self.offer(n));
        Ok(())
    }
    pub fn to_run(&mut self) -> Result<(), SearchError> {
        self.life.move_to(AlgoState::Running)?;
        self.ctx.stats.start_algorithm();
        Ok(())
    }
    /// Requests the algorithm to stop. This can be called at any time, the
    /// request is honored at the next iteration boundary.
    pub fn request_stop(&self) {
        self.ctx.stop.request_stop();
    }
    /// Completes a stop: the exploration state is left untouched so that it
    /// can be persisted and resumed.
    pub fn to_stop(&mut self) -> Result<(), SearchError> {
        if self.life.state().is_running() {
            self.life.move_to(AlgoState::ToStop)?;
        }
        self.life.move_to(AlgoState::Stopped)?;
        self.ctx.stop.disarm();
        self.ctx.stats.end_algorithm();
        Ok(())
    }
    pub fn to_resume(&mut self) -> Result<(), SearchError> {
        self.life.move_to(AlgoState::Resumed)?;
        self.ctx.stop.reset();
        self.ctx.stats.start_algorithm();
        Ok(())
    }
    /// Terminates the algorithm and releases the nodes of its queue.
    pub fn to_end(&mut self) -> Result<(), SearchError> {
        let was_running = matches!(self.life.state(), AlgoState::Running | AlgoState::Resumed | AlgoState::ToStop);
        self.life.move_to(AlgoState::Ended)?;
        self.ctx.stop.disarm();
        if was_running {
            self.ctx.stats.end_algorithm();
        }
        self.queue.clear();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // --- Exploration --------------------------------------------------------
    // ------------------------------------------------------------------------
    /// Pushes a node onto the queue unless the goal proves it useless
    pub fn offer(&mut self, node: NodeRef<X::Payload>) {
        if self.goal.is_eligible(&node) {
            self.queue.insert(node);
        } else {
            self.ctx.stats.pruned(1);
        }
    }

    /// Performs one iteration of the main loop: extracts the best node and
    /// processes it. Returns false iff the queue was empty.
    pub fn step(&mut self) -> Result<bool, SearchError> {
        self.life.ensure_running()?;
        let node = match self.queue.extract_best() {
            Some(node) => node,
            None => return Ok(false),
        };
        self.explored += 1;
        self.ctx.stats.explored(1);

        if node.is_solution() {
            self.goal.update(&node, false);
        } else if !self.goal.is_eligible(&node) {
            // the incumbent improved since the node was queued
            self.ctx.stats.pruned(1);
        } else {
            let incumbent = self.goal.best().and_then(|n| n.eval());
            match expand_node(&self.ctx, self.expander.as_ref(), &node, incumbent) {
                Ok(children) => children.into_iter().for_each(|c| self.offer(c.share())),
                Err(e) => {
                    log::debug!("aborting after a failed expansion of {:?}", node.id());
                    self.to_end()?;
                    return Err(e);
                }
            }
        }
        Ok(true)
    }

    /// Performs at most `budget` iterations. The phase ends early when the
    /// queue is exhausted or when a stop is requested, in which case the
    /// algorithm moves to `ToStop`.
    pub fn run_budget(&mut self, budget: usize) -> Result<PhaseOutcome, SearchError> {
        self.life.ensure_running()?;
        let mut explored = 0;
        while explored < budget {
            if self.ctx.stop.is_stop_requested() {
                self.life.move_to(AlgoState::ToStop)?;
                return Ok(PhaseOutcome { explored, exhausted: self.queue.is_empty(), stopped: true });
            }
            if !self.step()? {
                break;
            }
            explored += 1;
        }
        Ok(PhaseOutcome { explored, exhausted: self.queue.is_empty(), stopped: false })
    }

    /// Explores the search space until it is exhausted (the algorithm then
    /// ends) or until a stop is requested (the algorithm is then stopped and
    /// can be suspended).
    pub fn run(&mut self) -> Result<Completion, SearchError> {
        if self.life.state() == AlgoState::Initialized {
            self.to_run()?;
        }
        if let Some(limit) = self.ctx.config.time_limit {
            TimeBudget::arm(&self.ctx.stop, limit);
        }
        log::info!("search started with {} pending nodes", self.queue.len());
        let outcome = self.run_budget(usize::MAX)?;
        let best_cost = self.goal.best_cost();
        if outcome.stopped {
            self.to_stop()?;
            log::info!("search stopped after {} nodes with {} pending", self.explored, self.queue.len());
            Ok(Completion { is_exhausted: false, best_cost })
        } else {
            self.to_end()?;
            log::info!("search space exhausted after {} nodes, best = {:?}", self.explored, best_cost);
            Ok(Completion { is_exhausted: true, best_cost })
        }
    }
}

// ----------------------------------------------------------------------------
// --- Persistence ------------------------------------------------------------
// ----------------------------------------------------------------------------
impl<X, G, Q> Algorithm<X, G, Q>
where
    X: GenChild,
    X::Payload: Pack + Unpack,
    G: Goal<Payload = X::Payload> + Pack + Unpack,
    Q: PriorityQueue<Payload = X::Payload>,
{
    /// Writes the state of a stopped (or freshly initialized) search: first
    /// the instance, then the count prefixed pending nodes and finally the
    /// goal.
    pub fn suspend_into<I: Pack, W: Write>(&self, instance: &I, packer: &mut Packer<W>) -> Result<(), SearchError> {
        match self.life.state() {
            AlgoState::Stopped | AlgoState::Initialized => {},
            state => return Err(SearchError::InvalidTransition { from: state, to: AlgoState::Stopped }),
        }
        let mut pending = Vec::with_capacity(self.queue.len());
        self.queue.for_each_node(&mut |n| pending.push(n.clone()));

        instance.pack(packer)?;
        packer.len(pending.len())?;
        for node in pending.iter() {
            node.pack(packer)?;
        }
        self.goal.pack(packer)?;
        log::debug!("suspended {} pending nodes", pending.len());
        Ok(())
    }

    /// Rebuilds a suspended search. The algorithm is returned in the `Stopped`
    /// state along with the instance; call `to_resume` to carry on.
    ///
    /// No identifier issued before the suspension is issued again.
    pub fn resume_from<I: Unpack, R: Read>(
        ctx: SearchContext,
        expander: Arc<X>,
        mut queue: Q,
        unpacker: &mut Unpacker<R>,
    ) -> Result<(Self, I), SearchError> {
        let instance = I::unpack(unpacker)?;
        let pending = unpacker.len()?;
        queue.clear();
        for _ in 0..pending {
            let node = Node::<X::Payload>::unpack(unpacker)?;
            ctx.ids.advance_past(node.id());
            queue.insert(node.share());
        }
        let goal = G::unpack(unpacker)?;
        if let Some(best) = goal.best() {
            ctx.ids.advance_past(best.id());
        }

        let mut algo = Algorithm::new(ctx, expander, queue, goal);
        for state in [AlgoState::Initialized, AlgoState::Running, AlgoState::Stopped] {
            algo.life.move_to(state)?;
        }
        log::debug!("resumed {} pending nodes", pending);
        Ok((algo, instance))
    }
}

// ----------------------------------------------------------------------------
// --- Local engine -----------------------------------------------------------
// ----------------------------------------------------------------------------
impl<X, G, Q> LocalEngine for Algorithm<X, G, Q>
where
    X: GenChild,
    G: Goal<Payload = X::Payload> + Clone,
    Q: PriorityQueue<Payload = X::Payload>,
{
    type Payload = X::Payload;
    type Goal = G;

    fn initialize<I>(&mut self, instance: &mut I, seed_roots: bool) -> Result<(), SearchError>
        where I: Instance<Payload = Self::Payload>
    {
        self.to_init(instance, seed_roots)?;
        self.to_run()
    }
    fn run_phase(&mut self) -> Result<PhaseOutcome, SearchError> {
        self.run_budget(self.ctx.config.phase_budget)
    }
    fn load(&self) -> usize {
        self.queue.len()
    }
    fn donate(&mut self, max: usize) -> Vec<NodeRef<Self::Payload>> {
        let mut out = vec![];
        while out.len() < max {
            match self.queue.extract_transfer() {
                Some(node) => out.push(node),
                None => break,
            }
        }
        out
    }
    fn accept(&mut self, nodes: Vec<NodeRef<Self::Payload>>) {
        nodes.into_iter().for_each(|n| self.offer(n));
    }
    fn goal(&self) -> G {
        self.goal.clone()
    }
    fn merge_goal(&mut self, other: &G, kind: MergeKind) -> bool {
        self.goal.merge(other, kind)
    }
    fn clear_goal_updated(&mut self) {
        self.goal.clear_updated()
    }
    fn set_merge_policy(&mut self, policy: MergePolicy) {
        self.goal.set_merge_policy(policy)
    }
    fn stop_token(&self) -> StopToken {
        self.ctx.stop.clone()
    }
    fn stop(&mut self) -> Result<(), SearchError> {
        if self.life.state() != AlgoState::Stopped {
            self.to_stop()?;
        }
        Ok(())
    }
    fn finish(&mut self) -> Result<(), SearchError> {
        if self.life.state() != AlgoState::Ended {
            self.to_end()?;
        }
        Ok(())
    }
}
