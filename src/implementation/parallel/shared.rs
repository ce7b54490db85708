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

//! This module provides the implementation of a multi-threaded search in
//! which all the workers share one single queue and one single goal.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::{AlgoState, AnyQueue, Completion, GenChild, Goal, Instance, Lifecycle, LocalEngine,
    MergeKind, MergePolicy, NodeRef, PhaseOutcome, Priority, PriorityQueue, SearchContext, SearchError,
    StopToken, ThreadPool, TimeBudget};
use crate::implementation::algorithm::expand_node;

/// The shared data that may only be manipulated within critical sections
struct Critical<P, O: Priority<P>> {
    /// The nodes that must still be explored
    queue: AnyQueue<P, O>,
    /// This is the number of nodes that are currently being explored.
    ///
    /// # Note
    /// This is the piece of information that lets us distinguish between a
    /// node-starvation and the completion of the search. This counter needs
    /// to be carefully managed to guarantee the termination of all threads.
    ongoing: usize,
    /// The number of nodes handed out since the beginning of the phase
    dispatched: usize,
    /// The number of nodes which may be handed out during the phase
    budget: usize,
    /// The error which aborted the search (if any)
    failure: Option<SearchError>,
}

/// The state which is shared among the running threads: it provides an
/// access to the critical data (protected by a mutex) as well as a monitor
/// (condvar) to park threads in case of node-starvation.
///
/// # Note
/// The goal lives behind a lock of its own. The two locks are never held at
/// the same time.
struct Shared<X: GenChild, G, O: Priority<X::Payload>> {
    ctx: SearchContext,
    expander: Arc<X>,
    critical: Mutex<Critical<X::Payload, O>>,
    monitor: Condvar,
    goal: Mutex<G>,
}

/// The workload a thread can get from the shared state
enum WorkLoad<P> {
    /// There is no work left to be done: you can safely terminate
    Complete,
    /// The work must stop because of an external cutoff (or a failure)
    Stopped,
    /// The budget of the phase is consumed
    PhaseDone,
    /// There is nothing you can do right now. Check again when you wake up
    Starvation,
    /// The item to process
    WorkItem { node: NodeRef<P> },
}

/// A search running on a pool of threads which all take their work from the
/// same shared queue and report to the same shared goal. Hence, a solution
/// found by any worker immediately benefits to all of them.
pub struct SharedSearch<X, G, O>
where
    X: GenChild,
    O: Priority<X::Payload>,
{
    shared: Arc<Shared<X, G, O>>,
    pool: ThreadPool,
    life: Lifecycle,
}

impl<X, G, O> SharedSearch<X, G, O>
where
    X: GenChild + Send + Sync + 'static,
    X::Payload: Send + Sync + 'static,
    G: Goal<Payload = X::Payload> + 'static,
    O: Priority<X::Payload> + Send + 'static,
{
    pub fn new(ctx: SearchContext, expander: Arc<X>, priority: O, mut goal: G) -> Self {
        goal.set_merge_policy(ctx.config.effective_merge_policy());
        let pool = ThreadPool::new(ctx.config.nb_threads);
        let critical = Critical {
            queue: AnyQueue::new(ctx.config.queue, priority),
            ongoing: 0,
            dispatched: 0,
            budget: 0,
            failure: None,
        };
        let shared = Shared { ctx, expander, critical: Mutex::new(critical), monitor: Condvar::new(), goal: Mutex::new(goal) };
        SharedSearch { shared: Arc::new(shared), pool, life: Lifecycle::default() }
    }

    pub fn state(&self) -> AlgoState {
        self.life.state()
    }
    pub fn nb_threads(&self) -> usize {
        self.pool.size()
    }
    /// A copy of the shared goal
    pub fn best(&self) -> G where G: Clone {
        self.shared.goal.lock().clone()
    }
    pub fn best_cost(&self) -> Option<f64> {
        self.shared.goal.lock().best_cost()
    }

    /// Runs the search until the queue is exhausted or a stop is requested.
    pub fn run(&mut self) -> Result<Completion, SearchError> where G: Clone {
        if self.life.state() == AlgoState::Initialized {
            self.life.move_to(AlgoState::Running)?;
        }
        self.life.ensure_running()?;
        if let Some(limit) = self.shared.ctx.config.time_limit {
            TimeBudget::arm(&self.shared.ctx.stop, limit);
        }
        self.shared.ctx.stats.start_algorithm();
        log::info!("shared search started on {} threads", self.pool.size());
        let outcome = self.phase(usize::MAX);
        self.shared.ctx.stats.end_algorithm();
        let outcome = outcome?;

        let best_cost = self.best_cost();
        if outcome.stopped {
            self.stop()?;
        } else {
            self.end()?;
        }
        log::info!("shared search over after {} nodes, best = {:?}", outcome.explored, best_cost);
        Ok(Completion { is_exhausted: !outcome.stopped, best_cost })
    }

    /// Moves to the `Ended` state and releases all pending nodes
    fn end(&mut self) -> Result<(), SearchError> {
        self.life.move_to(AlgoState::Ended)?;
        self.shared.ctx.stop.disarm();
        self.shared.critical.lock().queue.clear();
        Ok(())
    }

    /// Lets all the workers process at most `budget` nodes in total
    fn phase(&mut self, budget: usize) -> Result<PhaseOutcome, SearchError> {
        self.life.ensure_running()?;
        {
            let mut critical = self.shared.critical.lock();
            critical.dispatched = 0;
            critical.budget = budget;
        }
        for id in 0..self.pool.size() {
            let shared = Arc::clone(&self.shared);
            self.pool.execute(move || Self::work(&shared, id));
        }
        if let Err(e) = self.pool.wait_idle() {
            self.end()?;
            return Err(e);
        }

        let mut critical = self.shared.critical.lock();
        if let Some(e) = critical.failure.take() {
            drop(critical);
            self.end()?;
            return Err(e);
        }
        Ok(PhaseOutcome {
            explored: critical.dispatched,
            exhausted: critical.queue.is_empty(),
            stopped: self.shared.ctx.stop.is_stop_requested(),
        })
    }

    /// The loop run by each worker during a phase
    fn work(shared: &Shared<X, G, O>, id: usize) {
        loop {
            match Self::get_workload(shared) {
                WorkLoad::Complete | WorkLoad::Stopped | WorkLoad::PhaseDone => break,
                WorkLoad::Starvation => continue,
                WorkLoad::WorkItem { node } => {
                    // ongoing must be decremented even when the expansion panics
                    let outcome = catch_unwind(AssertUnwindSafe(|| Self::process_one_node(shared, node)))
                        .unwrap_or(Err(SearchError::WorkerPanicked));
                    let mut critical = shared.critical.lock();
                    critical.ongoing -= 1;
                    if let Err(e) = outcome {
                        log::debug!("worker {} aborts the search", id);
                        critical.failure.get_or_insert(e);
                    }
                    shared.monitor.notify_all();
                }
            }
        }
        // wake up the threads waiting for work that will never come
        shared.monitor.notify_all();
    }

    /// This method processes one node: either it is a solution and updates
    /// the goal, or it is expanded and its eligible children are enqueued.
    fn process_one_node(shared: &Shared<X, G, O>, node: NodeRef<X::Payload>) -> Result<(), SearchError> {
        shared.ctx.stats.explored(1);
        let incumbent = {
            let mut goal = shared.goal.lock();
            if node.is_solution() {
                goal.update(&node, false);
                return Ok(());
            }
            if !goal.is_eligible(&node) {
                shared.ctx.stats.pruned(1);
                return Ok(());
            }
            goal.best().and_then(|n| n.eval())
        };

        let children = expand_node(&shared.ctx, shared.expander.as_ref(), &node, incumbent)?;
        let total = children.len();
        let eligible: Vec<NodeRef<X::Payload>> = {
            let goal = shared.goal.lock();
            children.into_iter().filter(|c| goal.is_eligible(c)).map(|c| c.share()).collect()
        };
        if eligible.len() < total {
            shared.ctx.stats.pruned(total - eligible.len());
        }

        let mut critical = shared.critical.lock();
        for child in eligible {
            critical.queue.insert(child);
        }
        Ok(())
    }

    /// This method yields a workload for the thread that requested it.
    fn get_workload(shared: &Shared<X, G, O>) -> WorkLoad<X::Payload> {
        let mut critical = shared.critical.lock();

        // Do we need to stop ?
        if critical.failure.is_some() || shared.ctx.stop.is_stop_requested() {
            return WorkLoad::Stopped;
        }
        // Are we done ?
        if critical.ongoing == 0 && critical.queue.is_empty() {
            return WorkLoad::Complete;
        }
        if critical.dispatched >= critical.budget {
            return WorkLoad::PhaseDone;
        }
        // Nothing to do yet ? => Wait for someone to post jobs
        if critical.queue.is_empty() {
            shared.monitor.wait(&mut critical);
            return WorkLoad::Starvation;
        }

        match critical.queue.extract_best() {
            Some(node) => {
                critical.ongoing += 1;
                critical.dispatched += 1;
                WorkLoad::WorkItem { node }
            }
            None => WorkLoad::Starvation,
        }
    }
}

impl<X, G, O> LocalEngine for SharedSearch<X, G, O>
where
    X: GenChild + Send + Sync + 'static,
    X::Payload: Send + Sync + 'static,
    G: Goal<Payload = X::Payload> + Clone + 'static,
    O: Priority<X::Payload> + Send + 'static,
{
    type Payload = X::Payload;
    type Goal = G;

    fn initialize<I>(&mut self, instance: &mut I, seed_roots: bool) -> Result<(), SearchError>
        where I: Instance<Payload = Self::Payload>
    {
        self.life.move_to(AlgoState::Initialized)?;
        instance.init();
        let ctx = &self.shared.ctx;
        if let Some(incumbent) = instance.initial_incumbent(&ctx.ids) {
            self.shared.goal.lock().update(&incumbent.share(), false);
        }
        if seed_roots {
            let roots = instance.roots(&ctx.ids);
            ctx.stats.created(roots.len());
            self.accept(roots.into_iter().map(|r| r.share()).collect());
        }
        self.life.move_to(AlgoState::Running)
    }
    fn run_phase(&mut self) -> Result<PhaseOutcome, SearchError> {
        let budget = self.shared.ctx.config.phase_budget.saturating_mul(self.pool.size());
        let outcome = self.phase(budget)?;
        if outcome.stopped {
            self.life.move_to(AlgoState::ToStop)?;
        }
        Ok(outcome)
    }
    fn load(&self) -> usize {
        self.shared.critical.lock().queue.len()
    }
    fn donate(&mut self, max: usize) -> Vec<NodeRef<Self::Payload>> {
        let mut critical = self.shared.critical.lock();
        let mut out = vec![];
        while out.len() < max {
            match critical.queue.extract_transfer() {
                Some(node) => out.push(node),
                None => break,
            }
        }
        out
    }
    fn accept(&mut self, nodes: Vec<NodeRef<Self::Payload>>) {
        let total = nodes.len();
        let eligible: Vec<_> = {
            let goal = self.shared.goal.lock();
            nodes.into_iter().filter(|n| goal.is_eligible(n)).collect()
        };
        if eligible.len() < total {
            self.shared.ctx.stats.pruned(total - eligible.len());
        }
        let mut critical = self.shared.critical.lock();
        eligible.into_iter().for_each(|n| critical.queue.insert(n));
    }
    fn goal(&self) -> G {
        self.best()
    }
    fn merge_goal(&mut self, other: &G, kind: MergeKind) -> bool {
        self.shared.goal.lock().merge(other, kind)
    }
    fn clear_goal_updated(&mut self) {
        self.shared.goal.lock().clear_updated()
    }
    fn set_merge_policy(&mut self, policy: MergePolicy) {
        self.shared.goal.lock().set_merge_policy(policy)
    }
    fn stop_token(&self) -> StopToken {
        self.shared.ctx.stop.clone()
    }
    fn stop(&mut self) -> Result<(), SearchError> {
        if self.life.state().is_running() {
            self.life.move_to(AlgoState::ToStop)?;
        }
        if self.life.state() != AlgoState::Stopped {
            self.life.move_to(AlgoState::Stopped)?;
        }
        self.shared.ctx.stop.disarm();
        Ok(())
    }
    fn finish(&mut self) -> Result<(), SearchError> {
        if self.life.state() != AlgoState::Ended {
            self.end()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_shared_search {
    use std::sync::Arc;

    use crate::*;
    use crate::test_utils::*;

    fn solver(ctx: SearchContext, knapsack: Knapsack) -> SharedSearch<Knapsack, BestSolutionGoal<Sack>, BestFirst> {
        let dir = ctx.direction();
        SharedSearch::new(ctx, Arc::new(knapsack), BestFirst(dir), BestSolutionGoal::new(dir))
    }

    #[test]
    fn finds_the_optimum_with_every_queue() {
        for kind in [QueueKind::BinaryHeap, QueueKind::SkewHeap, QueueKind::OrderedList, QueueKind::DualIndex] {
            let mut search = solver(SearchContext::new(config(kind)), Knapsack::medium());
            search.initialize(&mut Knapsack::medium(), true).unwrap();
            let outcome = search.run().unwrap();
            assert!(outcome.is_exhausted);
            assert_eq!(Some(Knapsack::medium().optimum() as f64), outcome.best_cost);
            assert_eq!(AlgoState::Ended, search.state());
        }
    }

    #[test]
    fn many_threads_find_the_same_optimum() {
        let mut cfg = config(QueueKind::BinaryHeap);
        cfg.nb_threads = 8;
        let mut search = solver(SearchContext::new(cfg), Knapsack::medium());
        assert_eq!(8, search.nb_threads());
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        assert_eq!(Some(Knapsack::medium().optimum() as f64), search.run().unwrap().best_cost);
    }

    #[test]
    fn phases_respect_their_budget() {
        let mut search = solver(SearchContext::new(config(QueueKind::BinaryHeap)), Knapsack::medium());
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        let outcome = search.run_phase().unwrap();
        // 4 nodes per thread, 2 threads
        assert!(outcome.explored <= 8);
        assert!(!outcome.stopped);

        let mut total = outcome.explored;
        loop {
            let outcome = search.run_phase().unwrap();
            total += outcome.explored;
            if outcome.exhausted {
                break;
            }
        }
        assert!(total > 8);
        assert_eq!(Some(Knapsack::medium().optimum() as f64), search.goal().best_cost());
        search.finish().unwrap();
    }

    #[test]
    fn a_stopped_search_is_not_exhausted() {
        let mut search = solver(SearchContext::new(config(QueueKind::BinaryHeap)), Knapsack::medium());
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        search.stop_token().request_stop();
        let outcome = search.run().unwrap();
        assert!(!outcome.is_exhausted);
        assert_eq!(AlgoState::Stopped, search.state());
        assert!(search.load() > 0);
    }

    #[test]
    fn a_failure_aborts_every_worker() {
        let ctx = SearchContext::new(config(QueueKind::BinaryHeap));
        let dir = ctx.direction();
        let mut search = SharedSearch::new(ctx, Arc::new(FailAt(Knapsack::medium(), 2)), DepthFirst, BestSolutionGoal::new(dir));
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        assert!(matches!(search.run(), Err(SearchError::Expansion(_))));
        assert_eq!(AlgoState::Ended, search.state());
        assert_eq!(0, search.load());
    }

    #[test]
    fn a_panicking_expansion_does_not_hang_the_team() {
        let ctx = SearchContext::new(config(QueueKind::BinaryHeap));
        let dir = ctx.direction();
        let mut search = SharedSearch::new(ctx, Arc::new(PanicAt(Knapsack::medium(), 0)), DepthFirst, BestSolutionGoal::new(dir));
        assert_eq!(2, search.nb_threads());
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        assert!(matches!(search.run(), Err(SearchError::WorkerPanicked)));
        assert_eq!(AlgoState::Ended, search.state());
    }

    #[test]
    fn a_late_panic_is_reported_too() {
        let ctx = SearchContext::new(config(QueueKind::BinaryHeap));
        let dir = ctx.direction();
        let mut search = SharedSearch::new(ctx, Arc::new(PanicAt(Knapsack::medium(), 3)), BreadthFirst, BestSolutionGoal::new(dir));
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        assert!(matches!(search.run(), Err(SearchError::WorkerPanicked)));
        assert_eq!(0, search.load());
    }

    #[test]
    fn counting_all_solutions() {
        // without capacity constraint, every subset of the 4 items is a solution
        let free = Knapsack { capacity: 100, ..Knapsack::small() };
        let ctx = SearchContext::new(config(QueueKind::BinaryHeap));
        let mut search = SharedSearch::new(ctx, Arc::new(free.clone()), DepthFirst, CountSolutionsGoal::new());
        search.initialize(&mut free.clone(), true).unwrap();
        search.run().unwrap();
        assert_eq!(16, search.best().count());
    }

    #[test]
    fn donated_nodes_leave_the_queue() {
        let mut search = solver(SearchContext::new(config(QueueKind::DualIndex)), Knapsack::medium());
        search.initialize(&mut Knapsack::medium(), true).unwrap();
        search.run_phase().unwrap();
        let load = search.load();
        let nodes = search.donate(2);
        assert_eq!(load - nodes.len(), search.load());
        search.accept(nodes);
        assert_eq!(load, search.load());
    }
}
