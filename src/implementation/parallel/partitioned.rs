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
//! which each worker runs its own algorithm on its own queue. The workers
//! only synchronize at the end of each phase, when the leader of the phase
//! merges their goals and rebalances their queues.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::{AlgoState, Algorithm, AnyQueue, Completion, GenChild, Goal, Instance, Lifecycle, LocalEngine,
    MergeKind, MergePolicy, NodeRef, PhaseBarrier, PhaseOutcome, Priority, SearchContext, SearchError,
    StopToken, ThreadPool, TimeBudget};

type Worker<X, G, O> = Algorithm<X, G, AnyQueue<<X as GenChild>::Payload, O>>;

/// What the workers share with each other and with the engine
struct Team<X, G, O>
where
    X: GenChild,
    G: Goal<Payload = X::Payload>,
    O: Priority<X::Payload>,
{
    workers: Vec<Mutex<Worker<X, G, O>>>,
    /// The aggregate of the goals of all the workers
    goal: Mutex<G>,
    barrier: PhaseBarrier,
    /// The outcome of the last phase of each worker
    outcomes: Mutex<Vec<Option<Result<PhaseOutcome, SearchError>>>>,
    balance_threshold: usize,
}

impl<X, G, O> Team<X, G, O>
where
    X: GenChild,
    G: Goal<Payload = X::Payload> + Clone,
    O: Priority<X::Payload>,
{
    /// Runs one phase of the worker `id`. The last worker to complete its
    /// phase synchronizes the whole team.
    fn phase(&self, id: usize, budget: usize) {
        let outcome = {
            let mut worker = self.workers[id].lock();
            catch_unwind(AssertUnwindSafe(|| worker.run_budget(budget)))
                .unwrap_or(Err(SearchError::WorkerPanicked))
        };
        self.outcomes.lock()[id] = Some(outcome);

        if self.barrier.wait() {
            self.synchronize();
        }
    }

    /// Performed by the leader while all the other workers are quiescent
    fn synchronize(&self) {
        self.merge_goals();
        self.rebalance();
    }

    /// Folds the goal of each worker into the team goal and then hands the
    /// result back to each worker.
    fn merge_goals(&self) {
        let mut team = self.goal.lock();
        for worker in self.workers.iter() {
            let mut worker = worker.lock();
            team.current_merge(worker.goal());
            if worker.goal().is_updated() {
                team.mark_updated();
                worker.goal_mut().clear_updated();
            }
        }
        for worker in self.workers.iter() {
            let mut worker = worker.lock();
            worker.goal_mut().current_merge(&team);
            worker.goal_mut().clear_updated();
        }
    }

    /// Moves nodes from the most loaded workers to the least loaded ones
    fn rebalance(&self) {
        let n = self.workers.len();
        let mut loads: Vec<usize> = self.workers.iter().map(|w| w.lock().load()).collect();
        for _ in 0..n {
            let (rich, max) = loads.iter().copied().enumerate().max_by_key(|x| x.1).unwrap_or((0, 0));
            let (poor, min) = loads.iter().copied().enumerate().min_by_key(|x| x.1).unwrap_or((0, 0));
            if max < self.balance_threshold || max - min <= 1 {
                break;
            }
            let nodes = self.workers[rich].lock().donate((max - min) / 2);
            log::debug!("moving {} nodes from worker {} to worker {}", nodes.len(), rich, poor);
            self.workers[poor].lock().accept(nodes);
            loads[rich] = self.workers[rich].lock().load();
            loads[poor] = self.workers[poor].lock().load();
        }
    }

    fn total_load(&self) -> usize {
        self.workers.iter().map(|w| w.lock().load()).sum()
    }
}

/// A search running one `Algorithm` per thread of a pool. The phases of the
/// workers are separated by a barrier so that goal merges and queue
/// rebalancing only ever happen at quiescent points.
pub struct PartitionedSearch<X, G, O>
where
    X: GenChild,
    G: Goal<Payload = X::Payload>,
    O: Priority<X::Payload>,
{
    ctx: SearchContext,
    team: Arc<Team<X, G, O>>,
    pool: ThreadPool,
    life: Lifecycle,
}

impl<X, G, O> PartitionedSearch<X, G, O>
where
    X: GenChild + Send + Sync + 'static,
    X::Payload: Send + Sync + 'static,
    G: Goal<Payload = X::Payload> + Clone + 'static,
    O: Priority<X::Payload> + Clone + Send + 'static,
{
    pub fn new(ctx: SearchContext, expander: Arc<X>, priority: O, mut goal: G) -> Self {
        let policy = ctx.config.effective_merge_policy();
        goal.set_merge_policy(policy);
        let pool = ThreadPool::new(ctx.config.nb_threads);
        let n = pool.size();

        let workers = (0..n)
            .map(|id| {
                let queue = AnyQueue::new(ctx.config.queue, priority.clone());
                Mutex::new(Algorithm::new(ctx.clone(), Arc::clone(&expander), queue, goal.spawn(id)))
            })
            .collect();
        let team = Team {
            workers,
            goal: Mutex::new(goal),
            barrier: PhaseBarrier::new(n),
            outcomes: Mutex::new((0..n).map(|_| None).collect()),
            balance_threshold: ctx.config.balance_threshold,
        };
        PartitionedSearch { ctx, team: Arc::new(team), pool, life: Lifecycle::default() }
    }

    pub fn state(&self) -> AlgoState {
        self.life.state()
    }
    pub fn nb_workers(&self) -> usize {
        self.pool.size()
    }
    /// The load of each worker
    pub fn loads(&self) -> Vec<usize> {
        self.team.workers.iter().map(|w| w.lock().load()).collect()
    }
    /// A copy of the team goal
    pub fn best(&self) -> G {
        self.team.goal.lock().clone()
    }

    /// Runs phases until all the queues are exhausted or a stop is requested.
    /// The goals of the workers are then folded into the team goal.
    pub fn run(&mut self) -> Result<Completion, SearchError> {
        if let Some(limit) = self.ctx.config.time_limit {
            TimeBudget::arm(&self.ctx.stop, limit);
        }
        log::info!("partitioned search started on {} workers", self.pool.size());
        let mut explored = 0;
        loop {
            let outcome = self.run_phase()?;
            explored += outcome.explored;
            if outcome.stopped || outcome.exhausted {
                break;
            }
        }
        let stopped = self.life.state() == AlgoState::ToStop;
        self.final_merge();
        if stopped {
            self.stop()?;
        } else {
            self.finish()?;
        }
        let best_cost = self.team.goal.lock().best_cost();
        log::info!("partitioned search over after {} nodes, best = {:?}", explored, best_cost);
        Ok(Completion { is_exhausted: !stopped, best_cost })
    }

    /// Folds the goals of all the workers into the team goal
    fn final_merge(&self) {
        let mut team = self.team.goal.lock();
        for worker in self.team.workers.iter() {
            team.final_merge(worker.lock().goal());
        }
    }

    fn abort(&mut self, error: SearchError) -> SearchError {
        log::debug!("partitioned search aborted: {}", error);
        for worker in self.team.workers.iter() {
            let mut worker = worker.lock();
            if worker.state() != AlgoState::Ended {
                worker.to_end().ok();
            }
        }
        self.life.move_to(AlgoState::Ended).ok();
        error
    }
}

impl<X, G, O> LocalEngine for PartitionedSearch<X, G, O>
where
    X: GenChild + Send + Sync + 'static,
    X::Payload: Send + Sync + 'static,
    G: Goal<Payload = X::Payload> + Clone + 'static,
    O: Priority<X::Payload> + Clone + Send + 'static,
{
    type Payload = X::Payload;
    type Goal = G;

    /// The instance is initialized once; its roots are dealt to the workers
    /// in turn and its initial incumbent is shared by the whole team.
    fn initialize<I>(&mut self, instance: &mut I, seed_roots: bool) -> Result<(), SearchError>
        where I: Instance<Payload = Self::Payload>
    {
        self.life.move_to(AlgoState::Initialized)?;
        instance.init();
        if let Some(incumbent) = instance.initial_incumbent(&self.ctx.ids) {
            self.team.goal.lock().update(&incumbent.share(), false);
        }
        let n = self.team.workers.len();
        let mut shares: Vec<Vec<NodeRef<Self::Payload>>> = (0..n).map(|_| vec![]).collect();
        if seed_roots {
            let roots = instance.roots(&self.ctx.ids);
            self.ctx.stats.created(roots.len());
            for (i, root) in roots.into_iter().enumerate() {
                shares[i % n].push(root.share());
            }
        }
        self.team.merge_goals();
        for (worker, share) in self.team.workers.iter().zip(shares) {
            let mut worker = worker.lock();
            worker.to_init_with(share)?;
            worker.to_run()?;
        }
        self.life.move_to(AlgoState::Running)
    }

    fn run_phase(&mut self) -> Result<PhaseOutcome, SearchError> {
        self.life.ensure_running()?;
        let budget = self.ctx.config.phase_budget;
        for id in 0..self.pool.size() {
            let team = Arc::clone(&self.team);
            self.pool.execute(move || team.phase(id, budget));
        }
        if let Err(e) = self.pool.wait_idle() {
            return Err(self.abort(e));
        }

        let outcomes: Vec<_> = self.team.outcomes.lock().iter_mut().map(|o| o.take()).collect();
        let mut phase = PhaseOutcome::default();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                Ok(o) => {
                    phase.explored += o.explored;
                    phase.stopped |= o.stopped;
                }
                Err(e) => return Err(self.abort(e)),
            }
        }
        phase.exhausted = self.team.total_load() == 0;
        if phase.stopped {
            self.life.move_to(AlgoState::ToStop)?;
        }
        log::debug!("phase over: {} nodes explored, {} pending", phase.explored, self.team.total_load());
        Ok(phase)
    }
    fn load(&self) -> usize {
        self.team.total_load()
    }
    fn donate(&mut self, max: usize) -> Vec<NodeRef<Self::Payload>> {
        let mut out = vec![];
        for worker in self.team.workers.iter() {
            if out.len() >= max {
                break;
            }
            let mut worker = worker.lock();
            let share = (worker.load() / 2).min(max - out.len());
            out.extend(worker.donate(share));
        }
        out
    }
    fn accept(&mut self, nodes: Vec<NodeRef<Self::Payload>>) {
        if let Some(first) = self.team.workers.first() {
            first.lock().accept(nodes);
        }
        self.team.rebalance();
    }
    fn goal(&self) -> G {
        self.best()
    }
    fn merge_goal(&mut self, other: &G, kind: MergeKind) -> bool {
        let improved = self.team.goal.lock().merge(other, kind);
        for worker in self.team.workers.iter() {
            let mut worker = worker.lock();
            worker.goal_mut().current_merge(other);
            worker.goal_mut().clear_updated();
        }
        improved
    }
    fn clear_goal_updated(&mut self) {
        self.team.goal.lock().clear_updated()
    }
    fn set_merge_policy(&mut self, policy: MergePolicy) {
        self.team.goal.lock().set_merge_policy(policy);
        for worker in self.team.workers.iter() {
            worker.lock().goal_mut().set_merge_policy(policy);
        }
    }
    fn stop_token(&self) -> StopToken {
        self.ctx.stop.clone()
    }
    fn stop(&mut self) -> Result<(), SearchError> {
        for worker in self.team.workers.iter() {
            let mut worker = worker.lock();
            if worker.state() == AlgoState::ToStop || worker.state().is_running() {
                worker.to_stop()?;
            }
        }
        if self.life.state().is_running() {
            self.life.move_to(AlgoState::ToStop)?;
        }
        if self.life.state() != AlgoState::Stopped {
            self.life.move_to(AlgoState::Stopped)?;
        }
        Ok(())
    }
    fn finish(&mut self) -> Result<(), SearchError> {
        for worker in self.team.workers.iter() {
            let mut worker = worker.lock();
            if worker.state() != AlgoState::Ended {
                worker.to_end()?;
            }
        }
        if self.life.state() != AlgoState::Ended {
            self.life.move_to(AlgoState::Ended)?;
        }
        Ok(())
    }
}
