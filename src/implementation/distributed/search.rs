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

//! This module provides the implementation of a search distributed over the
//! ranks of a `Communicator`. Each rank drives its own `LocalEngine` and the
//! ranks synchronize at the end of each local phase.

use std::time::Duration;

use crate::{balance_plan, CommError, Communicator, Completion, Goal, Instance, LocalEngine, MergeKind, MessageBuffer,
    MessageKind, NodeRef, Pack, SearchConfig, SearchError, Status, TimeBudget, Topology, Unpack};

/// A search distributed over several ranks.
///
/// The search proceeds in synchronous rounds. During each round, every rank:
/// 1. runs one phase of its local engine (unless its queue is empty),
/// 2. sends its `Status` to all the other ranks and receives theirs,
/// 3. sends its goal to its targets (in the configured topology) when it
///    has been updated since the last round, and merges the goals it receives,
/// 4. decides whether the search is over: it is as soon as a rank failed or
///    stopped, or when all the queues are empty,
/// 5. performs its part of the balancing plan (nodes migrate to idle ranks).
///
/// Once the search is over, all the goals are folded into the goal of rank 0
/// with a `final_merge` and the result is sent back to every rank.
///
/// # Note:
/// The goal of each rank must be created with a distinct origin (see
/// `Goal::spawn`): this is what keeps the goals counting solutions from
/// mistaking the counts of two ranks for one another.
pub struct DistributedSearch<C, E> {
    comm: C,
    engine: E,
    topology: Topology,
    balance_threshold: usize,
    time_limit: Option<Duration>,
    round: u64,
}

impl<C, E> DistributedSearch<C, E>
where
    C: Communicator,
    E: LocalEngine,
    E::Payload: Pack + Unpack,
    E::Goal: Pack + Unpack,
{
    pub fn new(comm: C, mut engine: E, config: &SearchConfig) -> Self {
        engine.set_merge_policy(config.effective_merge_policy());
        DistributedSearch {
            comm,
            engine,
            topology: config.topology,
            balance_threshold: config.balance_threshold,
            time_limit: config.time_limit,
            round: 0,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
    pub fn comm(&self) -> &C {
        &self.comm
    }
    /// The number of rounds performed so far
    pub fn rounds(&self) -> u64 {
        self.round
    }
    pub fn into_parts(self) -> (C, E) {
        (self.comm, self.engine)
    }

    /// Runs the search to completion. Only rank 0 seeds the roots of the
    /// instance; the others get their nodes through load balancing.
    ///
    /// A local failure is reported to the other ranks before it is returned,
    /// and the ranks which learn about it fail with `RemoteFailure`.
    ///
    /// When the search is stopped (by a request or by the time limit of the
    /// configuration) the engine is left in the `Stopped` state.
    pub fn run<I>(&mut self, instance: &mut I) -> Result<Completion, SearchError>
        where I: Instance<Payload = E::Payload>
    {
        if let Some(limit) = self.time_limit {
            TimeBudget::arm(&self.engine.stop_token(), limit);
        }
        let outcome = self.rounds_loop(instance);
        self.engine.stop_token().disarm();
        outcome
    }

    fn rounds_loop<I>(&mut self, instance: &mut I) -> Result<Completion, SearchError>
        where I: Instance<Payload = E::Payload>
    {
        let rank = self.comm.rank();
        log::info!("rank {} of {} starts the distributed search", rank, self.comm.size());

        let mut failure = self.engine.initialize(instance, rank == 0).err();
        let mut stopped = false;
        let is_exhausted = loop {
            if failure.is_none() && !stopped && self.engine.load() > 0 {
                match self.engine.run_phase() {
                    Ok(outcome) => stopped = outcome.stopped,
                    Err(e) => failure = Some(e),
                }
            }
            stopped |= self.engine.stop_token().is_stop_requested();

            let status = Status {
                round: self.round,
                load: self.engine.load(),
                stopped,
                failed: failure.is_some(),
                goal_updated: self.engine.goal().is_updated(),
            };
            let statuses = self.exchange_status(status)?;
            self.exchange_goals(&statuses)?;

            if let Some(culprit) = statuses.iter().position(|s| s.failed) {
                log::info!("rank {} ends the search: rank {} failed", rank, culprit);
                self.engine.finish().ok();
                return Err(failure.unwrap_or(SearchError::RemoteFailure(culprit)));
            }
            if statuses.iter().any(|s| s.stopped) {
                break false;
            }
            if statuses.iter().all(|s| s.load == 0) {
                break true;
            }
            self.balance(&statuses)?;
            self.round += 1;
        };

        self.final_merge()?;
        if is_exhausted {
            self.engine.finish()?;
        } else {
            self.engine.stop()?;
        }
        let best_cost = self.engine.goal().best_cost();
        log::info!("rank {} is done after {} rounds, best = {:?}", rank, self.round + 1, best_cost);
        Ok(Completion { is_exhausted, best_cost })
    }

    /// Sends `status` to every other rank and collects the statuses of all
    /// the ranks (indexed by rank).
    fn exchange_status(&mut self, status: Status) -> Result<Vec<Status>, SearchError> {
        let rank = self.comm.rank();
        let size = self.comm.size();
        let bytes = MessageBuffer::of(&status)?.into_bytes();
        for dest in (0..size).filter(|r| *r != rank) {
            self.comm.send(dest, MessageKind::Control, bytes.clone())?;
        }

        let mut statuses = vec![Status::default(); size];
        statuses[rank] = status;
        for source in (0..size).filter(|r| *r != rank) {
            let env = self.comm.recv(Some(source), MessageKind::Control)?;
            let theirs: Status = MessageBuffer::from_bytes(env.payload).value()?;
            if theirs.round != status.round {
                return Err(CommError::Protocol(format!(
                    "rank {} is at round {} while rank {} is at round {}",
                    source, theirs.round, rank, status.round)).into());
            }
            statuses[source] = theirs;
        }
        Ok(statuses)
    }

    /// Forwards the local goal when it was updated and merges the goals sent
    /// by the sources of this rank.
    fn exchange_goals(&mut self, statuses: &[Status]) -> Result<(), SearchError> {
        let rank = self.comm.rank();
        let size = self.comm.size();

        let mut requests: Vec<_> = self.topology.goal_sources(rank, size).into_iter()
            .filter(|s| statuses[*s].goal_updated)
            .map(|s| self.comm.irecv(Some(s), MessageKind::Goal))
            .collect();

        if statuses[rank].goal_updated {
            let bytes = MessageBuffer::of(&self.engine.goal())?.into_bytes();
            for dest in self.topology.goal_targets(rank, size) {
                self.comm.send(dest, MessageKind::Goal, bytes.clone())?;
            }
            self.engine.clear_goal_updated();
        }

        for request in requests.iter_mut() {
            let env = self.comm.wait(request)?;
            let goal: E::Goal = MessageBuffer::from_bytes(env.payload).value()?;
            if self.engine.merge_goal(&goal, MergeKind::Current) {
                log::debug!("rank {} improved its goal with the one of rank {}", rank, env.source);
            }
        }
        Ok(())
    }

    /// Performs the part of the balancing plan which concerns this rank
    fn balance(&mut self, statuses: &[Status]) -> Result<(), SearchError> {
        let rank = self.comm.rank();
        let plan = balance_plan(self.topology, statuses, self.balance_threshold);

        for transfer in plan.iter().filter(|t| t.from == rank) {
            let nodes = self.engine.donate(transfer.count);
            log::debug!("rank {} sends {} nodes to rank {}", rank, nodes.len(), transfer.to);
            let bytes = MessageBuffer::of(&nodes)?.into_bytes();
            self.comm.send(transfer.to, MessageKind::WorkUnit, bytes)?;
        }
        for transfer in plan.iter().filter(|t| t.to == rank) {
            let env = self.comm.recv(Some(transfer.from), MessageKind::WorkUnit)?;
            let nodes: Vec<NodeRef<E::Payload>> = MessageBuffer::from_bytes(env.payload).value()?;
            log::debug!("rank {} received {} nodes from rank {}", rank, nodes.len(), transfer.from);
            self.engine.accept(nodes);
        }
        Ok(())
    }

    /// Folds every goal into the one of rank 0 and hands the result back to
    /// all the ranks.
    fn final_merge(&mut self) -> Result<(), SearchError> {
        let rank = self.comm.rank();
        let size = self.comm.size();
        if size == 1 {
            return Ok(());
        }
        if rank == 0 {
            for source in 1..size {
                let env = self.comm.recv(Some(source), MessageKind::Goal)?;
                let goal: E::Goal = MessageBuffer::from_bytes(env.payload).value()?;
                self.engine.merge_goal(&goal, MergeKind::Final);
            }
            let bytes = MessageBuffer::of(&self.engine.goal())?.into_bytes();
            for dest in 1..size {
                self.comm.send(dest, MessageKind::Goal, bytes.clone())?;
            }
        } else {
            let bytes = MessageBuffer::of(&self.engine.goal())?.into_bytes();
            self.comm.send(0, MessageKind::Goal, bytes)?;
            let env = self.comm.recv(Some(0), MessageKind::Goal)?;
            let goal: E::Goal = MessageBuffer::from_bytes(env.payload).value()?;
            self.engine.merge_goal(&goal, MergeKind::Final);
        }
        Ok(())
    }
}
