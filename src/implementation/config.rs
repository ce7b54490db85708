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

//! This module provides the configuration of a search along with the context
//! object which is threaded through all the components of the engine.

use std::{sync::Arc, time::Duration};

use derive_builder::Builder;

use crate::{Direction, MergePolicy, NodeIds, QueueKind, StatSink, Statistics, StopToken, Topology};

/// This is how you configure a search. The configuration is immutable for
/// the whole duration of a run.
///
/// # Example
/// ```
/// # use parsearch::*;
/// let config = SearchConfigBuilder::default()
///     .direction(Direction::Maximize)
///     .nb_threads(2_usize)
///     .queue(QueueKind::SkewHeap)
///     .build()
///     .unwrap();
/// assert_eq!(2, config.nb_threads);
/// assert_eq!(64, config.phase_budget);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SearchConfig {
    /// The direction of the optimization
    #[builder(default)]
    pub direction: Direction,
    /// The depth at which the `BestThenDepth` priority switches from a best
    /// first to a depth first exploration (0 disables the switch)
    #[builder(default = "0")]
    pub depth_threshold: usize,
    /// The number of worker threads. By default, this number amounts to the
    /// number of hardware threads available on the machine.
    #[builder(default = "num_cpus::get()")]
    pub nb_threads: usize,
    /// A wall-clock limit after which a stop is requested
    #[builder(default, setter(strip_option))]
    pub time_limit: Option<Duration>,
    /// The realization of the priority queues
    #[builder(default)]
    pub queue: QueueKind,
    /// The number of nodes a worker expands between two synchronizations
    #[builder(default = "64")]
    pub phase_budget: usize,
    /// The communication topology of a distributed search
    #[builder(default)]
    pub topology: Topology,
    /// The way merges affect the 'updated' flag of the goals. When left
    /// unspecified, the policy is derived from the topology.
    #[builder(default, setter(strip_option))]
    pub merge_policy: Option<MergePolicy>,
    /// The minimum load a worker must have before it donates nodes
    #[builder(default = "2")]
    pub balance_threshold: usize,
}
impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            direction: Direction::default(),
            depth_threshold: 0,
            nb_threads: num_cpus::get(),
            time_limit: None,
            queue: QueueKind::default(),
            phase_budget: 64,
            topology: Topology::default(),
            merge_policy: None,
            balance_threshold: 2,
        }
    }
}
impl SearchConfig {
    /// The merge policy which is effectively in use
    pub fn effective_merge_policy(&self) -> MergePolicy {
        self.merge_policy.unwrap_or_else(|| self.topology.default_merge_policy())
    }
}

/// The explicit context of a search: its configuration along with the
/// services which are shared by all of its workers.
#[derive(Clone)]
pub struct SearchContext {
    pub config: SearchConfig,
    pub ids: Arc<NodeIds>,
    pub stop: StopToken,
    pub stats: Arc<dyn StatSink>,
}
impl SearchContext {
    pub fn new(config: SearchConfig) -> Self {
        SearchContext {
            config,
            ids: Arc::new(NodeIds::new()),
            stop: StopToken::new(),
            stats: Arc::new(Statistics::new()),
        }
    }
    /// Replaces the statistics sink
    pub fn with_stats(mut self, stats: Arc<dyn StatSink>) -> Self {
        self.stats = stats;
        self
    }
    /// A context sharing everything with self but the stop token. This is
    /// what sub-engines are created with.
    pub fn detached(&self) -> Self {
        SearchContext { stop: StopToken::new(), ..self.clone() }
    }
    pub fn direction(&self) -> Direction {
        self.config.direction
    }
}
impl Default for SearchContext {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
impl std::fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchContext")
            .field("config", &self.config)
            .field("ids", &self.ids)
            .field("stop", &self.stop)
            .finish()
    }
}
