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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client library is likely to work with.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use thiserror::Error;

// ----------------------------------------------------------------------------
// --- NODE ID ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes the identifier of a node in the search tree. Identifiers
/// are handed out in increasing order by a `NodeIds` generator and are only
/// meant to trace the exploration (they play no role in its correctness).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u64);
impl NodeId {
    #[inline]
    /// This function returns the numeric value of the identifier.
    ///
    /// # Examples:
    /// ```
    /// # use parsearch::NodeId;
    /// assert_eq!(0, NodeId(0).id());
    /// assert_eq!(7, NodeId(7).id());
    /// ```
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A thread safe generator of monotonically increasing node identifiers.
#[derive(Debug, Default)]
pub struct NodeIds {
    next: AtomicU64,
}
impl NodeIds {
    pub fn new() -> Self {
        Self::default()
    }
    /// Returns a fresh identifier
    pub fn next_id(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, AtomicOrdering::Relaxed))
    }
    /// Returns the number of identifiers that have been handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(AtomicOrdering::Relaxed)
    }
    /// Makes sure that no identifier smaller or equal to `id` is ever issued
    /// again. This is used when nodes are reloaded from a persisted state.
    pub fn advance_past(&self, id: NodeId) {
        self.next.fetch_max(id.0 + 1, AtomicOrdering::Relaxed);
    }
}

// ----------------------------------------------------------------------------
// --- DIRECTION --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The direction of the optimization.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Smaller costs are better
    #[default]
    Minimize,
    /// Larger costs are better
    Maximize,
}
impl Direction {
    /// Returns true iff cost `a` is strictly better than `b`.
    ///
    /// # Examples:
    /// ```
    /// # use parsearch::Direction;
    /// assert!(Direction::Minimize.is_better(1.0, 2.0));
    /// assert!(Direction::Maximize.is_better(2.0, 1.0));
    /// assert!(!Direction::Minimize.is_better(2.0, 2.0));
    /// ```
    #[inline]
    pub fn is_better(self, a: f64, b: f64) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
    /// Compares two costs so that the better one is `Greater`.
    #[inline]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Direction::Minimize => b.total_cmp(&a),
            Direction::Maximize => a.total_cmp(&b),
        }
    }
    /// Compares two optional evaluations. A missing evaluation is always
    /// considered to be the worst possible one.
    #[inline]
    pub fn compare_eval(self, a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => self.compare(a, b),
            (Some(_), None)    => Ordering::Greater,
            (None, Some(_))    => Ordering::Less,
            (None, None)       => Ordering::Equal,
        }
    }
}

// ----------------------------------------------------------------------------
// --- NODE -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Tells whether a node can still be expanded or if it stands for a complete
/// solution of the problem.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A node that must still be expanded
    #[default]
    Problem,
    /// A terminal node: it stands for a complete solution
    Solution,
}

/// A node is a vertex of the search tree. It carries a problem specific
/// `payload` along with its depth, an identifier and an optional evaluation.
///
/// For problem nodes, the evaluation is understood as a bound on the cost of
/// the best solution reachable from that node. For solution nodes, it is the
/// actual cost of the solution.
///
/// # Note:
/// Nodes are shared between the queues, the goal and the buffers of the
/// message passing layer through a `NodeRef` (an `Arc`). Each of these
/// containers owns one strong reference to the nodes it holds. A node is
/// dropped as soon as the last of its holders releases it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<P> {
    depth: usize,
    id: NodeId,
    eval: Option<f64>,
    kind: NodeKind,
    payload: P,
}

/// A shared handle to a node. Cloning a `NodeRef` is how one acquires a new
/// reference to a node; dropping it releases that reference.
pub type NodeRef<P> = Arc<Node<P>>;

impl<P> Node<P> {
    /// Creates a new node from its raw components
    pub fn new(id: NodeId, depth: usize, kind: NodeKind, eval: Option<f64>, payload: P) -> Self {
        Node { depth, id, eval, kind, payload }
    }
    /// Creates a root problem node (depth 0)
    pub fn root(id: NodeId, eval: Option<f64>, payload: P) -> Self {
        Self::new(id, 0, NodeKind::Problem, eval, payload)
    }
    /// Creates a problem node one level deeper than self
    pub fn child(&self, id: NodeId, eval: Option<f64>, payload: P) -> Self {
        Self::new(id, self.depth + 1, NodeKind::Problem, eval, payload)
    }
    /// Flags this node as a solution with the given cost
    pub fn into_solution(mut self, cost: f64) -> Self {
        self.kind = NodeKind::Solution;
        self.eval = Some(cost);
        self
    }
    /// Wraps the node in a shared handle
    pub fn share(self) -> NodeRef<P> {
        Arc::new(self)
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }
    #[inline]
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }
    #[inline]
    pub fn eval(&self) -> Option<f64> {
        self.eval
    }
    #[inline]
    pub fn set_eval(&mut self, eval: Option<f64>) {
        self.eval = eval;
    }
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
    #[inline]
    pub fn is_solution(&self) -> bool {
        self.kind == NodeKind::Solution
    }
    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }
    #[inline]
    pub fn payload_mut(&mut self) -> &mut P {
        &mut self.payload
    }
    pub fn into_payload(self) -> P {
        self.payload
    }
}

/// Returns the number of live references to the given node (the handle which
/// is passed in included).
#[inline]
pub fn holders<P>(node: &NodeRef<P>) -> usize {
    Arc::strong_count(node)
}

// ----------------------------------------------------------------------------
// --- ALGORITHM STATE --------------------------------------------------------
// ----------------------------------------------------------------------------
/// The states an algorithm goes through during its lifetime.
///
/// ```plain
/// Allocated -> Initialized -> Running <-> (ToStop -> Stopped -> Resumed)
///                                 \__________________________________ -> Ended
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AlgoState {
    Allocated,
    Initialized,
    Running,
    Resumed,
    ToStop,
    Stopped,
    Ended,
}
impl AlgoState {
    /// Returns true iff the transition from self to `to` is legal
    pub fn can_move_to(self, to: AlgoState) -> bool {
        use AlgoState::*;
        match (self, to) {
            (Allocated, Initialized)   => true,
            (Initialized, Running)     => true,
            (Running, ToStop)          => true,
            (Resumed, ToStop)          => true,
            (Running, Stopped)         => true,
            (Resumed, Stopped)         => true,
            (ToStop, Stopped)          => true,
            (Stopped, Resumed)         => true,
            (Ended, _)                 => false,
            (_, Ended)                 => true,
            _                          => false,
        }
    }
    /// Returns true iff nodes can be expanded while in this state
    pub fn is_running(self) -> bool {
        matches!(self, AlgoState::Running | AlgoState::Resumed)
    }
}
impl fmt::Display for AlgoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A small helper to enforce the legality of the state transitions
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    state: AlgoState,
}
impl Default for Lifecycle {
    fn default() -> Self {
        Lifecycle { state: AlgoState::Allocated }
    }
}
impl Lifecycle {
    pub fn state(&self) -> AlgoState {
        self.state
    }
    /// Moves to the `to` state or fails with an `InvalidTransition` error
    pub fn move_to(&mut self, to: AlgoState) -> Result<(), SearchError> {
        if self.state.can_move_to(to) {
            log::debug!("transition {} -> {}", self.state, to);
            self.state = to;
            Ok(())
        } else {
            Err(SearchError::InvalidTransition { from: self.state, to })
        }
    }
    /// Fails unless the current state allows the expansion of nodes
    pub fn ensure_running(&self) -> Result<(), SearchError> {
        if self.state.is_running() {
            Ok(())
        } else {
            Err(SearchError::NotRunning(self.state))
        }
    }
}

// ----------------------------------------------------------------------------
// --- Results ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The outcome of a search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    /// true iff the search space has been exhausted (no node is left to explore),
    /// false when the search was stopped before
    pub is_exhausted: bool,
    /// if present the cost of the best solution that has been found
    pub best_cost: Option<f64>,
}

/// The outcome of one phase of a search (a bounded number of expansions
/// performed between two synchronization points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseOutcome {
    /// number of nodes which have been popped from the queue during the phase
    pub explored: usize,
    /// true iff the local queue is empty at the end of the phase
    pub exhausted: bool,
    /// true iff a stop was requested during the phase
    pub stopped: bool,
}

/// Tells how a goal must be merged into another one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeKind {
    /// interim synchronization (possibly repeated)
    Current,
    /// the merge performed once at shutdown
    Final,
}

/// Tells whether merging a goal marks the receiver as 'updated'.
///
/// A goal which has been marked as updated is one that needs to be forwarded
/// to the other workers upon the next synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergePolicy {
    /// does an improving `current_merge` mark the goal as updated ?
    pub mark_on_current: bool,
    /// does a `final_merge` always mark the goal as updated ?
    pub mark_on_final: bool,
}
impl Default for MergePolicy {
    fn default() -> Self {
        MergePolicy { mark_on_current: false, mark_on_final: true }
    }
}

// ----------------------------------------------------------------------------
// --- Errors -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The error a user supplied expansion may return to abort the search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("node expansion failed: {0}")]
pub struct ExpansionError(pub String);

/// Errors raised while packing or unpacking values
#[derive(Debug, Error)]
pub enum PackError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tag {tag} while decoding {what}")]
    InvalidTag { what: &'static str, tag: u8 },
    #[error("invalid utf-8 string")]
    InvalidUtf8,
    #[error("length {0} does not fit in memory")]
    LengthOverflow(u64),
    #[error("{0} trailing bytes after the end of the value")]
    TrailingBytes(usize),
}

/// Errors raised by the message passing layer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommError {
    #[error("rank {rank} is not part of a communicator of size {size}")]
    InvalidRank { rank: usize, size: usize },
    #[error("the peer disconnected")]
    Disconnected,
    #[error("the request was cancelled")]
    Cancelled,
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// The errors that can abort a search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("illegal transition from {from} to {to}")]
    InvalidTransition { from: AlgoState, to: AlgoState },
    #[error("cannot expand nodes while in state {0}")]
    NotRunning(AlgoState),
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error(transparent)]
    Comm(#[from] CommError),
    #[error("a worker thread panicked")]
    WorkerPanicked,
    #[error("rank {0} aborted the search")]
    RemoteFailure(usize),
}


// ############################################################################
// #### TESTS #################################################################
// ############################################################################
