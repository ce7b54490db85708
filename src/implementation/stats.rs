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

//! This module provides the statistics sinks.

use std::{sync::atomic::{AtomicU64, Ordering}, time::{Duration, Instant}};

use parking_lot::Mutex;

use crate::StatSink;

/// A point in time view of the counters and timers of a `Statistics` sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub created: u64,
    pub pruned: u64,
    pub explored: u64,
    /// cumulated time spent running algorithms
    pub running: Duration,
    /// cumulated time spent in node expansions
    pub evaluating: Duration,
}

#[derive(Debug, Default)]
struct Timer {
    started: Option<Instant>,
    active: usize,
    total: Duration,
}

/// The default statistics sink: lock free counters and cumulated timers.
#[derive(Debug, Default)]
pub struct Statistics {
    created: AtomicU64,
    pruned: AtomicU64,
    explored: AtomicU64,
    algorithm: Mutex<Timer>,
    evaluating: AtomicU64,
}
impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn snapshot(&self) -> StatsSnapshot {
        let algo = self.algorithm.lock();
        let running = algo.total + algo.started.map(|s| s.elapsed()).unwrap_or_default();
        StatsSnapshot {
            created: self.created.load(Ordering::Relaxed),
            pruned: self.pruned.load(Ordering::Relaxed),
            explored: self.explored.load(Ordering::Relaxed),
            running,
            evaluating: Duration::from_nanos(self.evaluating.load(Ordering::Relaxed)),
        }
    }
}
impl StatSink for Statistics {
    fn created(&self, n: usize) {
        self.created.fetch_add(n as u64, Ordering::Relaxed);
    }
    fn pruned(&self, n: usize) {
        self.pruned.fetch_add(n as u64, Ordering::Relaxed);
    }
    fn explored(&self, n: usize) {
        self.explored.fetch_add(n as u64, Ordering::Relaxed);
    }
    /// Several algorithms may run at once (one per worker): the timer runs
    /// from the first start until the last end.
    fn start_algorithm(&self) {
        let mut timer = self.algorithm.lock();
        if timer.active == 0 {
            timer.started = Some(Instant::now());
        }
        timer.active += 1;
    }
    fn end_algorithm(&self) {
        let mut timer = self.algorithm.lock();
        if timer.active == 0 {
            return;
        }
        timer.active -= 1;
        if timer.active == 0 {
            if let Some(started) = timer.started.take() {
                timer.total += started.elapsed();
            }
        }
    }
    fn evaluation(&self, elapsed: Duration) {
        self.evaluating.fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }
}

/// A sink which ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatistics;
impl StatSink for NoStatistics {
    fn created(&self, _: usize) {}
    fn pruned(&self, _: usize) {}
    fn explored(&self, _: usize) {}
    fn start_algorithm(&self) {}
    fn end_algorithm(&self) {}
    fn evaluation(&self, _: Duration) {}
}

#[cfg(test)]
mod test_statistics {
    use std::time::Duration;

    use crate::*;

    #[test]
    fn counters_start_at_zero() {
        assert_eq!(StatsSnapshot::default(), Statistics::new().snapshot());
    }
    #[test]
    fn counters_accumulate() {
        let stats = Statistics::new();
        stats.created(3);
        stats.created(2);
        stats.pruned(1);
        stats.explored(4);
        stats.evaluation(Duration::from_nanos(10));
        stats.evaluation(Duration::from_nanos(5));
        let snap = stats.snapshot();
        assert_eq!(5, snap.created);
        assert_eq!(1, snap.pruned);
        assert_eq!(4, snap.explored);
        assert_eq!(Duration::from_nanos(15), snap.evaluating);
    }
    #[test]
    fn unbalanced_end_is_ignored() {
        let stats = Statistics::new();
        stats.end_algorithm();
        stats.start_algorithm();
        stats.start_algorithm();
        stats.end_algorithm();
        stats.end_algorithm();
        stats.end_algorithm();
        assert!(stats.snapshot().running >= Duration::ZERO);
    }
}
