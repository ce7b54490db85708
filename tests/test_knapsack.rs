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

use std::sync::Arc;

use parsearch::*;

mod common;
use common::*;

fn sequential<O: Priority<Sack>>(ks: &Knapsack, queue: QueueKind, priority: O) -> Completion {
    let ctx = SearchContext::new(config(Direction::Maximize, 1, queue));
    let mut algo = Algorithm::new(ctx, Arc::new(ks.clone()), AnyQueue::new(queue, priority),
        BestSolutionGoal::new(Direction::Maximize));
    algo.to_init(&mut ks.clone(), true).unwrap();
    algo.run().unwrap()
}

fn shared(ks: &Knapsack, threads: usize) -> Completion {
    let cfg = config(Direction::Maximize, threads, QueueKind::BinaryHeap);
    let mut search = SharedSearch::new(SearchContext::new(cfg), Arc::new(ks.clone()),
        BestFirst(Direction::Maximize), BestSolutionGoal::new(Direction::Maximize));
    search.initialize(&mut ks.clone(), true).unwrap();
    search.run().unwrap()
}

fn partitioned(ks: &Knapsack, threads: usize) -> Completion {
    let cfg = config(Direction::Maximize, threads, QueueKind::DualIndex);
    let mut search = PartitionedSearch::new(SearchContext::new(cfg), Arc::new(ks.clone()),
        BestD(Direction::Maximize), BestSolutionGoal::new(Direction::Maximize));
    search.initialize(&mut ks.clone(), true).unwrap();
    search.run().unwrap()
}

fn optimum(ks: &Knapsack) -> Option<f64> {
    Some(ks.optimum() as f64)
}

#[test]
fn textbook_instance() {
    let ks = Knapsack::new(15, &[12, 2, 1, 1, 4], &[4, 2, 1, 2, 10]);
    assert_eq!(15, ks.optimum());
    assert_eq!(optimum(&ks), sequential(&ks, QueueKind::BinaryHeap, BestFirst(Direction::Maximize)).best_cost);
}

#[test]
fn nothing_fits() {
    let ks = Knapsack::new(3, &[4, 5, 6], &[10, 10, 10]);
    let outcome = sequential(&ks, QueueKind::BinaryHeap, BestFirst(Direction::Maximize));
    assert!(outcome.is_exhausted);
    assert_eq!(Some(0.0), outcome.best_cost);
}

#[test]
fn every_queue_agrees() {
    let ks = Knapsack::random(7, 25);
    for queue in [QueueKind::BinaryHeap, QueueKind::SkewHeap, QueueKind::OrderedList, QueueKind::DualIndex] {
        let outcome = sequential(&ks, queue, BestFirst(Direction::Maximize));
        assert!(outcome.is_exhausted);
        assert_eq!(optimum(&ks), outcome.best_cost, "{:?}", queue);
    }
}

#[test]
fn every_priority_agrees() {
    let ks = Knapsack::random(11, 20);
    let dir = Direction::Maximize;
    let expected = optimum(&ks);
    assert_eq!(expected, sequential(&ks, QueueKind::BinaryHeap, DepthFirst).best_cost);
    assert_eq!(expected, sequential(&ks, QueueKind::BinaryHeap, BreadthFirst).best_cost);
    assert_eq!(expected, sequential(&ks, QueueKind::BinaryHeap, BestD(dir)).best_cost);
    assert_eq!(expected, sequential(&ks, QueueKind::BinaryHeap, BestE(dir)).best_cost);
    assert_eq!(expected, sequential(&ks, QueueKind::BinaryHeap, DepthE(dir)).best_cost);
    assert_eq!(expected, sequential(&ks, QueueKind::BinaryHeap, BreadthE(dir)).best_cost);
    assert_eq!(expected, sequential(&ks, QueueKind::SkewHeap, BestThenDepth::new(dir, 8)).best_cost);
}

#[test]
fn shared_search_finds_the_optimum() {
    for seed in 1..=3 {
        let ks = Knapsack::random(seed, 30);
        assert_eq!(optimum(&ks), shared(&ks, 4).best_cost, "seed {}", seed);
    }
}

#[test]
fn partitioned_search_finds_the_optimum() {
    for seed in 1..=3 {
        let ks = Knapsack::random(seed, 30);
        assert_eq!(optimum(&ks), partitioned(&ks, 4).best_cost, "seed {}", seed);
    }
}

#[test]
fn the_statistics_add_up() {
    let ks = Knapsack::random(5, 20);
    let stats = Arc::new(Statistics::new());
    let ctx = SearchContext::new(config(Direction::Maximize, 1, QueueKind::BinaryHeap)).with_stats(stats.clone());
    let mut algo = Algorithm::new(ctx, Arc::new(ks.clone()),
        AnyQueue::new(QueueKind::BinaryHeap, BestFirst(Direction::Maximize)), BestSolutionGoal::new(Direction::Maximize));
    algo.to_init(&mut ks.clone(), true).unwrap();
    algo.run().unwrap();

    let snapshot = stats.snapshot();
    assert_eq!(algo.explored(), snapshot.explored);
    // every node is created once and then explored or pruned (or both when
    // the incumbent improved while it was waiting in the queue)
    assert!(snapshot.explored <= snapshot.created);
    assert!(snapshot.created <= snapshot.explored + snapshot.pruned);
}
