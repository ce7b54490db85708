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

fn sequential<O: Priority<Tour>>(tsp: &Tsp, priority: O) -> Completion {
    let ctx = SearchContext::new(config(Direction::Minimize, 1, QueueKind::BinaryHeap));
    let mut algo = Algorithm::new(ctx, Arc::new(tsp.clone()), AnyQueue::new(QueueKind::BinaryHeap, priority),
        BestSolutionGoal::new(Direction::Minimize));
    algo.to_init(&mut tsp.clone(), true).unwrap();
    algo.run().unwrap()
}

#[test]
fn a_square_is_its_own_best_tour() {
    let dist = vec![
        vec![0.0, 1.0, 2.0, 1.0],
        vec![1.0, 0.0, 1.0, 2.0],
        vec![2.0, 1.0, 0.0, 1.0],
        vec![1.0, 2.0, 1.0, 0.0],
    ];
    let tsp = Tsp::new(dist);
    assert_eq!(Some(4.0), sequential(&tsp, BestFirst(Direction::Minimize)).best_cost);
}

#[test]
fn best_first_matches_the_brute_force() {
    for seed in 1..=3 {
        let tsp = Tsp::random(seed, 8);
        assert_eq!(Some(tsp.brute_force()), sequential(&tsp, BestFirst(Direction::Minimize)).best_cost);
    }
}

#[test]
fn the_hybrid_priority_matches_the_brute_force() {
    let tsp = Tsp::random(42, 8);
    let expected = Some(tsp.brute_force());
    for threshold in [0, 3, 6, 10] {
        let outcome = sequential(&tsp, BestThenDepth::new(Direction::Minimize, threshold));
        assert_eq!(expected, outcome.best_cost, "threshold {}", threshold);
    }
    assert_eq!(expected, sequential(&tsp, DepthE(Direction::Minimize)).best_cost);
}

#[test]
fn all_engines_agree() {
    let tsp = Tsp::random(9, 8);
    let expected = Some(tsp.brute_force());
    let dir = Direction::Minimize;

    let cfg = config(dir, 3, QueueKind::BinaryHeap);
    let mut shared = SharedSearch::new(SearchContext::new(cfg.clone()), Arc::new(tsp.clone()),
        BestE(dir), BestSolutionGoal::new(dir));
    shared.initialize(&mut tsp.clone(), true).unwrap();
    assert_eq!(expected, shared.run().unwrap().best_cost);

    let mut partitioned = PartitionedSearch::new(SearchContext::new(cfg), Arc::new(tsp.clone()),
        BestE(dir), BestSolutionGoal::new(dir));
    partitioned.initialize(&mut tsp.clone(), true).unwrap();
    assert_eq!(expected, partitioned.run().unwrap().best_cost);
}

#[test]
fn the_best_tour_visits_every_city_once() {
    let tsp = Tsp::random(3, 7);
    let ctx = SearchContext::new(config(Direction::Minimize, 1, QueueKind::SkewHeap));
    let mut algo = Algorithm::new(ctx, Arc::new(tsp.clone()),
        AnyQueue::new(QueueKind::SkewHeap, BestFirst(Direction::Minimize)), BestSolutionGoal::new(Direction::Minimize));
    algo.to_init(&mut tsp.clone(), true).unwrap();
    algo.run().unwrap();

    let best = algo.goal().best().unwrap();
    let mut path = best.payload().path.clone();
    path.sort_unstable();
    assert_eq!((0..7).collect::<Vec<_>>(), path);
    assert_eq!(best.eval(), Some(best.payload().cost));
}
