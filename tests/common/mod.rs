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

//! The problems solved by the integration tests.
#![allow(dead_code)]

use std::io::{Read, Write};

use parsearch::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

pub fn config(direction: Direction, nb_threads: usize, queue: QueueKind) -> SearchConfig {
    SearchConfigBuilder::default()
        .direction(direction)
        .nb_threads(nb_threads)
        .queue(queue)
        .phase_budget(16_usize)
        .build()
        .unwrap()
}

// ----------------------------------------------------------------------------
// --- KNAPSACK ---------------------------------------------------------------
// ----------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sack {
    pub item: usize,
    pub weight: u32,
    pub profit: u32,
}
impl Pack for Sack {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.usize(self.item)?;
        packer.u32(self.weight)?;
        packer.u32(self.profit)
    }
}
impl Unpack for Sack {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Sack { item: unpacker.usize()?, weight: unpacker.u32()?, profit: unpacker.u32()? })
    }
}

/// A 0/1 knapsack (maximization). The items are decided upon by decreasing
/// profit/weight ratio so that the bound of a node is the fractional
/// relaxation of what remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Knapsack {
    pub capacity: u32,
    /// (weight, profit) sorted by decreasing ratio
    pub items: Vec<(u32, u32)>,
}
impl Knapsack {
    pub fn new(capacity: u32, weights: &[u32], profits: &[u32]) -> Self {
        let mut items: Vec<(u32, u32)> = weights.iter().copied().zip(profits.iter().copied()).collect();
        items.sort_by(|a, b| (b.1 as u64 * a.0 as u64).cmp(&(a.1 as u64 * b.0 as u64)));
        Knapsack { capacity, items }
    }
    pub fn random(seed: u64, n: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let weights: Vec<u32> = (0..n).map(|_| rng.gen_range(5..=40_u32)).collect();
        let profits: Vec<u32> = weights.iter().map(|w| w + rng.gen_range(0..=20_u32)).collect();
        let capacity = weights.iter().sum::<u32>() / 2;
        Self::new(capacity, &weights, &profits)
    }
    pub fn optimum(&self) -> u32 {
        let mut best = vec![0_u32; self.capacity as usize + 1];
        for (w, p) in self.items.iter() {
            for cap in (*w as usize..=self.capacity as usize).rev() {
                best[cap] = best[cap].max(best[cap - *w as usize] + p);
            }
        }
        best[self.capacity as usize]
    }
    fn bound(&self, sack: &Sack) -> f64 {
        let mut room = self.capacity - sack.weight;
        let mut bound = sack.profit as f64;
        for (w, p) in self.items[sack.item..].iter() {
            if *w <= room {
                room -= w;
                bound += *p as f64;
            } else {
                bound += *p as f64 * room as f64 / *w as f64;
                break;
            }
        }
        bound
    }
}
impl Instance for Knapsack {
    type Payload = Sack;
    fn roots(&self, ids: &NodeIds) -> Vec<Node<Sack>> {
        let root = Sack { item: 0, weight: 0, profit: 0 };
        vec![Node::root(ids.next_id(), Some(self.bound(&root)), root)]
    }
}
impl GenChild for Knapsack {
    type Payload = Sack;
    fn expand(&self, node: &Node<Sack>, children: &mut Children<'_, Sack>) -> Result<(), ExpansionError> {
        let sack = *node.payload();
        if sack.item == self.items.len() {
            children.solution(sack.profit as f64, sack);
            return Ok(());
        }
        let (w, p) = self.items[sack.item];
        let skip = Sack { item: sack.item + 1, ..sack };
        let take = Sack { item: sack.item + 1, weight: sack.weight + w, profit: sack.profit + p };
        for child in [take, skip] {
            if child.weight <= self.capacity {
                let bound = self.bound(&child);
                if children.can_improve(bound) {
                    children.problem(Some(bound), child);
                }
            }
        }
        Ok(())
    }
}
impl Pack for Knapsack {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.u32(self.capacity)?;
        packer.value(&self.items)
    }
}
impl Unpack for Knapsack {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Knapsack { capacity: unpacker.u32()?, items: unpacker.seq()? })
    }
}

// ----------------------------------------------------------------------------
// --- N QUEENS ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// Places `n` queens row by row on an n x n board. Each placement is a
/// solution (of cost 0): this problem is used to count solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queens(pub usize);

impl Queens {
    pub fn is_valid(columns: &[usize]) -> bool {
        for (r1, c1) in columns.iter().enumerate() {
            for (r2, c2) in columns.iter().enumerate().skip(r1 + 1) {
                if c1 == c2 || r2 - r1 == c1.abs_diff(*c2) {
                    return false;
                }
            }
        }
        true
    }
}
impl Pack for Queens {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.usize(self.0)
    }
}
impl Unpack for Queens {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Queens(unpacker.usize()?))
    }
}
impl Instance for Queens {
    type Payload = Vec<usize>;
    fn roots(&self, ids: &NodeIds) -> Vec<Node<Vec<usize>>> {
        vec![Node::root(ids.next_id(), None, vec![])]
    }
}
impl GenChild for Queens {
    type Payload = Vec<usize>;
    fn expand(&self, node: &Node<Vec<usize>>, children: &mut Children<'_, Vec<usize>>) -> Result<(), ExpansionError> {
        let placed = node.payload();
        if placed.len() == self.0 {
            children.solution(0.0, placed.clone());
            return Ok(());
        }
        for col in 0..self.0 {
            let mut next = placed.clone();
            next.push(col);
            if Queens::is_valid(&next) {
                children.problem(None, next);
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- TSP --------------------------------------------------------------------
// ----------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub path: Vec<usize>,
    pub cost: f64,
}
impl Pack for Tour {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.value(&self.path)?;
        packer.f64(self.cost)
    }
}
impl Unpack for Tour {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Tour { path: unpacker.seq()?, cost: unpacker.f64()? })
    }
}

/// A symmetric travelling salesman problem (minimization) starting and
/// ending in city 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Tsp {
    pub dist: Vec<Vec<f64>>,
    /// the cheapest edge leaving each city
    min_out: Vec<f64>,
}
impl Tsp {
    pub fn random(seed: u64, n: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let coords: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen_range(0..=100_u32) as f64, rng.gen_range(0..=100_u32) as f64)).collect();
        let dist = coords.iter()
            .map(|a| coords.iter().map(|b| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt().round()).collect())
            .collect();
        Self::new(dist)
    }
    pub fn new(dist: Vec<Vec<f64>>) -> Self {
        let n = dist.len();
        let min_out = (0..n)
            .map(|i| (0..n).filter(|j| *j != i).map(|j| dist[i][j]).fold(f64::INFINITY, f64::min))
            .collect();
        Tsp { dist, min_out }
    }
    pub fn len(&self) -> usize {
        self.dist.len()
    }
    fn tour_cost(&self, order: &[usize]) -> f64 {
        let mut cost = 0.0;
        let mut at = 0;
        for next in order.iter().copied() {
            cost += self.dist[at][next];
            at = next;
        }
        cost + self.dist[at][0]
    }
    /// The optimum, found by enumerating all the tours
    pub fn brute_force(&self) -> f64 {
        let mut rest: Vec<usize> = (1..self.len()).collect();
        let mut best = f64::INFINITY;
        permutations(&mut rest, 0, &mut |order| best = best.min(self.tour_cost(order)));
        best
    }
    fn bound(&self, tour: &Tour) -> f64 {
        let last = tour.path.last().copied().unwrap_or(0);
        let unvisited: f64 = (1..self.len()).filter(|c| !tour.path.contains(c)).map(|c| self.min_out[c]).sum();
        tour.cost + self.min_out[last] + unvisited
    }
}
fn permutations(items: &mut Vec<usize>, k: usize, f: &mut dyn FnMut(&[usize])) {
    if k == items.len() {
        f(items);
        return;
    }
    for i in k..items.len() {
        items.swap(k, i);
        permutations(items, k + 1, f);
        items.swap(k, i);
    }
}
impl Instance for Tsp {
    type Payload = Tour;
    fn roots(&self, ids: &NodeIds) -> Vec<Node<Tour>> {
        let tour = Tour { path: vec![0], cost: 0.0 };
        vec![Node::root(ids.next_id(), Some(self.bound(&tour)), tour)]
    }
}
impl GenChild for Tsp {
    type Payload = Tour;
    fn expand(&self, node: &Node<Tour>, children: &mut Children<'_, Tour>) -> Result<(), ExpansionError> {
        let tour = node.payload();
        let last = tour.path.last().copied().unwrap_or(0);
        if tour.path.len() == self.len() {
            let cost = tour.cost + self.dist[last][0];
            children.solution(cost, Tour { path: tour.path.clone(), cost });
            return Ok(());
        }
        for city in (1..self.len()).filter(|c| !tour.path.contains(c)) {
            let mut path = tour.path.clone();
            path.push(city);
            let child = Tour { path, cost: tour.cost + self.dist[last][city] };
            let bound = self.bound(&child);
            if children.can_improve(bound) {
                children.problem(Some(bound), child);
            }
        }
        Ok(())
    }
}
