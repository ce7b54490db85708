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

//! This module provides some utilities to write unit tests, the most notable
//! of which is a toy 0/1 knapsack problem which can be solved by all engines.
#![cfg(test)]

use std::io::{Read, Write};

use crate::*;

/// The state of a partial knapsack: the next item to decide upon along with
/// the weight and profit accumulated so far.
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

/// A 0/1 knapsack instance (maximization). The bound of a node is the profit
/// it already has plus the profit of all the items it may still take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Knapsack {
    pub capacity: u32,
    pub weights: Vec<u32>,
    pub profits: Vec<u32>,
}
impl Knapsack {
    pub fn small() -> Self {
        Knapsack { capacity: 5, weights: vec![2, 3, 4, 5], profits: vec![3, 4, 5, 6] }
    }
    pub fn medium() -> Self {
        Knapsack {
            capacity: 50,
            weights: vec![12, 7, 11, 8, 9, 6, 14, 5, 10, 13, 4, 9],
            profits: vec![24, 13, 23, 15, 16, 11, 28, 8, 19, 25, 6, 17],
        }
    }
    /// The optimum computed by a straightforward dynamic program
    pub fn optimum(&self) -> u32 {
        let mut best = vec![0_u32; self.capacity as usize + 1];
        for (w, p) in self.weights.iter().zip(self.profits.iter()) {
            for cap in (*w as usize..=self.capacity as usize).rev() {
                best[cap] = best[cap].max(best[cap - *w as usize] + p);
            }
        }
        best[self.capacity as usize]
    }
    fn bound(&self, sack: &Sack) -> f64 {
        let rest: u32 = self.profits[sack.item..].iter().sum();
        (sack.profit + rest) as f64
    }
}
impl Instance for Knapsack {
    type Payload = Sack;

    fn roots(&self, ids: &NodeIds) -> Vec<Node<Sack>> {
        let sack = Sack { item: 0, weight: 0, profit: 0 };
        vec![Node::root(ids.next_id(), Some(self.bound(&sack)), sack)]
    }
}
impl GenChild for Knapsack {
    type Payload = Sack;

    fn expand(&self, node: &Node<Sack>, children: &mut Children<'_, Sack>) -> Result<(), ExpansionError> {
        let sack = *node.payload();
        let i = sack.item;
        let skip = Sack { item: i + 1, ..sack };
        let take = Sack { item: i + 1, weight: sack.weight + self.weights[i], profit: sack.profit + self.profits[i] };

        for next in [take, skip] {
            if next.weight > self.capacity {
                continue;
            }
            if next.item == self.weights.len() {
                children.solution(next.profit as f64, next);
            } else {
                let bound = self.bound(&next);
                if children.can_improve(bound) {
                    children.problem(Some(bound), next);
                }
            }
        }
        Ok(())
    }
}
impl Pack for Knapsack {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.u32(self.capacity)?;
        self.weights.pack(packer)?;
        self.profits.pack(packer)
    }
}
impl Unpack for Knapsack {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Knapsack { capacity: unpacker.u32()?, weights: unpacker.value()?, profits: unpacker.value()? })
    }
}

/// A branching rule which fails when it meets a node at the given depth
#[derive(Debug, Clone)]
pub struct FailAt(pub Knapsack, pub usize);
impl GenChild for FailAt {
    type Payload = Sack;

    fn expand(&self, node: &Node<Sack>, children: &mut Children<'_, Sack>) -> Result<(), ExpansionError> {
        if node.depth() == self.1 {
            Err(ExpansionError(format!("cannot expand {:?}", node.id())))
        } else {
            self.0.expand(node, children)
        }
    }
}

/// A branching rule which panics when it meets a node at the given depth
#[derive(Debug, Clone)]
pub struct PanicAt(pub Knapsack, pub usize);
impl GenChild for PanicAt {
    type Payload = Sack;

    fn expand(&self, node: &Node<Sack>, children: &mut Children<'_, Sack>) -> Result<(), ExpansionError> {
        if node.depth() == self.1 {
            panic!("cannot expand {:?}", node.id());
        }
        self.0.expand(node, children)
    }
}

/// A branching rule which takes its time to expand each node
#[derive(Debug, Clone)]
pub struct Sluggish(pub Knapsack, pub std::time::Duration);
impl GenChild for Sluggish {
    type Payload = Sack;

    fn expand(&self, node: &Node<Sack>, children: &mut Children<'_, Sack>) -> Result<(), ExpansionError> {
        std::thread::sleep(self.1);
        self.0.expand(node, children)
    }
}

/// A configuration suited to the tests: maximization on two threads
pub fn config(queue: QueueKind) -> SearchConfig {
    SearchConfigBuilder::default()
        .direction(Direction::Maximize)
        .nb_threads(2_usize)
        .queue(queue)
        .phase_budget(4_usize)
        .build()
        .unwrap()
}
