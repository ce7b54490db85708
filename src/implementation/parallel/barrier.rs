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

//! This module provides the barrier which separates the phases of the
//! partitioned engine.

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct Generation {
    /// the number of parties which reached the barrier in this generation
    arrived: usize,
    /// incremented each time the barrier opens
    id: u64,
}

/// A reusable barrier for a fixed number of parties. The last party reaching
/// the barrier is its leader: it is the only one for which `wait` returns
/// true. The leader is expected to perform the work which must happen while
/// all the other parties are quiescent.
#[derive(Debug)]
pub struct PhaseBarrier {
    parties: usize,
    generation: Mutex<Generation>,
    monitor: Condvar,
}
impl PhaseBarrier {
    pub fn new(parties: usize) -> Self {
        PhaseBarrier { parties: parties.max(1), generation: Mutex::new(Generation::default()), monitor: Condvar::new() }
    }
    pub fn parties(&self) -> usize {
        self.parties
    }
    /// Blocks until all the parties have reached the barrier. Returns true
    /// iff the caller is the leader of this generation.
    pub fn wait(&self) -> bool {
        let mut current = self.generation.lock();
        current.arrived += 1;
        if current.arrived == self.parties {
            current.arrived = 0;
            current.id += 1;
            self.monitor.notify_all();
            log::debug!("phase barrier {} opened", current.id);
            true
        } else {
            let id = current.id;
            while current.id == id {
                self.monitor.wait(&mut current);
            }
            false
        }
    }
}
