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

//! The messages exchanged by the ranks of a distributed search at each round
//! and the load balancing plan they derive from them.

use std::io::{Read, Write};

use crate::{Pack, PackError, Packer, Topology, Unpack, Unpacker};

/// What each rank tells all the others at the end of its local phase. It
/// travels as a `MessageKind::Control` message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub round: u64,
    /// number of nodes in the local queue(s)
    pub load: usize,
    pub stopped: bool,
    pub failed: bool,
    /// true iff the rank is going to send its goal during this round
    pub goal_updated: bool,
}

impl Pack for Status {
    fn pack<W: Write>(&self, packer: &mut Packer<W>) -> Result<(), PackError> {
        packer.u64(self.round)?;
        packer.usize(self.load)?;
        packer.bool(self.stopped)?;
        packer.bool(self.failed)?;
        packer.bool(self.goal_updated)
    }
}
impl Unpack for Status {
    fn unpack<R: Read>(unpacker: &mut Unpacker<R>) -> Result<Self, PackError> {
        Ok(Status {
            round: unpacker.u64()?,
            load: unpacker.usize()?,
            stopped: unpacker.bool()?,
            failed: unpacker.bool()?,
            goal_updated: unpacker.bool()?,
        })
    }
}

/// A migration of `count` nodes from rank `from` to rank `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: usize,
    pub to: usize,
    pub count: usize,
}

/// Computes the transfers of a balancing round. The plan only depends on the
/// statuses (which every rank knows) so that all the ranks agree on it
/// without further communication.
///
/// Only idle ranks receive nodes, and only from ranks holding at least
/// `threshold` nodes. A donor gives away half of its nodes (at least one).
/// In a ring, an idle rank may only receive from its predecessor; otherwise
/// the most loaded donors are paired with the idle ranks in rank order.
pub fn balance_plan(topology: Topology, statuses: &[Status], threshold: usize) -> Vec<Transfer> {
    let size = statuses.len();
    let threshold = threshold.max(1);
    let share = |load: usize| (load / 2).max(1);

    match topology {
        Topology::Ring => (0..size)
            .filter(|to| size > 1 && statuses[*to].load == 0)
            .filter_map(|to| {
                let from = (to + size - 1) % size;
                let load = statuses[from].load;
                (load >= threshold).then(|| Transfer { from, to, count: share(load) })
            })
            .collect(),
        Topology::AllToAll => {
            let idle = (0..size).filter(|r| statuses[*r].load == 0);
            let mut donors: Vec<usize> = (0..size).filter(|r| statuses[*r].load >= threshold).collect();
            donors.sort_by(|a, b| statuses[*b].load.cmp(&statuses[*a].load).then(a.cmp(b)));
            idle.zip(donors)
                .map(|(to, from)| Transfer { from, to, count: share(statuses[from].load) })
                .collect()
        }
    }
}

#[cfg(test)]
mod test_protocol {
    use crate::*;

    fn loads(loads: &[usize]) -> Vec<Status> {
        loads.iter().map(|l| Status { load: *l, ..Status::default() }).collect()
    }

    #[test]
    fn status_fits_in_a_control_message() {
        let status = Status { round: 12, load: 345, stopped: false, failed: true, goal_updated: true };
        let bytes = MessageBuffer::of(&status).unwrap().into_bytes();
        assert_eq!(8 + 8 + 3, bytes.len());
        assert_eq!(status, MessageBuffer::from_bytes(bytes).value::<Status>().unwrap());
    }

    #[test]
    fn nothing_moves_when_nobody_is_idle() {
        assert!(balance_plan(Topology::AllToAll, &loads(&[3, 1, 8]), 2).is_empty());
        assert!(balance_plan(Topology::Ring, &loads(&[3, 1, 8]), 2).is_empty());
    }

    #[test]
    fn the_richest_donate_first() {
        let plan = balance_plan(Topology::AllToAll, &loads(&[0, 4, 0, 10, 1]), 2);
        assert_eq!(vec![
            Transfer { from: 3, to: 0, count: 5 },
            Transfer { from: 1, to: 2, count: 2 },
        ], plan);
    }

    #[test]
    fn donors_below_the_threshold_keep_their_nodes() {
        assert!(balance_plan(Topology::AllToAll, &loads(&[0, 1, 1]), 2).is_empty());
        let plan = balance_plan(Topology::AllToAll, &loads(&[0, 1]), 1);
        assert_eq!(vec![Transfer { from: 1, to: 0, count: 1 }], plan);
    }

    #[test]
    fn a_ring_only_feeds_the_successor() {
        let plan = balance_plan(Topology::Ring, &loads(&[0, 6, 0, 0]), 2);
        assert_eq!(vec![Transfer { from: 1, to: 2, count: 3 }], plan);
        let plan = balance_plan(Topology::Ring, &loads(&[0, 0, 0, 9]), 2);
        assert_eq!(vec![Transfer { from: 3, to: 0, count: 4 }], plan);
    }

    #[test]
    fn a_lonely_rank_never_transfers() {
        assert!(balance_plan(Topology::Ring, &loads(&[0]), 1).is_empty());
        assert!(balance_plan(Topology::AllToAll, &loads(&[0]), 1).is_empty());
    }
}
