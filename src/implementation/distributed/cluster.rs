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

//! An in-process realization of the `Communicator` trait. Each rank of a
//! `LocalCluster` is a thread owning an `Endpoint`; the endpoints exchange
//! their messages over crossbeam channels.

use std::collections::VecDeque;

use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};

use crate::{CommError, Communicator, Envelope, MessageKind, Probe, RecvRequest};

/// The endpoint of one rank of a `LocalCluster`.
///
/// Messages which arrive while the rank is waiting for some other message
/// are parked in a mailbox until they are asked for. Because the mailbox is
/// scanned in arrival order, two messages from the same source are always
/// received in the order in which they were sent.
pub struct Endpoint {
    rank: usize,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    mailbox: VecDeque<Envelope>,
}

fn matches(env: &Envelope, source: Option<usize>, kind: Option<MessageKind>) -> bool {
    source.map_or(true, |s| s == env.source) && kind.map_or(true, |k| k == env.kind)
}

impl Endpoint {
    /// Removes the first parked message matching the criteria
    fn take_parked(&mut self, source: Option<usize>, kind: MessageKind) -> Option<Envelope> {
        let pos = self.mailbox.iter().position(|e| matches(e, source, Some(kind)))?;
        self.mailbox.remove(pos)
    }
    /// Moves everything that has already arrived into the mailbox
    fn drain(&mut self) -> Result<(), CommError> {
        loop {
            match self.inbox.try_recv() {
                Ok(env) => self.mailbox.push_back(env),
                Err(TryRecvError::Empty) => return Ok(()),
                Err(TryRecvError::Disconnected) => return Err(CommError::Disconnected),
            }
        }
    }
    fn check_rank(&self, rank: usize) -> Result<(), CommError> {
        if rank < self.peers.len() {
            Ok(())
        } else {
            Err(CommError::InvalidRank { rank, size: self.peers.len() })
        }
    }
    fn check_pending(request: &RecvRequest) -> Result<(), CommError> {
        if request.cancelled {
            Err(CommError::Cancelled)
        } else if request.done {
            Err(CommError::Protocol("the request has already completed".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Communicator for Endpoint {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.peers.len()
    }

    fn send(&self, dest: usize, kind: MessageKind, payload: Vec<u8>) -> Result<(), CommError> {
        self.check_rank(dest)?;
        log::trace!("rank {} sends {} bytes of {:?} to {}", self.rank, payload.len(), kind, dest);
        self.peers[dest]
            .send(Envelope { source: self.rank, kind, payload })
            .map_err(|_| CommError::Disconnected)
    }

    fn recv(&mut self, source: Option<usize>, kind: MessageKind) -> Result<Envelope, CommError> {
        if let Some(src) = source {
            self.check_rank(src)?;
        }
        if let Some(env) = self.take_parked(source, kind) {
            return Ok(env);
        }
        loop {
            let env = self.inbox.recv().map_err(|_| CommError::Disconnected)?;
            if matches(&env, source, Some(kind)) {
                return Ok(env);
            }
            self.mailbox.push_back(env);
        }
    }

    fn probe(&mut self, source: Option<usize>, kind: Option<MessageKind>) -> Result<Option<Probe>, CommError> {
        self.drain()?;
        Ok(self.mailbox.iter()
            .find(|e| matches(e, source, kind))
            .map(|e| Probe { source: e.source, kind: e.kind, len: e.payload.len() }))
    }

    fn test(&mut self, request: &mut RecvRequest) -> Result<Option<Envelope>, CommError> {
        Self::check_pending(request)?;
        self.drain()?;
        let found = self.take_parked(request.source, request.kind);
        request.done = found.is_some();
        Ok(found)
    }

    fn wait(&mut self, request: &mut RecvRequest) -> Result<Envelope, CommError> {
        Self::check_pending(request)?;
        let env = self.recv(request.source, request.kind)?;
        request.done = true;
        Ok(env)
    }
}

/// A group of ranks living in the same process.
///
/// # Example
/// ```
/// # use parsearch::*;
/// let ranks = LocalCluster::run(3, |mut endpoint| {
///     let next = (endpoint.rank() + 1) % endpoint.size();
///     endpoint.send(next, MessageKind::Control, vec![endpoint.rank() as u8]).unwrap();
///     endpoint.recv(None, MessageKind::Control).unwrap().payload[0]
/// });
/// assert_eq!(vec![2, 0, 1], ranks);
/// ```
pub struct LocalCluster;

impl LocalCluster {
    /// Creates the endpoints of a group of `size` ranks
    pub fn endpoints(size: usize) -> Vec<Endpoint> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..size).map(|_| unbounded::<Envelope>()).unzip();
        receivers.into_iter()
            .enumerate()
            .map(|(rank, inbox)| Endpoint { rank, peers: senders.clone(), inbox, mailbox: VecDeque::new() })
            .collect()
    }

    /// Runs `f` on each rank of a group of `size` ranks (one thread per rank)
    /// and returns the results ordered by rank. A panic in any of the ranks
    /// is propagated to the caller.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(Endpoint) -> R + Sync,
        R: Send,
    {
        let endpoints = Self::endpoints(size);
        std::thread::scope(|s| {
            let handles: Vec<_> = endpoints.into_iter()
                .map(|endpoint| {
                    let f = &f;
                    s.spawn(move || f(endpoint))
                })
                .collect();
            handles.into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }
}
