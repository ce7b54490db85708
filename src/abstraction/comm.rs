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

//! This module defines the message passing abstraction used to distribute a
//! search over several processes.

use crate::CommError;

/// The kind of a message. Each message is tagged with its kind so that the
/// receiver can match the messages it is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// A bunch of nodes migrating from one process to another
    WorkUnit,
    /// The state of a goal
    Goal,
    /// Control information (load, termination)
    Control,
}

/// A message as it travels between two processes: an opaque packed buffer
/// tagged with its kind and source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub source: usize,
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

/// The information one gets when probing for a message without receiving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub source: usize,
    pub kind: MessageKind,
    /// the length (in bytes) of the message payload
    pub len: usize,
}

/// A pending non-blocking receive. It must be completed through the `test`,
/// `wait` or `cancel` methods of the communicator which created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecvRequest {
    pub(crate) source: Option<usize>,
    pub(crate) kind: MessageKind,
    pub(crate) done: bool,
    pub(crate) cancelled: bool,
}
impl RecvRequest {
    pub fn new(source: Option<usize>, kind: MessageKind) -> Self {
        RecvRequest { source, kind, done: false, cancelled: false }
    }
    pub fn is_done(&self) -> bool {
        self.done
    }
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// A pending non-blocking send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendRequest {
    pub(crate) delivered: bool,
}
impl SendRequest {
    /// Returns true iff the message has been handed to the transport
    pub fn test(&self) -> bool {
        self.delivered
    }
    /// Blocks until the message has been handed to the transport
    pub fn wait(self) -> Result<(), CommError> {
        if self.delivered {
            Ok(())
        } else {
            Err(CommError::Disconnected)
        }
    }
}

/// This is the communicator abstraction. It is implemented by each endpoint
/// of a group of processes (ranks) which exchange messages.
///
/// Messages sent from one given source to one given destination are always
/// received in the order in which they were sent.
pub trait Communicator {
    /// The identifier of this process in the group
    fn rank(&self) -> usize;
    /// The number of processes in the group
    fn size(&self) -> usize;

    /// Sends a message; this call does not wait for the receiver.
    fn send(&self, dest: usize, kind: MessageKind, payload: Vec<u8>) -> Result<(), CommError>;
    /// Starts sending a message and returns a request to check its completion
    fn isend(&self, dest: usize, kind: MessageKind, payload: Vec<u8>) -> Result<SendRequest, CommError> {
        self.send(dest, kind, payload)?;
        Ok(SendRequest { delivered: true })
    }
    /// Blocks until a message of the given kind (and source, if specified)
    /// arrives and returns it.
    fn recv(&mut self, source: Option<usize>, kind: MessageKind) -> Result<Envelope, CommError>;
    /// Checks whether a matching message is available without receiving it.
    fn probe(&mut self, source: Option<usize>, kind: Option<MessageKind>) -> Result<Option<Probe>, CommError>;

    /// Creates a non-blocking receive request
    fn irecv(&self, source: Option<usize>, kind: MessageKind) -> RecvRequest {
        RecvRequest::new(source, kind)
    }
    /// Completes the request if a matching message is available.
    fn test(&mut self, request: &mut RecvRequest) -> Result<Option<Envelope>, CommError>;
    /// Blocks until the request completes.
    fn wait(&mut self, request: &mut RecvRequest) -> Result<Envelope, CommError>;
    /// Cancels a pending request. Completing a cancelled request fails.
    fn cancel(&mut self, request: &mut RecvRequest) {
        request.cancelled = true;
    }
}
