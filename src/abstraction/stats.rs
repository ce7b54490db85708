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

//! This module defines the sink through which the search reports its
//! statistics. The engine only ever calls it; formatting the collected
//! information is left to the client.

use std::time::Duration;

/// A sink collecting the counters and timers of a search.
pub trait StatSink: Send + Sync {
    /// `n` nodes have been created by some expansion
    fn created(&self, n: usize);
    /// `n` nodes have been discarded because they could not improve the goal
    fn pruned(&self, n: usize);
    /// `n` nodes have been extracted from a queue and processed
    fn explored(&self, n: usize);
    /// An algorithm started running
    fn start_algorithm(&self);
    /// An algorithm ended
    fn end_algorithm(&self);
    /// One expansion took `elapsed` time
    fn evaluation(&self, elapsed: Duration);
}
