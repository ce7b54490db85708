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

//! This module (and its submodules) provide the concrete implementations of
//! the abstractions defined in `crate::abstraction`. Unless you are after
//! something very specific, the types you need to run a search all live here:
//! the queues, the priorities, the goals and the engines (sequential,
//! multi-threaded and distributed).
mod config;
mod cutoff;
mod stats;
mod pack;
mod priority;
mod queue;
mod goal;
pub(crate) mod algorithm;
mod parallel;
mod distributed;

pub use config::*;
pub use cutoff::*;
pub use stats::*;
pub use pack::*;
pub use priority::*;
pub use queue::*;
pub use goal::*;
pub use algorithm::Algorithm;
pub use parallel::*;
pub use distributed::*;
