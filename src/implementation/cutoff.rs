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

//! This module provides the cancellation token which is used to stop a search
//! along with the time budget that requests a stop once some wall-clock limit
//! is reached.

use std::{sync::{Arc, atomic::{AtomicBool, Ordering}}, time::{Duration, Instant}};

use parking_lot::{Condvar, Mutex};

/// A cooperative cancellation token. Stopping is only ever *requested*: the
/// running search observes the request at its next iteration boundary and
/// never in the middle of an expansion.
///
/// Cloning a token yields a handle on the same flag so that the stop can be
/// requested from any thread (a timer, a signal handler, ...).
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stop: Arc<AtomicBool>,
    timer: Arc<Timer>,
}

/// The state of the time budget armed on a token. Each arming or disarming
/// bumps the generation; a timer only fires if its generation is current.
#[derive(Debug, Default)]
struct Timer {
    generation: Mutex<u64>,
    wakeup: Condvar,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
    /// Withdraws a stop request (this is done when a stopped search resumes)
    pub fn reset(&self) {
        self.stop.store(false, Ordering::Release);
    }
    /// Cancels the time budget armed on this token (if any)
    pub fn disarm(&self) {
        let mut generation = self.timer.generation.lock();
        *generation += 1;
        self.timer.wakeup.notify_all();
    }
}

/// This allows one to specify a maximum time budget to solve the problem.
/// Once the time budget is elapsed, a stop is requested on the token and the
/// search terminates with the best solution found so far.
///
/// Arming a budget replaces the one previously armed on the same token, and
/// `StopToken::disarm` cancels it.
///
/// # Example
/// ```
/// # use parsearch::*;
/// use std::time::Duration;
///
/// let token = StopToken::new();
/// TimeBudget::arm(&token, Duration::from_millis(10));
/// std::thread::sleep(Duration::from_millis(200));
/// assert!(token.is_stop_requested());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget;
impl TimeBudget {
    pub fn arm(token: &StopToken, budget: Duration) {
        let deadline = Instant::now() + budget;
        let mine = {
            let mut generation = token.timer.generation.lock();
            *generation += 1;
            token.timer.wakeup.notify_all();
            *generation
        };
        let t_flag = token.clone();

        // timer
        std::thread::spawn(move || {
            let timer = &t_flag.timer;
            let mut generation = timer.generation.lock();
            while *generation == mine {
                if timer.wakeup.wait_until(&mut generation, deadline).timed_out() {
                    break;
                }
            }
            if *generation == mine {
                log::info!("time budget of {:?} elapsed", budget);
                t_flag.request_stop();
            }
        });
    }
}
