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

//! This module provides the fixed size pool of worker threads which runs the
//! phases of the multi-threaded engines.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::channel::{unbounded, Sender};
use parking_lot::{Condvar, Mutex};

use crate::SearchError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// The control flag of a worker thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    /// The worker is parked, waiting for a job
    Waiting,
    /// The worker has been handed a job (and is processing it)
    Working,
    /// The worker must terminate
    Stopping,
}

struct SlotData {
    state: WorkerState,
    job: Option<Job>,
}
/// The mailbox of one worker: its control flag along with the monitor the
/// worker sleeps on while it is waiting.
struct Slot {
    data: Mutex<SlotData>,
    wake: Condvar,
}

#[derive(Debug, Default)]
struct Progress {
    /// jobs submitted but not completed yet
    pending: usize,
    /// jobs which panicked since the last call to `wait_idle`
    panicked: usize,
}

/// The state shared by the dispatcher and the workers
struct Shared {
    slots: Vec<Slot>,
    /// The indices of the workers which are ready to take a new job
    free: Mutex<Vec<usize>>,
    available: Condvar,
    progress: Mutex<Progress>,
    idle: Condvar,
}

/// A fixed size pool of OS threads. Jobs are submitted to a dispatcher thread
/// which hands each of them to a waiting worker and wakes it up. Once its job
/// is over, the worker signals the completion and becomes available again.
pub struct ThreadPool {
    shared: Arc<Shared>,
    sender: Option<Sender<Job>>,
    dispatcher: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawns `nb_threads` workers (at least one) along with the dispatcher
    pub fn new(nb_threads: usize) -> Self {
        let nb_threads = nb_threads.max(1);
        let shared = Arc::new(Shared {
            slots: (0..nb_threads)
                .map(|_| Slot { data: Mutex::new(SlotData { state: WorkerState::Waiting, job: None }), wake: Condvar::new() })
                .collect(),
            free: Mutex::new((0..nb_threads).collect()),
            available: Condvar::new(),
            progress: Mutex::new(Progress::default()),
            idle: Condvar::new(),
        });

        let workers = (0..nb_threads)
            .map(|id| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || worker_loop(&shared, id))
            })
            .collect();

        let (sender, receiver) = unbounded::<Job>();
        let dispatch = Arc::clone(&shared);
        let dispatcher = std::thread::spawn(move || {
            for job in receiver.iter() {
                let id = {
                    let mut free = dispatch.free.lock();
                    while free.is_empty() {
                        dispatch.available.wait(&mut free);
                    }
                    free.pop()
                };
                if let Some(id) = id {
                    let slot = &dispatch.slots[id];
                    let mut data = slot.data.lock();
                    data.state = WorkerState::Working;
                    data.job = Some(job);
                    slot.wake.notify_one();
                }
            }
        });

        ThreadPool { shared, sender: Some(sender), dispatcher: Some(dispatcher), workers }
    }

    /// The number of worker threads
    pub fn size(&self) -> usize {
        self.shared.slots.len()
    }

    /// Submits a job for execution on one of the workers
    pub fn execute<F: FnOnce() + Send + 'static>(&self, job: F) {
        self.shared.progress.lock().pending += 1;
        let sent = self.sender.as_ref().map(|s| s.send(Box::new(job)));
        if !matches!(sent, Some(Ok(()))) {
            // the dispatcher is gone: the job will never run
            self.shared.progress.lock().pending -= 1;
        }
    }

    /// Blocks until all the submitted jobs are complete. Fails when any of
    /// them panicked.
    pub fn wait_idle(&self) -> Result<(), SearchError> {
        let mut progress = self.shared.progress.lock();
        while progress.pending > 0 {
            self.shared.idle.wait(&mut progress);
        }
        if progress.panicked > 0 {
            progress.panicked = 0;
            Err(SearchError::WorkerPanicked)
        } else {
            Ok(())
        }
    }
}

fn worker_loop(shared: &Shared, id: usize) {
    let slot = &shared.slots[id];
    loop {
        let job = {
            let mut data = slot.data.lock();
            while data.state == WorkerState::Waiting {
                slot.wake.wait(&mut data);
            }
            match data.state {
                WorkerState::Stopping => return,
                _ => data.job.take(),
            }
        };

        let panicked = match job {
            Some(job) => catch_unwind(AssertUnwindSafe(job)).is_err(),
            None => false,
        };
        if panicked {
            log::debug!("a job panicked on worker {}", id);
        }

        {
            let mut data = slot.data.lock();
            if data.state == WorkerState::Working {
                data.state = WorkerState::Waiting;
            }
        }
        shared.free.lock().push(id);
        shared.available.notify_one();

        let mut progress = shared.progress.lock();
        progress.pending -= 1;
        progress.panicked += panicked as usize;
        shared.idle.notify_all();
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.wait_idle().ok();
        self.sender.take();
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.join().ok();
        }
        for slot in self.shared.slots.iter() {
            slot.data.lock().state = WorkerState::Stopping;
            slot.wake.notify_one();
        }
        for worker in self.workers.drain(..) {
            worker.join().ok();
        }
    }
}
