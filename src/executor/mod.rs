//! Single-worker serial executor.
//!
//! Every state-mutating operation on the task consumer is submitted here as
//! an opaque unit of work. The executor runs units one at a time, in
//! submission order, on one dedicated worker thread -- the mutual-exclusion
//! contract an explicit lock would otherwise provide.

use std::sync::mpsc;
use std::thread;

/// An opaque unit of work. The executor never interprets its contents.
pub type ExecutorJob = Box<dyn FnOnce() + Send + 'static>;

/// Capability to run units of work in a serialized context.
pub trait Execute: Send + Sync {
    /// Append a unit to the run queue. Returns immediately; the unit runs
    /// later, after everything submitted before it.
    fn submit(&self, job: ExecutorJob);

    /// True when the calling code is running inside this executor's
    /// serialized context. Intended for defensive assertions.
    fn is_serialized(&self) -> bool;
}

/// A dedicated single-worker FIFO executor.
///
/// Owns exactly one worker thread draining an unbounded queue. Units execute
/// strictly one at a time, never two concurrently, in the order they were
/// submitted. The executor has no queue-depth bound and no notion of
/// priority; priority is a queue concept layered above this FIFO substrate.
pub struct SerialExecutor {
    queue: Option<mpsc::Sender<ExecutorJob>>,
    worker: Option<thread::JoinHandle<()>>,
    worker_id: thread::ThreadId,
}

impl SerialExecutor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<ExecutorJob>();
        let worker = thread::spawn(move || {
            while let Ok(job) = rx.recv() {
                job();
            }
            tracing::debug!("serial executor worker exiting");
        });
        let worker_id = worker.thread().id();

        Self {
            queue: Some(tx),
            worker: Some(worker),
            worker_id,
        }
    }

    /// True when called from the dedicated worker thread.
    pub fn is_worker(&self) -> bool {
        thread::current().id() == self.worker_id
    }
}

impl Execute for SerialExecutor {
    fn submit(&self, job: ExecutorJob) {
        // Send only fails once Drop has closed the channel; a live handle
        // always reaches the worker.
        if let Some(queue) = &self.queue {
            let _ = queue.send(job);
        }
    }

    fn is_serialized(&self) -> bool {
        self.is_worker()
    }
}

impl Default for SerialExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialExecutor {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is already queued
        // and exit; joining gives callers a quiesced executor.
        self.queue.take();
        let Some(worker) = self.worker.take() else {
            return;
        };
        // A unit can hold the last reference to its own executor, in which
        // case drop runs on the worker itself and joining would deadlock.
        if thread::current().id() == self.worker_id {
            return;
        }
        let _ = worker.join();
    }
}
