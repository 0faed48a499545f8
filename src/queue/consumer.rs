//! The task consumer: the only entity that mutates queue state.
//!
//! Every mutation runs as a unit of work on the queue's serial executor, one
//! at a time, in submission order. Callers suspend until their unit has been
//! applied. The one exception is [`TaskQueue::cancel_pending`], which writes
//! the consumption flag directly so cancellation cannot queue behind a
//! backlog of pending operations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use crate::executor::{Execute, SerialExecutor};

use super::buffer::JobBuffer;
use super::job::{Job, Priority};
use super::state::ConsumptionState;

/// Outcome of a single dequeue step.
///
/// `Consumed` is a value, not an error: the queue's operations are total.
#[derive(Debug)]
pub enum Dequeue<T> {
    /// The front job; ownership transfers to the caller.
    Ready(Job<T>),
    /// Nothing is queued right now.
    Consumed,
}

/// Buffer-owning core. Lives behind a mutex that is only ever taken from the
/// executor worker, so the lock is uncontended; the executor, not the mutex,
/// is what serializes access.
struct ConsumerCore<T> {
    buffer: JobBuffer<T>,
}

impl<T> ConsumerCore<T> {
    /// Insert a job, then flip the flag. Buffer first, flag second: a reader
    /// observing `Waiting` must see the job behind it.
    fn feed_step(&mut self, job: Job<T>, state: &ConsumptionState) -> usize {
        self.buffer.insert(job);
        state.mark_waiting();
        self.buffer.len()
    }

    /// The emptiness check and the pop are one serialized step; nothing can
    /// interleave between them.
    fn next_step(&mut self, state: &ConsumptionState) -> Dequeue<T> {
        match self.buffer.pop_front() {
            Some(job) => {
                state.mark_waiting();
                if self.buffer.is_empty() {
                    // Eagerly re-settle so a stale Waiting flag cannot
                    // linger with nothing queued behind it.
                    state.mark_consumed();
                }
                Dequeue::Ready(job)
            }
            None => {
                state.mark_consumed();
                Dequeue::Consumed
            }
        }
    }
}

/// Handle to a priority task queue.
///
/// Clones are cheap and all talk to the same queue. Producers and the
/// consumer may call from any task or thread; the serial executor is what
/// orders the actual mutations.
pub struct TaskQueue<T> {
    core: Arc<Mutex<ConsumerCore<T>>>,
    state: Arc<ConsumptionState>,
    executor: Arc<dyn Execute>,
}

impl<T> Clone for TaskQueue<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            state: Arc::clone(&self.state),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<T: Send + 'static> TaskQueue<T> {
    /// A queue with its own dedicated [`SerialExecutor`].
    pub fn new() -> Self {
        Self::with_executor(Arc::new(SerialExecutor::new()))
    }

    /// Bind the queue to an existing executor. The queue holds a reference
    /// but does not manage the executor's lifetime.
    pub fn with_executor(executor: Arc<dyn Execute>) -> Self {
        Self {
            core: Arc::new(Mutex::new(ConsumerCore {
                buffer: JobBuffer::new(),
            })),
            state: Arc::new(ConsumptionState::new()),
            executor,
        }
    }

    /// Feed an item at [`Priority::Standard`].
    pub async fn feed(&self, item: T) {
        self.feed_with(item, Priority::Standard).await
    }

    /// Feed an item with an explicit priority.
    ///
    /// Suspends until the worker has applied the insertion. Never fails;
    /// exactly one job lands in the buffer per call.
    pub async fn feed_with(&self, item: T, priority: Priority) {
        let job = Job::new(item, priority);
        tracing::trace!(id = %job.id(), %priority, "feeding job");

        let core = Arc::clone(&self.core);
        let state = Arc::clone(&self.state);
        let executor = Arc::clone(&self.executor);
        let (done, applied) = oneshot::channel();
        self.executor.submit(Box::new(move || {
            debug_assert!(executor.is_serialized(), "consumer step off the serial worker");
            let depth = lock(&core).feed_step(job, &state);
            tracing::trace!(depth, "job queued");
            let _ = done.send(());
        }));

        settled(applied).await
    }

    /// Pop the front job, or report [`Dequeue::Consumed`] when nothing is
    /// queued. Never blocks waiting for a job and never errors.
    pub async fn next(&self) -> Dequeue<T> {
        let core = Arc::clone(&self.core);
        let state = Arc::clone(&self.state);
        let executor = Arc::clone(&self.executor);
        let (done, applied) = oneshot::channel();
        self.executor.submit(Box::new(move || {
            debug_assert!(executor.is_serialized(), "consumer step off the serial worker");
            let _ = done.send(lock(&core).next_step(&state));
        }));

        settled(applied).await
    }

    /// Pre-allocate room for `additional` jobs. Allocation hint only.
    pub async fn reserve_capacity(&self, additional: usize) {
        let core = Arc::clone(&self.core);
        let (done, applied) = oneshot::channel();
        self.executor.submit(Box::new(move || {
            lock(&core).buffer.reserve(additional);
            let _ = done.send(());
        }));

        settled(applied).await
    }

    /// Drop everything queued, force the flag to `Consumed`, and run one
    /// final dequeue step so a pending reader observes termination.
    pub async fn graceful_shutdown(&self) {
        let core = Arc::clone(&self.core);
        let state = Arc::clone(&self.state);
        let (done, applied) = oneshot::channel();
        self.executor.submit(Box::new(move || {
            let mut core = lock(&core);
            let dropped = core.buffer.len();
            core.buffer.clear();
            state.mark_consumed();
            let _ = core.next_step(&state);
            tracing::info!(dropped, "task queue shut down");
            let _ = done.send(());
        }));

        settled(applied).await
    }

    /// Force the consumption flag to `Consumed` with a direct atomic write,
    /// bypassing the executor queue. Cancellation must be prompt, so this is
    /// the one consumer-state write that skips the serialized context. Jobs
    /// already queued stay queued.
    pub fn cancel_pending(&self) {
        self.state.mark_consumed();
    }

    /// Whether the flag currently promises a job to the next reader.
    pub fn is_waiting(&self) -> bool {
        self.state.is_waiting()
    }

    /// A cancellable async iteration over this queue.
    pub fn stream(&self) -> crate::stream::JobStream<T> {
        crate::stream::JobStream::new(self.clone())
    }
}

impl<T: Send + 'static> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The mutex is only ever taken from the executor worker, so contention is
/// impossible; poisoning would take a panicking unit, in which case the
/// guard is still usable.
fn lock<T>(core: &Mutex<ConsumerCore<T>>) -> MutexGuard<'_, ConsumerCore<T>> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Wait for the worker to apply a submitted unit. A dropped reply means the
/// executor discarded the unit without running it; that is executor misuse,
/// not a caller error, and there is nothing sane to report upward.
async fn settled<R>(applied: oneshot::Receiver<R>) -> R {
    match applied.await {
        Ok(outcome) => outcome,
        Err(_) => panic!("serial executor dropped a queued consumer operation"),
    }
}
