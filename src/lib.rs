//! serialq -- Priority-ordered async task queue with a dedicated serial executor.
//!
//! Producers feed items tagged with a priority class; a single logical
//! consumer drains them in priority order through a cancellable async
//! iteration. Every mutation of queue state runs on a purpose-built
//! single-worker executor, which serializes operations instead of an
//! ambient lock.

pub mod executor;
pub mod queue;
pub mod stream;

pub use executor::{Execute, ExecutorJob, SerialExecutor};
pub use queue::{Dequeue, Job, Priority, TaskQueue};
pub use stream::JobStream;
