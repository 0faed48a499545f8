//! Priority-ordered task queue.
//!
//! Priority order: urgent > standard > utility > background. An urgent job
//! preempts everything already queued; the other classes slot in relative to
//! what is queued at insertion time (see [`policy`]). All queue mutation is
//! applied by the consumer on its serial executor.

pub mod buffer;
pub mod consumer;
pub mod job;
pub mod policy;
pub mod state;

pub use self::consumer::{Dequeue, TaskQueue};
pub use self::job::{Job, Priority};
pub use self::state::ConsumptionState;
