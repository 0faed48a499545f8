//! The consumption state flag.

use std::sync::atomic::{AtomicU8, Ordering};

const CONSUMED: u8 = 0;
const WAITING: u8 = 1;

/// Two-valued flag signaling whether a pending job should be available to
/// the next reader.
///
/// `Consumed` means nothing is promised to the next read; `Waiting` means at
/// least one job should be available. The flag is derivative of buffer
/// emptiness but stored separately: it also carries the cancellation signal,
/// which is written from outside the consumer's serialized context. It is
/// therefore the one concurrently writable cell in the queue. Stores are
/// `Relaxed`; loads are `Acquire`. The consumer always performs the buffer
/// mutation before the matching flag flip, so a reader that observes
/// `Waiting` sees the job behind it.
#[derive(Debug)]
pub struct ConsumptionState {
    flag: AtomicU8,
}

impl ConsumptionState {
    /// Starts out `Consumed`: nothing has been promised yet.
    pub fn new() -> Self {
        Self {
            flag: AtomicU8::new(CONSUMED),
        }
    }

    /// Unconditionally record that a job should be available.
    pub fn mark_waiting(&self) {
        self.flag.store(WAITING, Ordering::Relaxed);
    }

    /// Unconditionally record that nothing is promised to the next reader.
    /// Doubles as the cancellation signal.
    pub fn mark_consumed(&self) {
        self.flag.store(CONSUMED, Ordering::Relaxed);
    }

    pub fn is_waiting(&self) -> bool {
        self.flag.load(Ordering::Acquire) == WAITING
    }
}

impl Default for ConsumptionState {
    fn default() -> Self {
        Self::new()
    }
}
