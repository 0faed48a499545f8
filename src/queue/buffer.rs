//! The ordered buffer of pending jobs.

use std::collections::VecDeque;

use super::job::Job;
use super::policy::{self, Placement};

/// Double-ended sequence of pending jobs, front = next to dequeue.
///
/// Owned solely by the consumer and only ever touched from its serialized
/// steps, so the type carries no synchronization of its own.
#[derive(Debug)]
pub struct JobBuffer<T> {
    jobs: VecDeque<Job<T>>,
}

impl<T> JobBuffer<T> {
    pub fn new() -> Self {
        Self {
            jobs: VecDeque::new(),
        }
    }

    /// Insert a job at the position the priority policy picks for it.
    pub fn insert(&mut self, job: Job<T>) {
        match policy::placement(&self.jobs, job.priority()) {
            Placement::Front => self.jobs.push_front(job),
            Placement::At(index) => self.jobs.insert(index, job),
            Placement::Back => self.jobs.push_back(job),
        }
    }

    pub fn pop_front(&mut self) -> Option<Job<T>> {
        self.jobs.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn clear(&mut self) {
        self.jobs.clear()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.jobs.reserve(additional)
    }
}

impl<T> Default for JobBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
