//! Jobs and their priority classes.

use std::fmt;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Priority classes, in decreasing dequeue precedence.
///
/// A priority is not a global sort key. It determines where a job is inserted
/// relative to what is already queued (see [`super::policy`]), nothing more.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    Standard,
    Utility,
    Background,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Standard
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Urgent => write!(f, "urgent"),
            Priority::Standard => write!(f, "standard"),
            Priority::Utility => write!(f, "utility"),
            Priority::Background => write!(f, "background"),
        }
    }
}

/// An item paired with its priority, the unit moved through the buffer.
///
/// Immutable once created. Owned by the buffer until popped, at which point
/// ownership transfers to the caller.
#[derive(Debug)]
pub struct Job<T> {
    id: Uuid,
    item: T,
    priority: Priority,
    enqueued_at: Instant,
}

impl<T> Job<T> {
    pub(crate) fn new(item: T, priority: Priority) -> Self {
        Self {
            id: Uuid::new_v4(),
            item,
            priority,
            enqueued_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Time this job has spent queued so far.
    pub fn queue_age(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priority_is_standard() {
        assert_eq!(Priority::default(), Priority::Standard);
    }

    #[test]
    fn priority_display_is_lowercase() {
        assert_eq!(Priority::Urgent.to_string(), "urgent");
        assert_eq!(Priority::Background.to_string(), "background");
    }

    #[test]
    fn declaration_order_matches_precedence() {
        assert!(Priority::Urgent < Priority::Standard);
        assert!(Priority::Standard < Priority::Utility);
        assert!(Priority::Utility < Priority::Background);
    }
}
