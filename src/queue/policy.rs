//! Insertion policy: where a newly fed job lands relative to what is queued.

use std::collections::VecDeque;

use super::job::{Job, Priority};

/// Where the policy wants a new job placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    At(usize),
    Back,
}

/// Compute the insertion point for a new job of the given priority.
///
/// - `Urgent` goes to the front, ahead of everything already queued.
/// - `Standard` goes just ahead of the first `Utility` job, else to the back.
/// - `Utility` goes just ahead of the first `Background` job, else to the back.
/// - `Background` always goes to the back.
///
/// Existing entries are never re-sorted, so the resulting order is relative
/// to what was queued at insertion time, not a global sort of the buffer.
/// The anchor scan is linear; acceptable for bounded interactive queues.
pub fn placement<T>(queued: &VecDeque<Job<T>>, priority: Priority) -> Placement {
    match priority {
        Priority::Urgent => Placement::Front,
        Priority::Standard => anchor(queued, Priority::Utility),
        Priority::Utility => anchor(queued, Priority::Background),
        Priority::Background => Placement::Back,
    }
}

/// Position of the first queued job with the anchor priority, else the back.
fn anchor<T>(queued: &VecDeque<Job<T>>, before: Priority) -> Placement {
    match queued.iter().position(|job| job.priority() == before) {
        Some(index) => Placement::At(index),
        None => Placement::Back,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(priorities: &[Priority]) -> VecDeque<Job<()>> {
        priorities.iter().map(|&p| Job::new((), p)).collect()
    }

    #[test]
    fn urgent_always_goes_front() {
        let buffer = queued(&[Priority::Urgent, Priority::Standard]);
        assert_eq!(placement(&buffer, Priority::Urgent), Placement::Front);
        assert_eq!(placement(&queued(&[]), Priority::Urgent), Placement::Front);
    }

    #[test]
    fn standard_anchors_on_first_utility() {
        let buffer = queued(&[Priority::Standard, Priority::Utility, Priority::Utility]);
        assert_eq!(placement(&buffer, Priority::Standard), Placement::At(1));
    }

    #[test]
    fn standard_appends_without_utility_anchor() {
        let buffer = queued(&[Priority::Standard, Priority::Background]);
        assert_eq!(placement(&buffer, Priority::Standard), Placement::Back);
    }

    #[test]
    fn utility_anchors_on_first_background() {
        let buffer = queued(&[Priority::Utility, Priority::Background]);
        assert_eq!(placement(&buffer, Priority::Utility), Placement::At(1));
    }

    #[test]
    fn utility_appends_without_background_anchor() {
        let buffer = queued(&[Priority::Standard, Priority::Utility]);
        assert_eq!(placement(&buffer, Priority::Utility), Placement::Back);
    }

    #[test]
    fn background_always_appends() {
        let buffer = queued(&[Priority::Background, Priority::Urgent]);
        assert_eq!(placement(&buffer, Priority::Background), Placement::Back);
    }
}
