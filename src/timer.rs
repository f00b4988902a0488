//! Cancellable one-shot timers driven by the UI frame loop.
//!
//! A [`Deadline`] is a handle, not a callback: the owner keeps it in an
//! `Option`, checks it each frame, and drops it to cancel. Replacing the
//! `Option` re-arms, so a stale timer can never fire after the state that
//! armed it has changed.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    fires_at: Instant,
}

impl Deadline {
    pub fn after(now: Instant, delay: Duration) -> Self {
        Self { fires_at: now + delay }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.fires_at
    }

    /// Time left before the deadline, zero once due
    pub fn remaining(&self, now: Instant) -> Duration {
        self.fires_at.saturating_duration_since(now)
    }
}

/// Take the deadline out of `slot` if it is due. The slot is left empty so the
/// timer fires at most once.
pub fn take_if_due(slot: &mut Option<Deadline>, now: Instant) -> bool {
    match slot {
        Some(d) if d.is_due(now) => {
            *slot = None;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_due() {
        let start = Instant::now();
        let d = Deadline::after(start, Duration::from_secs(3));
        assert!(!d.is_due(start));
        assert!(!d.is_due(start + Duration::from_millis(2999)));
        assert!(d.is_due(start + Duration::from_secs(3)));
        assert_eq!(d.remaining(start + Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(d.remaining(start + Duration::from_secs(10)), Duration::ZERO);
    }

    #[test]
    fn test_take_if_due_fires_once() {
        let start = Instant::now();
        let mut slot = Some(Deadline::after(start, Duration::from_secs(1)));
        assert!(!take_if_due(&mut slot, start));
        assert!(slot.is_some());
        assert!(take_if_due(&mut slot, start + Duration::from_secs(1)));
        assert!(slot.is_none());
        assert!(!take_if_due(&mut slot, start + Duration::from_secs(2)));
    }
}
