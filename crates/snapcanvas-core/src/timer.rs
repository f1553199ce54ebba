//! A single cancellable deadline, driven by the caller's clock.

use crate::input::Instant;
use std::time::Duration;

/// One pending deferred transition.
///
/// Nothing runs in the background: the owner polls with the current time and
/// treats a `true` from [`HoldTimer::fire_if_due`] as the timer firing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldTimer {
    due: Option<Instant>,
}

impl HoldTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the timer `delay` after `now`, replacing any pending deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    /// Drop the pending deadline.
    pub fn cancel(&mut self) {
        self.due = None;
    }

    /// When the timer will fire, if scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// Fire (and clear) the timer if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
