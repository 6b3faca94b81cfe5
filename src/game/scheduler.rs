//! The scheduler port: how the game asks for its next tick.
//!
//! The engine never sleeps or owns a timer. Whoever drives it supplies a
//! [`TickScheduler`]; the session asks it for the next tick with the current
//! tick interval and cancels it on pause or game over.

use std::time::Duration;

pub trait TickScheduler {
    /// Request a single tick after `delay`, replacing any pending request
    fn schedule(&mut self, delay: Duration);

    /// Drop the pending request, if any
    fn cancel(&mut self);
}

/// Scheduler that only remembers what was asked of it.
///
/// Used to drive the game by hand in headless runs and tests: check
/// [`pending`](ManualScheduler::pending), then call the session's tick.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    pending: Option<Duration>,
    requests: Vec<Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay of the outstanding request
    pub fn pending(&self) -> Option<Duration> {
        self.pending
    }

    /// Every delay requested so far, oldest first
    pub fn requests(&self) -> &[Duration] {
        &self.requests
    }

    /// Consume the outstanding request, as a timer firing would
    pub fn fire(&mut self) -> Option<Duration> {
        self.pending.take()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) {
        self.pending = Some(delay);
        self.requests.push(delay);
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_tracks_requests() {
        let mut scheduler = ManualScheduler::new();
        assert_eq!(scheduler.pending(), None);

        scheduler.schedule(Duration::from_millis(110));
        scheduler.schedule(Duration::from_millis(104));
        assert_eq!(scheduler.pending(), Some(Duration::from_millis(104)));
        assert_eq!(scheduler.requests().len(), 2);

        assert_eq!(scheduler.fire(), Some(Duration::from_millis(104)));
        assert_eq!(scheduler.fire(), None);

        scheduler.schedule(Duration::from_millis(98));
        scheduler.cancel();
        assert_eq!(scheduler.pending(), None);
    }
}
