//! Single-shot repeating timer
//!
//! Holds at most one armed deadline. Arming cancels whatever was armed
//! before, so repeated `play` calls never stack ticks.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(crate) struct Ticker {
    deadline: Option<Instant>,
}

impl Ticker {
    /// Arm for `now + interval`, replacing any armed deadline
    pub(crate) fn arm(&mut self, now: Instant, interval: Duration) {
        self.deadline = Some(now + interval);
    }

    pub(crate) fn cancel(&mut self) {
        self.deadline = None;
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume one due tick. The next deadline is computed from the fired
    /// one, not from `now`, so a late poll catches up tick by tick.
    pub(crate) fn fire(&mut self, now: Instant, interval: Duration) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = Some(deadline + interval);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_replaces_previous_deadline() {
        let start = Instant::now();
        let mut ticker = Ticker::default();
        ticker.arm(start, Duration::from_millis(100));
        ticker.arm(start, Duration::from_millis(300));
        assert_eq!(ticker.deadline(), Some(start + Duration::from_millis(300)));
    }

    #[test]
    fn test_fire_only_when_due() {
        let start = Instant::now();
        let interval = Duration::from_millis(100);
        let mut ticker = Ticker::default();
        ticker.arm(start, interval);

        assert!(!ticker.fire(start + Duration::from_millis(50), interval));
        assert!(ticker.fire(start + Duration::from_millis(250), interval));
        assert!(ticker.fire(start + Duration::from_millis(250), interval));
        assert!(!ticker.fire(start + Duration::from_millis(250), interval));

        ticker.cancel();
        assert!(!ticker.fire(start + Duration::from_secs(10), interval));
    }
}
