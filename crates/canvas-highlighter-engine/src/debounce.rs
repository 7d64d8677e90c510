//! Trailing-edge debouncing with caller-supplied time.
//!
//! The host reports each signal with [`Debouncer::trigger`] and polls with
//! [`Debouncer::fire_if_due`] from whatever loop or timer it already has.
//! Only the last trigger of a burst counts: it pushes the deadline out to
//! `now + delay`, and the action fires once when that deadline passes.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records a signal at `now`, superseding any pending one.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True exactly once per burst, at the first poll on or after the
    /// deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending signal will fire, for hosts that schedule a timer.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_once_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger(start);

        assert!(!debouncer.fire_if_due(start + Duration::from_millis(299)));
        assert!(debouncer.fire_if_due(start + DELAY));
        assert!(!debouncer.fire_if_due(start + Duration::from_secs(5)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_burst_collapses_to_last_trigger() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        for step in 0..10 {
            debouncer.trigger(start + Duration::from_millis(step * 100));
        }

        // Last trigger was at 900ms.
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(1100)));
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(1200)));
        assert!(debouncer.fire_if_due(start + Duration::from_millis(1200)));
    }

    #[test]
    fn test_cancel_drops_pending_signal() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger(start);
        debouncer.cancel();

        assert!(!debouncer.fire_if_due(start + DELAY));
    }

    #[test]
    fn test_zero_delay_fires_on_same_instant() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::ZERO);
        debouncer.trigger(start);

        assert!(debouncer.fire_if_due(start));
    }
}
