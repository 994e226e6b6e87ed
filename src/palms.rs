//! Palm counting for the product comparison screen.
//!
//! Unlike the per-frame gestures, the palm prompt is sampled on a slow
//! interval: every `interval` the number of detected hands picks one of
//! three prompts, which stays on screen until the next sample changes it.

use crate::constants::{DEFAULT_PALM_INTERVAL_MS, MSG_NO_PALMS, MSG_ONE_PALM, MSG_TWO_PALMS};
use std::time::Duration;
use tokio::time::Instant;

/// Hands seen in a sampled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PalmCount {
    Two,
    One,
    /// No hands, or a count the comparison prompt has no message for
    Other,
}

impl PalmCount {
    #[must_use]
    pub const fn from_hands(count: usize) -> Self {
        match count {
            2 => Self::Two,
            1 => Self::One,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Two => MSG_TWO_PALMS,
            Self::One => MSG_ONE_PALM,
            Self::Other => MSG_NO_PALMS,
        }
    }
}

/// Samples the hand count once per interval
#[derive(Debug, Clone)]
pub struct PalmObserver {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for PalmObserver {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_PALM_INTERVAL_MS))
    }
}

impl PalmObserver {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Feed one frame's hand count.
    ///
    /// The first frame only arms the timer; a count is reported once a full
    /// interval has passed, then once per interval after that.
    pub fn observe(&mut self, hands: usize, now: Instant) -> Option<PalmCount> {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.interval);
                None
            }
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                Some(PalmCount::from_hands(hands))
            }
            Some(_) => None,
        }
    }

    /// Restart the interval, as when the camera is reopened
    pub fn reset(&mut self) {
        self.next_due = None;
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_to_messages() {
        assert_eq!(PalmCount::from_hands(2).message(), MSG_TWO_PALMS);
        assert_eq!(PalmCount::from_hands(1).message(), MSG_ONE_PALM);
        assert_eq!(PalmCount::from_hands(0).message(), MSG_NO_PALMS);
        assert_eq!(PalmCount::from_hands(3), PalmCount::Other);
    }

    #[test]
    fn test_samples_once_per_interval() {
        let mut observer = PalmObserver::new(Duration::from_secs(5));
        let start = Instant::now();
        assert_eq!(observer.observe(2, start), None);
        assert_eq!(observer.observe(2, start + Duration::from_millis(4999)), None);
        assert_eq!(observer.observe(2, start + Duration::from_secs(5)), Some(PalmCount::Two));
        assert_eq!(observer.observe(1, start + Duration::from_secs(6)), None);
        assert_eq!(observer.observe(1, start + Duration::from_secs(10)), Some(PalmCount::One));
    }

    #[test]
    fn test_reset_rearms() {
        let mut observer = PalmObserver::new(Duration::from_secs(5));
        let start = Instant::now();
        observer.observe(0, start);
        observer.reset();
        assert_eq!(observer.observe(0, start + Duration::from_secs(5)), None);
        assert_eq!(
            observer.observe(0, start + Duration::from_secs(10)),
            Some(PalmCount::Other)
        );
    }
}
