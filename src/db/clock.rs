use std::sync::atomic::{AtomicI64, Ordering};

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Source of "now" for freshness checks, in epoch seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A settable clock for tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    #[must_use]
    pub const fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Oldest `last_updated` still considered fresh for `max_age_days`.
#[must_use]
pub const fn freshness_cutoff(now: i64, max_age_days: u32) -> i64 {
    now.saturating_sub(max_age_days as i64 * SECONDS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        clock.set(10);
        assert_eq!(clock.now(), 10);
    }

    #[test]
    fn test_cutoff() {
        assert_eq!(freshness_cutoff(1_000_000, 7), 1_000_000 - 7 * 86_400);
        assert_eq!(freshness_cutoff(5, 0), 5);
    }
}
