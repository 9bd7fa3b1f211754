//! Save Scheduler
//!
//! Decides, after every mutation, whether a background flush should start,
//! and guarantees at most one flush is in flight at a time.
//!
//! ## Policy
//!
//! On each mutation:
//! 1. If a flush is already in flight, do nothing.
//! 2. If the save interval has not elapsed since the last completed flush,
//!    do nothing.
//! 3. Otherwise mark a flush in flight and report that one should start.
//!
//! On completion the in-flight marker is cleared unconditionally. The
//! interval anchor advances only when the flush succeeded, so after a failed
//! flush the next mutation still sees the interval as due and retries.

use std::time::{Duration, Instant};

/// Throttling state for background flushes
///
/// A pure state machine: callers pass in `now`, nothing here reads the
/// clock or takes locks.
#[derive(Debug)]
pub(crate) struct SaveScheduler {
    /// Minimum time between two scheduled flushes
    save_interval: Duration,

    /// When the last successful flush completed (starts at construction)
    last_flush_at: Instant,

    /// Whether a flush is currently running
    in_flight: bool,

    /// Completed flushes, scheduled and explicit (diagnostic counter)
    flushes_completed: u64,
}

impl SaveScheduler {
    pub(crate) fn new(save_interval: Duration, now: Instant) -> Self {
        Self {
            save_interval,
            last_flush_at: now,
            in_flight: false,
            flushes_completed: 0,
        }
    }

    /// True once the save interval has elapsed since the last completed flush
    pub(crate) fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.last_flush_at) >= self.save_interval
    }

    /// Decide whether a new background flush should start now
    ///
    /// Returns true at most once per interval; the caller must report the
    /// outcome through [`complete`](Self::complete) or the scheduler stays
    /// in flight forever.
    pub(crate) fn try_begin(&mut self, now: Instant) -> bool {
        if self.in_flight || !self.expired(now) {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record the outcome of a flush started by [`try_begin`](Self::try_begin)
    pub(crate) fn complete(&mut self, now: Instant, success: bool) {
        self.in_flight = false;
        if success {
            self.last_flush_at = now;
            self.flushes_completed += 1;
        }
    }

    /// Restart the throttle window after an explicit synchronous save
    pub(crate) fn record_flush(&mut self, now: Instant) {
        self.last_flush_at = now;
        self.flushes_completed += 1;
    }

    pub(crate) fn flushes_completed(&self) -> u64 {
        self.flushes_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn scheduler_at(t0: Instant) -> SaveScheduler {
        SaveScheduler::new(INTERVAL, t0)
    }

    #[test]
    fn not_expired_at_construction() {
        let t0 = Instant::now();
        let sched = scheduler_at(t0);
        assert!(!sched.expired(t0));
        assert!(!sched.expired(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn expired_once_interval_elapsed() {
        let t0 = Instant::now();
        let sched = scheduler_at(t0);
        assert!(sched.expired(t0 + INTERVAL));
        assert!(sched.expired(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn begin_refused_before_interval() {
        let t0 = Instant::now();
        let mut sched = scheduler_at(t0);
        assert!(!sched.try_begin(t0 + Duration::from_secs(1)));
        assert!(sched.try_begin(t0 + INTERVAL));
    }

    #[test]
    fn begin_refused_while_in_flight() {
        let t0 = Instant::now();
        let mut sched = scheduler_at(t0);
        assert!(sched.try_begin(t0 + INTERVAL));
        // Long overdue, but still only one flush at a time.
        assert!(!sched.try_begin(t0 + Duration::from_secs(60)));
    }

    #[test]
    fn success_restarts_the_window() {
        let t0 = Instant::now();
        let mut sched = scheduler_at(t0);
        assert!(sched.try_begin(t0 + INTERVAL));

        let t1 = t0 + Duration::from_secs(6);
        sched.complete(t1, true);
        assert_eq!(sched.flushes_completed(), 1);

        // Too soon after the completed flush.
        assert!(!sched.try_begin(t1 + Duration::from_secs(1)));
        // Due again a full interval later.
        assert!(sched.try_begin(t1 + INTERVAL));
    }

    #[test]
    fn failure_leaves_interval_due() {
        let t0 = Instant::now();
        let mut sched = scheduler_at(t0);
        assert!(sched.try_begin(t0 + INTERVAL));

        let t1 = t0 + Duration::from_secs(6);
        sched.complete(t1, false);
        assert_eq!(sched.flushes_completed(), 0);

        // Anchor did not move, so the very next mutation retries.
        assert!(sched.try_begin(t1));
    }

    #[test]
    fn explicit_save_restarts_the_window() {
        let t0 = Instant::now();
        let mut sched = scheduler_at(t0);
        let t1 = t0 + INTERVAL;
        sched.record_flush(t1);
        assert!(!sched.expired(t1 + Duration::from_secs(4)));
        assert!(sched.expired(t1 + INTERVAL));
    }
}
