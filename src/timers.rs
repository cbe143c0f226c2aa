//! Cancellable timers driven by an explicit clock.
//!
//! Nothing here sleeps or spawns. Owners call `poll(now)` from their tick and
//! act on what fires, which keeps every timer observable from tests.

use std::time::{Duration, Instant};

/// A pending value that becomes due `delay` after the last `arm`.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) with `value`. A previously pending value is dropped.
    pub fn arm(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// Take the value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now >= *at => self.cancel(),
            _ => None,
        }
    }
}

/// Fixed-period poller. Missed periods collapse into one firing.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next {
            Some(at) if now >= at => {
                let mut next = at + self.period;
                if next <= now {
                    next = now + self.period;
                }
                self.next = Some(next);
                true
            }
            _ => false,
        }
    }
}
