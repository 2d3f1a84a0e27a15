//! Sliding-window event rate limiting.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Bounds how many events are accepted within a trailing window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_events: usize,
    accepted: VecDeque<Instant>,
}

impl RateLimiter {
    /// Create a limiter accepting `max_events` per `window`.
    pub fn new(window: Duration, max_events: usize) -> Self {
        Self {
            window,
            max_events,
            accepted: VecDeque::with_capacity(max_events),
        }
    }

    /// Try to record an event at `at`, clamped to the current time.
    pub fn check(&mut self, at: Instant) -> bool {
        self.check_at(at, Instant::now())
    }

    /// Try to record an event at `at`, clamped to `now`.
    ///
    /// Entries older than the window are evicted first. When the window is
    /// full the event is rejected and not recorded.
    pub fn check_at(&mut self, at: Instant, now: Instant) -> bool {
        let at = at.min(now);

        // Callers stamp events themselves, so entries are not time-ordered
        if let Some(cutoff) = at.checked_sub(self.window) {
            self.accepted.retain(|t| *t >= cutoff);
        }

        if self.accepted.len() >= self.max_events {
            return false;
        }

        self.accepted.push_back(at);
        true
    }

    /// Number of events currently inside the window.
    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Forget all recorded events.
    pub fn clear(&mut self) {
        self.accepted.clear();
    }
}
