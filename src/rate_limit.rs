//! Submission throttling for the contact form.
//!
//! The limiter keeps a single `(last_submit, count)` record. The window is
//! anchored at the most recent accepted submission, not at the first one, and
//! only resets when a new submission arrives after it has elapsed:
//!
//! - **Blocked** when less than `window` has passed since the last submission
//!   and `count >= max_submissions`.
//! - **Recorded** on every accepted submission: the count restarts at 1 when
//!   strictly more than `window` has passed, otherwise it increments.
//!
//! At exactly `window` elapsed the attempt is not blocked, but the count keeps
//! growing rather than resetting.
//!
//! Time is passed in by the caller so tests can move the clock freely.

use crate::config::RateLimitConfig;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_submissions: u32,
    window: Duration,
    last_submit: Option<Instant>,
    count: u32,
}

impl RateLimiter {
    pub fn new(max_submissions: u32, window: Duration) -> Self {
        Self {
            max_submissions,
            window,
            last_submit: None,
            count: 0,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_submissions, Duration::from_secs(config.window_secs))
    }

    /// Whether an attempt at `now` must be rejected.
    pub fn is_limited(&self, now: Instant) -> bool {
        match self.last_submit {
            Some(last) => {
                now.saturating_duration_since(last) < self.window
                    && self.count >= self.max_submissions
            }
            None => false,
        }
    }

    /// Record an accepted submission at `now`.
    pub fn record(&mut self, now: Instant) {
        let expired = match self.last_submit {
            Some(last) => now.saturating_duration_since(last) > self.window,
            None => true,
        };
        self.count = if expired { 1 } else { self.count + 1 };
        self.last_submit = Some(now);
    }

    /// Submissions counted in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}
