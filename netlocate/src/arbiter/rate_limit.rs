//! Minimum-interval throttle for dispatched lookups.

use std::time::Duration;

use tokio::time::Instant;

/// Remembers when the last dispatch attempt finished.
///
/// The stamp is written only when an attempt completes. Rejected triggers
/// never touch it, so they cannot extend the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateLimiter {
    last_dispatch: Option<Instant>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dispatch may start at `now`.
    ///
    /// True when nothing has been dispatched yet or at least `min_interval`
    /// has passed since `last_dispatch`.
    pub fn allow(now: Instant, last_dispatch: Option<Instant>, min_interval: Duration) -> bool {
        match last_dispatch {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= min_interval,
        }
    }

    /// [`RateLimiter::allow`] against this limiter's own stamp.
    pub fn permits(&self, now: Instant, min_interval: Duration) -> bool {
        Self::allow(now, self.last_dispatch, min_interval)
    }

    /// Time left before a dispatch is allowed, zero if allowed now.
    pub fn remaining(&self, now: Instant, min_interval: Duration) -> Duration {
        self.last_dispatch
            .map(|last| min_interval.saturating_sub(now.saturating_duration_since(last)))
            .unwrap_or(Duration::ZERO)
    }

    /// Record the completion of a dispatch attempt.
    pub fn stamp(&mut self, now: Instant) {
        self.last_dispatch = Some(now);
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }
}
