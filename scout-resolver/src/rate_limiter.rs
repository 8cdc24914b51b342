//! Fixed-window limiter for outbound fetch attempts
//!
//! Never waits: a denied caller skips the network tier and falls back to its
//! dataset profile.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Duration, Utc};
use scout_common::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Request count for the current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub request_count: u32,
    pub reset_at: DateTime<Utc>,
}

/// Fixed-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<RateWindow>,
    max_requests: u32,
    period: Duration,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, period: Duration, clock: Arc<dyn Clock>) -> Self {
        let reset_at = clock.now() + period;
        Self {
            window: Mutex::new(RateWindow {
                request_count: 0,
                reset_at,
            }),
            max_requests,
            period,
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.max_requests, config.window(), clock)
    }

    /// Take one request slot if the current window has room
    pub async fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut window = self.window.lock().await;

        if now > window.reset_at {
            window.request_count = 0;
            window.reset_at = now + self.period;
        }

        if window.request_count < self.max_requests {
            window.request_count += 1;
            true
        } else {
            debug!(
                max_requests = self.max_requests,
                reset_at = %window.reset_at,
                "Rate window exhausted"
            );
            false
        }
    }

    /// Current window state
    pub async fn snapshot(&self) -> RateWindow {
        *self.window.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_common::ManualClock;

    fn limiter(max: u32) -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = RateLimiter::new(max, Duration::seconds(60), clock.clone());
        (clock, limiter)
    }

    #[tokio::test]
    async fn test_denies_after_max_within_window() {
        let (_clock, limiter) = limiter(2);

        assert!(limiter.try_acquire().await);
        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);

        // Denials do not consume slots
        assert_eq!(limiter.snapshot().await.request_count, 2);
    }

    #[tokio::test]
    async fn test_window_resets_after_period() {
        let (clock, limiter) = limiter(1);

        assert!(limiter.try_acquire().await);
        assert!(!limiter.try_acquire().await);

        // Exactly at the boundary the window is still live
        clock.advance(Duration::seconds(60));
        assert!(!limiter.try_acquire().await);

        clock.advance(Duration::seconds(1));
        assert!(limiter.try_acquire().await);
        assert_eq!(limiter.snapshot().await.request_count, 1);
    }

    #[tokio::test]
    async fn test_zero_max_always_denies() {
        let (_clock, limiter) = limiter(0);
        assert!(!limiter.try_acquire().await);
    }
}
