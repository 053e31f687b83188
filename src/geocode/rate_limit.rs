//! Minimum-interval throttle for external calls.

use std::time::{Duration, Instant};

/// Enforces a minimum wall-clock gap between consecutive calls.
///
/// Owned by one resolver and borrowed mutably per call, so the
/// check-then-update in [`RateLimiter::acquire`] cannot interleave.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_call: None }
    }

    /// How long the next call would have to wait right now.
    pub fn pending_delay(&self) -> Duration {
        match self.last_call {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Block until a call is allowed, then claim the slot.
    ///
    /// Returns the time spent sleeping.
    pub fn acquire(&mut self) -> Duration {
        let delay = self.pending_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.last_call = Some(Instant::now());
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_free() {
        let mut limiter = RateLimiter::new(Duration::from_secs(60));
        assert_eq!(limiter.acquire(), Duration::ZERO);
        assert!(limiter.pending_delay() > Duration::from_secs(59));
    }

    #[test]
    fn test_n_calls_span_at_least_n_minus_one_intervals() {
        let interval = Duration::from_millis(25);
        let mut limiter = RateLimiter::new(interval);
        let start = Instant::now();
        let n = 5;
        for _ in 0..n {
            limiter.acquire();
        }
        assert!(start.elapsed() >= interval * (n - 1));
    }

    #[test]
    fn test_no_wait_after_interval_elapsed() {
        let interval = Duration::from_millis(10);
        let mut limiter = RateLimiter::new(interval);
        limiter.acquire();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(limiter.pending_delay(), Duration::ZERO);
        assert_eq!(limiter.acquire(), Duration::ZERO);
    }

    #[test]
    fn test_zero_interval_never_sleeps() {
        let mut limiter = RateLimiter::new(Duration::ZERO);
        for _ in 0..3 {
            assert_eq!(limiter.acquire(), Duration::ZERO);
        }
    }
}
