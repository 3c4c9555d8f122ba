//! Time abstraction for testability.
//!
//! This module provides a [`Clock`] trait that allows injecting controlled
//! clocks in tests while using the real system clock in production.
//!
//! Gates read time only through a [`Clock`], so the same gate logic runs
//! against the wall clock ([`SystemClock`]), tokio's pausable clock
//! ([`TokioClock`]), or a fully virtual timeline
//! ([`ManualTimeline`](crate::timer::ManualTimeline)).

use std::time::SystemTime;

/// Abstraction over system time for testability.
///
/// Implementations provide the current time, allowing tests to inject
/// controlled time values instead of relying on actual system time.
///
/// The returned time is not required to be monotonic. Gates treat a
/// backward jump as "enough time has passed".
///
/// # Example
///
/// ```
/// use rategate::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Production clock using actual system time.
///
/// This is the default clock implementation that delegates to
/// [`SystemTime::now()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Monotonic clock driven by [`tokio::time::Instant`].
///
/// Reports wall-clock-shaped timestamps (anchored at construction) that
/// advance with tokio's clock. Under `tokio::time::pause` the reported time
/// only moves when the runtime's clock is advanced, which keeps gate timing
/// and tokio timers in lockstep during tests.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin_wall: SystemTime,
    origin: tokio::time::Instant,
}

impl TokioClock {
    /// Creates a clock anchored at the current wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin_wall: SystemTime::now(),
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> SystemTime {
        self.origin_wall + self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn system_clock_returns_current_time() {
        let clock = SystemClock;
        let before = SystemTime::now();
        let result = clock.now();
        let after = SystemTime::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn clocks_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemClock>();
        assert_send_sync::<TokioClock>();
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_follows_paused_runtime() {
        let clock = TokioClock::new();
        let start = clock.now();

        tokio::time::advance(Duration::from_millis(250)).await;

        let elapsed = clock.now().duration_since(start).unwrap();
        assert_eq!(elapsed, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_clock_is_still_while_paused() {
        let clock = TokioClock::new();
        let first = clock.now();
        let second = clock.now();

        assert_eq!(first, second);
    }
}
