//! Edge policy: the configuration that turns a gate into a debouncer or a throttler.

use std::fmt;
use std::time::Duration;

/// Which rate-limiting behavior a gate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Invoke after calls stop for `wait` (optionally at least every `max_wait`).
    Debounce,
    /// Invoke at most once per `wait`.
    Throttle,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debounce => write!(f, "debounce"),
            Self::Throttle => write!(f, "throttle"),
        }
    }
}

/// Policy controlling when a gate invokes its wrapped function.
///
/// # Edges
///
/// | `leading` | `trailing` | Behavior |
/// |-----------|------------|----------|
/// | false | true | Invoke once calls settle (classic debounce) |
/// | true | false | Invoke on the first call of a window only |
/// | true | true | Invoke on both edges (classic throttle) |
/// | false | false | Never invoke (permitted, not rejected) |
///
/// # Normalization
///
/// Invalid combinations are normalized instead of rejected:
/// - `max_wait` shorter than `wait` is raised to `wait`
/// - `max_wait` is dropped for [`Mode::Throttle`]
///
/// # Example
///
/// ```
/// use rategate::gate::EdgePolicy;
/// use std::time::Duration;
///
/// let search = EdgePolicy::debounce(Duration::from_millis(300))
///     .with_max_wait(Duration::from_secs(1));
/// assert_eq!(search.max_wait(), Some(Duration::from_secs(1)));
///
/// let scroll = EdgePolicy::throttle(Duration::from_millis(100)).with_trailing(false);
/// assert!(scroll.leading());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePolicy {
    mode: Mode,
    wait: Duration,
    max_wait: Option<Duration>,
    leading: bool,
    trailing: bool,
}

impl EdgePolicy {
    /// Debounce policy: trailing edge only, no `max_wait`.
    #[must_use]
    pub const fn debounce(wait: Duration) -> Self {
        Self {
            mode: Mode::Debounce,
            wait,
            max_wait: None,
            leading: false,
            trailing: true,
        }
    }

    /// Throttle policy: both edges.
    #[must_use]
    pub const fn throttle(wait: Duration) -> Self {
        Self {
            mode: Mode::Throttle,
            wait,
            max_wait: None,
            leading: true,
            trailing: true,
        }
    }

    /// Creates the default policy for `mode`.
    #[must_use]
    pub const fn for_mode(mode: Mode, wait: Duration) -> Self {
        match mode {
            Mode::Debounce => Self::debounce(wait),
            Mode::Throttle => Self::throttle(wait),
        }
    }

    /// Creates a policy from signed millisecond values.
    ///
    /// Negative values clamp to zero. `max_wait_ms` is then normalized as
    /// by [`with_max_wait`](Self::with_max_wait).
    #[must_use]
    pub fn from_millis(mode: Mode, wait_ms: i64, max_wait_ms: Option<i64>) -> Self {
        let policy = Self::for_mode(mode, clamp_millis(wait_ms));
        match max_wait_ms {
            Some(max_wait_ms) => policy.with_max_wait(clamp_millis(max_wait_ms)),
            None => policy,
        }
    }

    /// Sets whether the leading edge invokes.
    #[must_use]
    pub const fn with_leading(mut self, leading: bool) -> Self {
        self.leading = leading;
        self
    }

    /// Sets whether the trailing edge invokes.
    #[must_use]
    pub const fn with_trailing(mut self, trailing: bool) -> Self {
        self.trailing = trailing;
        self
    }

    /// Sets the upper bound on how long invocation can be deferred.
    ///
    /// Raised to `wait` if shorter. Ignored for [`Mode::Throttle`].
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = match self.mode {
            Mode::Debounce => Some(max_wait.max(self.wait)),
            Mode::Throttle => None,
        };
        self
    }

    /// The rate-limiting behavior.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Minimum spacing between invocations.
    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Upper bound on deferral, debounce only.
    #[must_use]
    pub const fn max_wait(&self) -> Option<Duration> {
        self.max_wait
    }

    /// Whether the leading edge invokes.
    #[must_use]
    pub const fn leading(&self) -> bool {
        self.leading
    }

    /// Whether the trailing edge invokes.
    #[must_use]
    pub const fn trailing(&self) -> bool {
        self.trailing
    }
}

impl Default for EdgePolicy {
    /// Debounce with a zero wait.
    fn default() -> Self {
        Self::debounce(Duration::ZERO)
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {{ wait: {}ms, leading: {}, trailing: {}",
            self.mode,
            self.wait.as_millis(),
            self.leading,
            self.trailing,
        )?;
        if let Some(max_wait) = self.max_wait {
            write!(f, ", max_wait: {}ms", max_wait.as_millis())?;
        }
        write!(f, " }}")
    }
}

fn clamp_millis(millis: i64) -> Duration {
    Duration::from_millis(u64::try_from(millis).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn debounce_defaults_to_trailing_only() {
        let policy = EdgePolicy::debounce(ms(300));

        assert_eq!(policy.mode(), Mode::Debounce);
        assert_eq!(policy.wait(), ms(300));
        assert!(!policy.leading());
        assert!(policy.trailing());
        assert_eq!(policy.max_wait(), None);
    }

    #[test]
    fn throttle_defaults_to_both_edges() {
        let policy = EdgePolicy::throttle(ms(100));

        assert_eq!(policy.mode(), Mode::Throttle);
        assert!(policy.leading());
        assert!(policy.trailing());
    }

    #[test]
    fn default_is_zero_wait_debounce() {
        assert_eq!(EdgePolicy::default(), EdgePolicy::debounce(Duration::ZERO));
    }

    #[test]
    fn max_wait_below_wait_is_raised() {
        let policy = EdgePolicy::debounce(ms(200)).with_max_wait(ms(50));
        assert_eq!(policy.max_wait(), Some(ms(200)));
    }

    #[test]
    fn max_wait_is_dropped_for_throttle() {
        let policy = EdgePolicy::throttle(ms(100)).with_max_wait(ms(500));
        assert_eq!(policy.max_wait(), None);
    }

    #[test]
    fn both_edges_disabled_is_permitted() {
        let policy = EdgePolicy::debounce(ms(10))
            .with_leading(false)
            .with_trailing(false);

        assert!(!policy.leading());
        assert!(!policy.trailing());
    }

    #[test]
    fn from_millis_clamps_negative_values() {
        let policy = EdgePolicy::from_millis(Mode::Debounce, -5, Some(-10));

        assert_eq!(policy.wait(), Duration::ZERO);
        assert_eq!(policy.max_wait(), Some(Duration::ZERO));
    }

    #[test]
    fn from_millis_keeps_valid_values() {
        let policy = EdgePolicy::from_millis(Mode::Debounce, 100, Some(400));

        assert_eq!(policy.wait(), ms(100));
        assert_eq!(policy.max_wait(), Some(ms(400)));
    }

    #[test]
    fn from_millis_uses_mode_defaults() {
        let policy = EdgePolicy::from_millis(Mode::Throttle, 50, None);
        assert_eq!(policy, EdgePolicy::throttle(ms(50)));
    }

    #[test]
    fn display_includes_max_wait_when_set() {
        let policy = EdgePolicy::debounce(ms(100)).with_max_wait(ms(300));
        assert_eq!(
            policy.to_string(),
            "debounce { wait: 100ms, leading: false, trailing: true, max_wait: 300ms }"
        );
    }

    #[test]
    fn display_omits_absent_max_wait() {
        let policy = EdgePolicy::throttle(ms(20));
        assert_eq!(
            policy.to_string(),
            "throttle { wait: 20ms, leading: true, trailing: true }"
        );
    }
}
