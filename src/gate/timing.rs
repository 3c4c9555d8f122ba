//! Call/invoke timestamps and the eligibility rules derived from them.

use std::time::{Duration, SystemTime};

use super::policy::{EdgePolicy, Mode};

/// Timestamps a gate uses to decide when to invoke.
///
/// `None` means "never": an absent `last_invoke` counts as infinitely long
/// ago, an absent spacing anchor makes the next call eligible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Timing {
    /// Time of the most recent call to the gate.
    pub last_call: Option<SystemTime>,
    /// Time of the most recent leading edge or invocation.
    pub last_invoke: Option<SystemTime>,
}

impl Timing {
    /// Timestamp that `wait` is measured from.
    ///
    /// Debounce waits for calls to go quiet; throttle spaces invocations,
    /// so a steady stream of calls cannot starve it.
    const fn anchor(&self, mode: Mode) -> Option<SystemTime> {
        match mode {
            Mode::Debounce => self.last_call,
            Mode::Throttle => self.last_invoke,
        }
    }

    /// Whether a call or timer expiry at `now` may invoke.
    pub fn should_invoke(&self, policy: &EdgePolicy, now: SystemTime) -> bool {
        let Some(anchor) = self.anchor(policy.mode()) else {
            return true;
        };

        // A backward clock jump counts as the window having elapsed.
        let Ok(since_anchor) = now.duration_since(anchor) else {
            return true;
        };

        since_anchor >= policy.wait()
            || policy
                .max_wait()
                .is_some_and(|max_wait| self.invoke_overdue(max_wait, now))
    }

    /// Delay until the next expiry could be eligible.
    ///
    /// Only meaningful when [`should_invoke`](Self::should_invoke) is false.
    pub fn remaining_wait(&self, policy: &EdgePolicy, now: SystemTime) -> Duration {
        let since_anchor = elapsed_since(self.anchor(policy.mode()), now);
        let waiting = policy.wait().saturating_sub(since_anchor);

        match policy.max_wait() {
            Some(max_wait) => {
                let since_invoke = elapsed_since(self.last_invoke, now);
                waiting.min(max_wait.saturating_sub(since_invoke))
            }
            None => waiting,
        }
    }

    fn invoke_overdue(&self, max_wait: Duration, now: SystemTime) -> bool {
        self.last_invoke.is_none_or(|at| {
            now.duration_since(at)
                .is_ok_and(|since_invoke| since_invoke >= max_wait)
        })
    }
}

fn elapsed_since(at: Option<SystemTime>, now: SystemTime) -> Duration {
    at.and_then(|at| now.duration_since(at).ok())
        .unwrap_or_default()
}
