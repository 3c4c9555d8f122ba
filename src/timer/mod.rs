//! Timer facilities for deferred gate invocations.
//!
//! This module provides:
//! - The [`Scheduler`] trait: run a task once after a delay, with cancellation
//! - A tokio-backed scheduler for production ([`TokioScheduler`])
//! - A virtual clock and timer queue for deterministic tests ([`ManualTimeline`])
//! - Error handling ([`TimerError`])

mod error;
mod manual;
mod tokio_scheduler;

#[cfg(test)]
mod manual_tests;

pub use error::TimerError;
pub use manual::{ManualTimeline, ManualTimer};
pub use tokio_scheduler::TokioScheduler;

use std::time::Duration;

/// A one-shot task run when a timer expires.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Deferred-execution primitive consumed by gates.
///
/// A scheduler runs each task at most once, no earlier than `delay` after
/// it was scheduled. Precision is best-effort and bounded below by the
/// facility's own timer granularity.
///
/// # Implementation Notes
///
/// `cancel` must be safe to call with a handle whose task already ran
/// or is currently running. Gates do not rely on `cancel` winning such a
/// race; they discard stale expiries themselves.
pub trait Scheduler: Send + Sync {
    /// Handle identifying one scheduled task.
    type Handle: Send;

    /// Schedules `task` to run once after `delay`.
    fn schedule_after(&self, delay: Duration, task: TimerTask) -> Self::Handle;

    /// Cancels a scheduled task if it has not run yet.
    fn cancel(&self, handle: Self::Handle);
}
