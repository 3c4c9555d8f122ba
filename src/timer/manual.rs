//! Virtual clock and timer queue for deterministic tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use super::{Scheduler, TimerTask};
use crate::time::Clock;

/// A virtual timeline that is both a [`Clock`] and a [`Scheduler`].
///
/// Time only moves when [`advance`](Self::advance) is called. Timers due
/// within the advanced span fire in due order, each one on the caller's
/// thread with the clock set to its due time. This makes gate behavior fully
/// deterministic: a panic in a fired task propagates out of `advance`.
///
/// Timers run on a monotonic axis. [`set_wall_clock`](Self::set_wall_clock)
/// moves only what [`Clock::now`] reports, which models a host whose wall
/// clock jumps while its timers keep counting real elapsed time.
///
/// Clones share the same timeline.
///
/// # Example
///
/// ```
/// use rategate::time::Clock;
/// use rategate::timer::{ManualTimeline, Scheduler};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::time::Duration;
///
/// let timeline = ManualTimeline::new();
/// let fired = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&fired);
/// timeline.schedule_after(Duration::from_millis(100), Box::new(move || {
///     flag.store(true, Ordering::SeqCst);
/// }));
///
/// timeline.advance(Duration::from_millis(100));
/// assert!(fired.load(Ordering::SeqCst));
/// ```
#[derive(Clone, Default)]
pub struct ManualTimeline {
    inner: Arc<Mutex<TimelineState>>,
}

/// Handle to a timer scheduled on a [`ManualTimeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ManualTimer {
    due: Duration,
    id: u64,
}

struct TimelineState {
    /// Monotonic time since the timeline started.
    elapsed: Duration,
    /// What the clock reports.
    wall: SystemTime,
    next_id: u64,
    queue: BTreeMap<ManualTimer, TimerTask>,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            wall: SystemTime::UNIX_EPOCH,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }
}

impl TimelineState {
    fn move_to(&mut self, elapsed: Duration) {
        self.wall += elapsed.saturating_sub(self.elapsed);
        self.elapsed = elapsed;
    }
}

impl ManualTimeline {
    /// Creates a timeline whose clock starts at `UNIX_EPOCH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timeline whose clock starts at `start`.
    #[must_use]
    pub fn starting_at(start: SystemTime) -> Self {
        let timeline = Self::new();
        timeline.lock().wall = start;
        timeline
    }

    /// Time elapsed on the monotonic axis since the timeline started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Number of timers scheduled and not yet fired or cancelled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.lock().queue.len()
    }

    /// Delay until the earliest pending timer, if any.
    #[must_use]
    pub fn next_due_in(&self) -> Option<Duration> {
        let state = self.lock();
        state
            .queue
            .keys()
            .next()
            .map(|timer| timer.due.saturating_sub(state.elapsed))
    }

    /// Moves time forward by `by`, firing every timer that falls due.
    ///
    /// Tasks scheduled by fired tasks also fire if they fall due within
    /// the same span.
    pub fn advance(&self, by: Duration) {
        let target = self.lock().elapsed + by;

        while let Some(task) = self.pop_due(target) {
            task();
        }

        self.lock().move_to(target);
    }

    /// Sets the time reported by [`Clock::now`] without firing timers.
    ///
    /// Moving the wall clock backward or forward does not change when
    /// pending timers fire.
    pub fn set_wall_clock(&self, wall: SystemTime) {
        self.lock().wall = wall;
    }

    fn pop_due(&self, target: Duration) -> Option<TimerTask> {
        let mut state = self.lock();
        let (&timer, _) = state.queue.iter().next()?;
        if timer.due > target {
            return None;
        }
        let task = state.queue.remove(&timer)?;
        state.move_to(timer.due);
        Some(task)
    }

    fn lock(&self) -> MutexGuard<'_, TimelineState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for ManualTimeline {
    fn now(&self) -> SystemTime {
        self.lock().wall
    }
}

impl Scheduler for ManualTimeline {
    type Handle = ManualTimer;

    fn schedule_after(&self, delay: Duration, task: TimerTask) -> ManualTimer {
        let mut state = self.lock();
        let timer = ManualTimer {
            due: state.elapsed + delay,
            id: state.next_id,
        };
        state.next_id += 1;
        state.queue.insert(timer, task);
        timer
    }

    fn cancel(&self, handle: ManualTimer) {
        self.lock().queue.remove(&handle);
    }
}

impl fmt::Debug for ManualTimeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualTimeline")
            .field("elapsed", &state.elapsed)
            .field("wall", &state.wall)
            .field("pending_timers", &state.queue.len())
            .finish()
    }
}
