//! The invocation gate: per-function state machine behind debounce and throttle.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, SystemTime};

use super::policy::{EdgePolicy, Mode};
use super::timing::Timing;
use crate::time::{Clock, SystemClock};
use crate::timer::{Scheduler, TimerError, TokioScheduler};

/// Shared form of the wrapped function: optional receiver, then arguments.
type GateFn<A, R, Recv> = dyn Fn(Option<Recv>, A) -> R + Send + Sync;

/// Rate-limited wrapper around one function.
///
/// Every [`call`](Self::call) is recorded; whether and when the wrapped
/// function actually runs is decided by the gate's [`EdgePolicy`]. A call
/// returns the result of the most recent completed invocation, which may
/// predate the arguments just passed in.
///
/// # States
///
/// | State | Meaning |
/// |-------|---------|
/// | Idle | No timer armed; the next call starts a new window |
/// | Armed | Exactly one timer armed; it runs the trailing edge when it fires |
///
/// Only the latest call's arguments are kept while armed (last call wins).
///
/// # Sharing
///
/// Clones are handles to the same gate. Dropping the last handle cancels
/// the armed timer; timer tasks never keep a gate alive. The wrapped
/// function runs without any gate lock held, so it may call back into the
/// gate (use [`downgrade`](Self::downgrade) to avoid a reference cycle).
///
/// # Example
///
/// ```
/// use rategate::gate::{EdgePolicy, InvocationGate};
/// use rategate::timer::ManualTimeline;
/// use std::time::Duration;
///
/// let timeline = ManualTimeline::new();
/// let gate = InvocationGate::with_parts(
///     EdgePolicy::debounce(Duration::from_millis(100)),
///     timeline.clone(),
///     timeline.clone(),
///     |_receiver: Option<()>, text: &str| text.len(),
/// );
///
/// gate.call("a");
/// gate.call("abc");
/// assert_eq!(gate.last_result(), None);
///
/// timeline.advance(Duration::from_millis(100));
/// assert_eq!(gate.last_result(), Some(3));
/// ```
pub struct InvocationGate<A, R, Recv = (), C = SystemClock, S: Scheduler = TokioScheduler> {
    inner: Arc<Inner<A, R, Recv, C, S>>,
}

/// Non-owning handle to an [`InvocationGate`].
///
/// Lets the wrapped function reach its own gate without keeping it alive.
pub struct WeakGate<A, R, Recv = (), C = SystemClock, S: Scheduler = TokioScheduler> {
    inner: Weak<Inner<A, R, Recv, C, S>>,
}

struct Inner<A, R, Recv, C, S: Scheduler> {
    policy: EdgePolicy,
    clock: C,
    scheduler: S,
    func: Box<GateFn<A, R, Recv>>,
    state: Mutex<GateState<A, R, Recv, S::Handle>>,
}

/// Arguments captured by the most recent call.
struct Pending<A, Recv> {
    args: A,
    receiver: Option<Recv>,
}

/// The one armed timer.
struct Armed<H> {
    generation: u64,
    handle: H,
}

struct GateState<A, R, Recv, H> {
    timing: Timing,
    pending: Option<Pending<A, Recv>>,
    timer: Option<Armed<H>>,
    result: Option<R>,
    /// Sequence number of the invocation that produced `result`.
    result_seq: u64,
    next_seq: u64,
    /// Bumped on every arm; expiries carrying an older value are stale.
    generation: u64,
}

/// What to do once the state lock is released.
enum Step<A, R, Recv> {
    Cached(Option<R>),
    Invoke { seq: u64, pending: Pending<A, Recv> },
}

impl<A, R, Recv, H> GateState<A, R, Recv, H>
where
    R: Clone,
{
    const fn new() -> Self {
        Self {
            timing: Timing {
                last_call: None,
                last_invoke: None,
            },
            pending: None,
            timer: None,
            result: None,
            result_seq: 0,
            next_seq: 1,
            generation: 0,
        }
    }

    fn cached(&self) -> Step<A, R, Recv> {
        Step::Cached(self.result.clone())
    }

    /// Consumes the pending arguments for an invocation at `now`.
    fn begin_invoke(&mut self, now: SystemTime) -> Step<A, R, Recv> {
        let Some(pending) = self.pending.take() else {
            return self.cached();
        };
        self.timing.last_invoke = Some(now);
        let seq = self.next_seq;
        self.next_seq += 1;
        Step::Invoke { seq, pending }
    }

    /// Stores a result unless a later-started invocation already did.
    fn store_result(&mut self, seq: u64, result: R) {
        if seq >= self.result_seq {
            self.result = Some(result);
            self.result_seq = seq;
        }
    }
}

impl<A, R> InvocationGate<A, R>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    /// Creates a gate on the current tokio runtime using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
    pub fn new<F>(policy: EdgePolicy, func: F) -> Result<Self, TimerError>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::with_receiver(policy, move |_receiver: Option<()>, args| func(args))
    }
}

impl<A, R, Recv> InvocationGate<A, R, Recv>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    Recv: Send + 'static,
{
    /// Creates a gate whose function also receives the caller's receiver.
    ///
    /// The receiver is `Some` for [`call_with`](Self::call_with) and `None`
    /// for [`call`](Self::call).
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
    pub fn with_receiver<F>(policy: EdgePolicy, func: F) -> Result<Self, TimerError>
    where
        F: Fn(Option<Recv>, A) -> R + Send + Sync + 'static,
    {
        let scheduler = TokioScheduler::current()?;
        Ok(Self::with_parts(policy, SystemClock, scheduler, func))
    }
}

impl<A, R, Recv, C, S> InvocationGate<A, R, Recv, C, S>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    Recv: Send + 'static,
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    /// Creates a gate with explicit clock and scheduler.
    pub fn with_parts<F>(policy: EdgePolicy, clock: C, scheduler: S, func: F) -> Self
    where
        F: Fn(Option<Recv>, A) -> R + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                policy,
                clock,
                scheduler,
                func: Box::new(func),
                state: Mutex::new(GateState::new()),
            }),
        }
    }

    /// Records a call with no receiver.
    ///
    /// Returns the result of the latest invocation, which is this call's
    /// own result only if the call invoked immediately.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the wrapped function when this call invokes it.
    pub fn call(&self, args: A) -> Option<R> {
        self.inner.call(None, args)
    }

    /// Records a call carrying an explicit receiver.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the wrapped function when this call invokes it.
    pub fn call_with(&self, receiver: Recv, args: A) -> Option<R> {
        self.inner.call(Some(receiver), args)
    }

    /// Drops the pending call and resets all timing state.
    ///
    /// The cached result is kept. Calling it while idle is a no-op.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    /// Runs the pending trailing edge now, if a timer is armed.
    ///
    /// Returns the cached result, updated if the flush invoked.
    ///
    /// # Panics
    ///
    /// Propagates a panic from the wrapped function when the flush invokes it.
    pub fn flush(&self) -> Option<R> {
        self.inner.flush()
    }

    /// Whether a timer is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.lock().timer.is_some()
    }

    /// Result of the most recent invocation, if any.
    #[must_use]
    pub fn last_result(&self) -> Option<R> {
        self.inner.lock().result.clone()
    }

    /// The policy this gate was built with.
    #[must_use]
    pub fn policy(&self) -> EdgePolicy {
        self.inner.policy
    }

    /// Creates a non-owning handle to this gate.
    #[must_use]
    pub fn downgrade(&self) -> WeakGate<A, R, Recv, C, S> {
        WeakGate {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl<A, R, Recv, C, S: Scheduler> WeakGate<A, R, Recv, C, S> {
    /// Returns the gate if any strong handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<InvocationGate<A, R, Recv, C, S>> {
        self.inner.upgrade().map(|inner| InvocationGate { inner })
    }
}

impl<A, R, Recv, C, S> Inner<A, R, Recv, C, S>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    Recv: Send + 'static,
    C: Clock + 'static,
    S: Scheduler + 'static,
{
    fn lock(&self) -> MutexGuard<'_, GateState<A, R, Recv, S::Handle>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn call(self: &Arc<Self>, receiver: Option<Recv>, args: A) -> Option<R> {
        let step = {
            let mut state = self.lock();
            let now = self.clock.now();
            let eligible = state.timing.should_invoke(&self.policy, now);

            state.pending = Some(Pending { args, receiver });
            state.timing.last_call = Some(now);

            if eligible {
                self.eligible_call(&mut state, now)
            } else {
                if state.timer.is_none() {
                    self.arm(&mut state, self.policy.wait());
                }
                state.cached()
            }
        };

        self.complete(step)
    }

    fn eligible_call(
        self: &Arc<Self>,
        state: &mut GateState<A, R, Recv, S::Handle>,
        now: SystemTime,
    ) -> Step<A, R, Recv> {
        if state.timer.is_none() {
            tracing::trace!("Leading edge ({})", self.policy.mode());
            state.timing.last_invoke = Some(now);
            self.arm(state, self.policy.wait());
            return if self.policy.leading() {
                state.begin_invoke(now)
            } else {
                state.cached()
            };
        }

        // Eligible while a timer is still armed: calls are arriving in a
        // tight loop and the window has elapsed without the timer firing.
        let invoke_now = match self.policy.mode() {
            Mode::Debounce => self.policy.max_wait().is_some(),
            Mode::Throttle => self.policy.trailing(),
        };
        if !invoke_now {
            return state.cached();
        }

        tracing::trace!("Tight-loop invoke ({})", self.policy.mode());
        self.arm(state, self.policy.wait());
        state.begin_invoke(now)
    }

    fn cancel(&self) {
        let mut state = self.lock();
        if let Some(armed) = state.timer.take() {
            tracing::trace!("Cancelled armed timer");
            self.scheduler.cancel(armed.handle);
        }
        state.timing = Timing::default();
        state.pending = None;
    }

    fn flush(self: &Arc<Self>) -> Option<R> {
        let step = {
            let mut state = self.lock();
            let Some(armed) = state.timer.take() else {
                return state.result.clone();
            };
            self.scheduler.cancel(armed.handle);
            let now = self.clock.now();
            tracing::trace!("Flushing trailing edge");
            self.trailing_edge(&mut state, now)
        };

        self.complete(step)
    }

    fn on_timer(self: &Arc<Self>, generation: u64) {
        let step = {
            let mut state = self.lock();
            if state.timer.as_ref().map(|armed| armed.generation) != Some(generation) {
                tracing::trace!("Ignoring stale timer (generation {generation})");
                return;
            }

            // This timer has fired; drop its handle rather than cancel it.
            state.timer = None;
            let now = self.clock.now();

            if !state.timing.should_invoke(&self.policy, now) {
                let remaining = state.timing.remaining_wait(&self.policy, now);
                tracing::trace!("Timer fired early, re-arming for {}ms", remaining.as_millis());
                self.arm(&mut state, remaining);
                return;
            }

            self.trailing_edge(&mut state, now)
        };

        self.complete(step);
    }

    /// Runs the trailing edge. The caller has already disarmed the timer.
    fn trailing_edge(
        &self,
        state: &mut GateState<A, R, Recv, S::Handle>,
        now: SystemTime,
    ) -> Step<A, R, Recv> {
        if self.policy.trailing() && state.pending.is_some() {
            tracing::trace!("Trailing edge ({})", self.policy.mode());
            return state.begin_invoke(now);
        }
        state.pending = None;
        state.cached()
    }

    /// Arms the single timer, cancelling any previous one first.
    fn arm(self: &Arc<Self>, state: &mut GateState<A, R, Recv, S::Handle>, delay: Duration) {
        if let Some(previous) = state.timer.take() {
            self.scheduler.cancel(previous.handle);
        }

        state.generation += 1;
        let generation = state.generation;
        let gate = Arc::downgrade(self);
        let handle = self.scheduler.schedule_after(
            delay,
            Box::new(move || {
                if let Some(gate) = gate.upgrade() {
                    gate.on_timer(generation);
                }
            }),
        );

        state.timer = Some(Armed { generation, handle });
    }

    /// Runs the wrapped function if `step` asks for it, outside the lock.
    fn complete(&self, step: Step<A, R, Recv>) -> Option<R> {
        match step {
            Step::Cached(result) => result,
            Step::Invoke { seq, pending } => {
                let result = (self.func)(pending.receiver, pending.args);
                self.lock().store_result(seq, result.clone());
                Some(result)
            }
        }
    }
}

impl<A, R, Recv, C, S: Scheduler> Drop for Inner<A, R, Recv, C, S> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(armed) = state.timer.take() {
            self.scheduler.cancel(armed.handle);
        }
    }
}

impl<A, R, Recv, C, S: Scheduler> Clone for InvocationGate<A, R, Recv, C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R, Recv, C, S: Scheduler> Clone for WeakGate<A, R, Recv, C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<A, R, Recv, C, S: Scheduler> fmt::Debug for InvocationGate<A, R, Recv, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .timer
            .is_some();
        f.debug_struct("InvocationGate")
            .field("policy", &self.inner.policy)
            .field("pending", &pending)
            .finish_non_exhaustive()
    }
}

impl<A, R, Recv, C, S: Scheduler> fmt::Debug for WeakGate<A, R, Recv, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakGate")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
