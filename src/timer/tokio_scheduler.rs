//! Tokio-backed scheduler.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use super::{Scheduler, TimerError, TimerTask};

/// Production scheduler that runs each task on a tokio runtime.
///
/// Every scheduled task becomes a spawned tokio task that sleeps for the
/// requested delay and then runs. Cancelling aborts the spawned task.
///
/// A panic inside a task unwinds that tokio task only. Tokio reports it
/// through the panic hook; the runtime and the gate keep working.
///
/// # Example
///
/// ```
/// use rategate::timer::TokioScheduler;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler = TokioScheduler::current().unwrap();
/// # let _ = scheduler;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    /// Binds a scheduler to the runtime of the calling context.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> Result<Self, TimerError> {
        Handle::try_current()
            .map(Self::from_handle)
            .map_err(|_| TimerError::NoRuntime)
    }

    /// Binds a scheduler to an explicit runtime handle.
    #[must_use]
    pub const fn from_handle(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Scheduler for TokioScheduler {
    type Handle = AbortHandle;

    fn schedule_after(&self, delay: Duration, task: TimerTask) -> AbortHandle {
        self.runtime
            .spawn(async move {
                tokio::time::sleep(delay).await;
                task();
            })
            .abort_handle()
    }

    fn cancel(&self, handle: AbortHandle) {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> TimerTask {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn current_fails_outside_runtime() {
        let result = TokioScheduler::current();
        assert!(matches!(result, Err(TimerError::NoRuntime)));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_task_after_delay() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let _handle = scheduler.schedule_after(Duration::from_millis(100), counting_task(&counter));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_task_never_runs() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule_after(Duration::from_millis(50), counting_task(&counter));
        scheduler.cancel(handle);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_run_is_harmless() {
        let scheduler = TokioScheduler::current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.schedule_after(Duration::from_millis(10), counting_task(&counter));
        tokio::time::sleep(Duration::from_millis(20)).await;
        scheduler.cancel(handle);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
