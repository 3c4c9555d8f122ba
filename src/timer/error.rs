//! Error types for timer facilities.

use thiserror::Error;

/// Error type for setting up a timer facility.
///
/// Gates themselves never fail once constructed; this only covers
/// binding a scheduler to its host environment.
#[derive(Debug, Error)]
pub enum TimerError {
    /// No tokio runtime is available on the current thread.
    #[error("No tokio runtime available: gates using TokioScheduler must be created inside a runtime")]
    NoRuntime,
}
