//! Invocation gates: debounce and throttle for arbitrary functions.
//!
//! This module provides types and functions for:
//! - Configuring edge behavior ([`EdgePolicy`], [`Mode`])
//! - Wrapping a function in a rate-limited gate ([`InvocationGate`], [`WeakGate`])
//! - Tokio-backed shorthands ([`debounce`], [`throttle`])
//!
//! # Semantics
//!
//! A gate records every call and keeps at most one timer armed. On each
//! call it either invokes immediately (leading edge, or a tight loop that
//! exceeded its window) or leaves the invocation to the timer (trailing
//! edge), which runs with the arguments of the latest call.
//!
//! | Operation | Idle gate | Armed gate |
//! |-----------|-----------|------------|
//! | `call` | Arms timer, invokes if `leading` | Replaces pending arguments |
//! | timer fires | - | Trailing edge, or re-arm if the window moved |
//! | `flush` | Returns cached result | Runs trailing edge now |
//! | `cancel` | No-op | Disarms, drops pending arguments |

mod controller;
mod policy;
mod timing;


pub use controller::{InvocationGate, WeakGate};
pub use policy::{EdgePolicy, Mode};

use std::time::Duration;

use crate::timer::TimerError;

/// Debounces `func` on the current tokio runtime.
///
/// Shorthand for [`InvocationGate::new`] with [`EdgePolicy::debounce`].
///
/// # Errors
///
/// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
pub fn debounce<A, R, F>(wait: Duration, func: F) -> Result<InvocationGate<A, R>, TimerError>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    InvocationGate::new(EdgePolicy::debounce(wait), func)
}

/// Throttles `func` on the current tokio runtime.
///
/// Shorthand for [`InvocationGate::new`] with [`EdgePolicy::throttle`].
///
/// # Errors
///
/// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
pub fn throttle<A, R, F>(wait: Duration, func: F) -> Result<InvocationGate<A, R>, TimerError>
where
    A: Send + 'static,
    R: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    InvocationGate::new(EdgePolicy::throttle(wait), func)
}
