//! rategate: debounce and throttle for arbitrary functions
//!
//! A library for wrapping a function in an [`InvocationGate`](gate::InvocationGate)
//! that decides, call by call, whether to run it now, later, or not at all.
//! Time and timers are injected through [`time::Clock`] and
//! [`timer::Scheduler`], so gated code runs the same against tokio or a
//! virtual [`ManualTimeline`](timer::ManualTimeline).
//!
//! ```no_run
//! # async fn demo() -> Result<(), rategate::timer::TimerError> {
//! use std::time::Duration;
//!
//! let save = rategate::gate::debounce(Duration::from_millis(300), |doc: String| doc.len())?;
//! save.call("draft 1".to_string());
//! save.call("draft 2".to_string());
//! // Runs once, 300ms after the last call, with "draft 2".
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod gate;
pub mod time;
pub mod timer;
