//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use crate::gate::Mode;

use super::OutputFormat;

/// Default gate mode.
pub const MODE: Mode = Mode::Debounce;

/// Default wait window in milliseconds.
pub const WAIT_MS: i64 = 300;

/// Default trailing-edge setting for both modes.
pub const TRAILING: bool = true;

/// Default output format.
pub const FORMAT: OutputFormat = OutputFormat::Text;

/// Default config file name written by `init`.
pub const CONFIG_FILE: &str = "rategate.toml";

/// Default leading-edge setting for a mode.
///
/// Throttle fires on the leading edge, debounce waits for the calls to settle.
#[must_use]
pub const fn leading(mode: Mode) -> bool {
    matches!(mode, Mode::Throttle)
}
