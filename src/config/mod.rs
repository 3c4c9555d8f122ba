//! Configuration layer for the `rategate` binary.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`], [`OutputFormat`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! Each field is resolved on its own, so a config file can set the mode while
//! `--wait` overrides only the window.
//!
//! # Mode-dependent defaults
//!
//! `leading` defaults to `false` for debounce and `true` for throttle. The
//! default is chosen after the mode is resolved, so `--mode throttle` with a
//! TOML file that never mentions `leading` still emits on the leading edge.
//!
//! `max_wait` applies to debounce only and is discarded in throttle mode.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod cli_tests;
#[cfg(test)]
mod toml_tests;

pub use cli::{Cli, Command, FormatArg, ModeArg};
pub use error::ConfigError;
pub use toml::{GateSection, OutputSection, TomlConfig, default_config_template};
pub use validated::{OutputFormat, ValidatedConfig, write_default_config};
