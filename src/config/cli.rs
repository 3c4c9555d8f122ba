//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::gate::Mode;

use super::OutputFormat;

/// rategate: debounce or throttle a stream of lines
///
/// Reads lines from stdin, treats each one as a call, and writes the
/// lines the gate actually lets through to stdout.
#[derive(Debug, Parser)]
#[command(name = "rategate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Gate mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Wait window in milliseconds (negative values are treated as 0)
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub wait: Option<i64>,

    /// Longest a pending line may be deferred, in milliseconds (debounce only)
    #[arg(long = "max-wait", value_name = "MS", allow_negative_numbers = true)]
    pub max_wait: Option<i64>,

    /// Emit on the leading edge of a window
    #[arg(long, value_name = "BOOL")]
    pub leading: Option<bool>,

    /// Emit on the trailing edge of a window
    #[arg(long, value_name = "BOOL")]
    pub trailing: Option<bool>,

    /// Output format for emitted lines
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Path to configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Subcommands for rategate
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = super::defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

/// Gate mode argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Emit once the input has been quiet for the wait window
    Debounce,
    /// Emit at most once per wait window
    Throttle,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Debounce => Self::Debounce,
            ModeArg::Throttle => Self::Throttle,
        }
    }
}

/// Output format argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// The emitted line as-is
    Text,
    /// One JSON object per emitted line
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }
}
