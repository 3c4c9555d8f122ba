//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;

use crate::gate::{EdgePolicy, Mode};

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// How emitted lines are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The line exactly as it was read.
    Text,
    /// `{"seq": n, "line": "...", "elapsed_ms": m}` per line.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// Out-of-range timings are normalized by [`EdgePolicy::from_millis`] rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Gate policy applied to every input line
    pub policy: EdgePolicy,

    /// Output format for emitted lines
    pub format: OutputFormat,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Config {{ {}, format: {} }}", self.policy, self.format)
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML `mode` or `format` is not a recognized value.
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let mode = Self::resolve_mode(cli, toml)?;
        let format = Self::resolve_format(cli, toml)?;

        let gate = toml.map(|t| &t.gate);
        let wait_ms = cli
            .wait
            .or_else(|| gate.and_then(|g| g.wait_ms))
            .unwrap_or(defaults::WAIT_MS);
        let max_wait_ms = cli.max_wait.or_else(|| gate.and_then(|g| g.max_wait_ms));

        // Unset edges fall back to the mode's defaults
        let leading = cli
            .leading
            .or_else(|| gate.and_then(|g| g.leading))
            .unwrap_or(defaults::leading(mode));
        let trailing = cli
            .trailing
            .or_else(|| gate.and_then(|g| g.trailing))
            .unwrap_or(defaults::TRAILING);

        let policy = EdgePolicy::from_millis(mode, wait_ms, max_wait_ms)
            .with_leading(leading)
            .with_trailing(trailing);

        Ok(Self {
            policy,
            format,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_mode(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Mode, ConfigError> {
        if let Some(mode) = cli.mode {
            return Ok(mode.into());
        }

        toml.and_then(|t| t.gate.mode.as_deref())
            .map_or(Ok(defaults::MODE), parse_mode)
    }

    fn resolve_format(cli: &Cli, toml: Option<&TomlConfig>) -> Result<OutputFormat, ConfigError> {
        if let Some(format) = cli.format {
            return Ok(format.into());
        }

        toml.and_then(|t| t.output.format.as_deref())
            .map_or(Ok(defaults::FORMAT), parse_format)
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_mode(s: &str) -> Result<Mode, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "debounce" => Ok(Mode::Debounce),
        "throttle" => Ok(Mode::Throttle),
        _ => Err(ConfigError::InvalidMode {
            value: s.to_string(),
        }),
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, ConfigError> {
    match s.trim().to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(ConfigError::InvalidFormat {
            value: s.to_string(),
        }),
    }
}
