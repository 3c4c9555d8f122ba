//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Gate configuration section
    #[serde(default)]
    pub gate: GateSection,

    /// Output configuration section
    #[serde(default)]
    pub output: OutputSection,
}

/// Gate configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateSection {
    /// Gate mode: "debounce" or "throttle"
    pub mode: Option<String>,

    /// Wait window in milliseconds
    pub wait_ms: Option<i64>,

    /// Maximum deferral in milliseconds (debounce only)
    pub max_wait_ms: Option<i64>,

    /// Emit on the leading edge
    pub leading: Option<bool>,

    /// Emit on the trailing edge
    pub trailing: Option<bool>,
}

/// Output configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Output format: "text" or "json"
    pub format: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# rategate configuration file

[gate]
# Gate mode: "debounce" or "throttle" (default: debounce)
mode = "debounce"

# Wait window in milliseconds (default: 300, negative values are treated as 0)
wait_ms = 300

# Longest a pending line may be deferred, in milliseconds.
# Debounce only; values below wait_ms are raised to wait_ms.
# max_wait_ms = 1000

# Emit on the leading edge (default: false for debounce, true for throttle)
# leading = false

# Emit on the trailing edge (default: true)
# trailing = true

[output]
# Output format: "text" or "json" (default: text)
format = "text"
"#
    .to_string()
}
