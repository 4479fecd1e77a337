use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Capability domains shipped with fescall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// `add`, `subtract`
    Arithmetic,
    /// OS metrics and local file access
    System,
    /// Text statistics
    Text,
}

impl Domain {
    pub const VALUES: &[Domain] = &[Domain::Arithmetic, Domain::System, Domain::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Arithmetic => "arithmetic",
            Domain::System => "system",
            Domain::Text => "text",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arithmetic" => Ok(Domain::Arithmetic),
            "system" => Ok(Domain::System),
            "text" => Ok(Domain::Text),
            _ => Err(crate::Error::Config(ConfigError::InvalidDomain(s.to_string()).to_string())),
        }
    }
}

/// How result lines are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `name(args) = value`, one line per directive (default)
    #[default]
    Text,
    /// One JSON object per directive (JSON Lines)
    Json,
}

impl OutputFormat {
    pub const VALUES: &[OutputFormat] = &[OutputFormat::Text, OutputFormat::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(crate::Error::Config(ConfigError::InvalidOutputFormat(s.to_string()).to_string())),
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Echoed string arguments longer than this are cut and suffixed with "..."
    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

fn default_truncate_length() -> usize {
    30
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: OutputFormat::default(), truncate_length: default_truncate_length() }
    }
}

/// `[capabilities]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitiesConfig {
    /// Domains merged into the registry at startup
    #[serde(default = "default_domains")]
    pub domains: Vec<Domain>,

    /// Characters returned by `read_file`
    #[serde(default = "default_read_file_max_chars")]
    pub read_file_max_chars: usize,

    /// Entries returned by `list_files`
    #[serde(default = "default_list_files_limit")]
    pub list_files_limit: usize,
}

fn default_domains() -> Vec<Domain> {
    Domain::VALUES.to_vec()
}

fn default_read_file_max_chars() -> usize {
    500
}

fn default_list_files_limit() -> usize {
    20
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            read_file_max_chars: default_read_file_max_chars(),
            list_files_limit: default_list_files_limit(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Log directory; defaults to `~/.fescall/logs`
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "pretty", "compact" or "json"; detected from the terminal when unset
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub file: FileLoggingConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: None, file: FileLoggingConfig::default() }
    }
}

/// Root configuration structure for fescall.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub capabilities: CapabilitiesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        if self.capabilities.domains.is_empty() {
            return Err(Error::Config(ConfigError::NoDomains.to_string()));
        }

        if let Some(format) = &self.logging.format
            && !["pretty", "compact", "json"].contains(&format.to_lowercase().as_str())
        {
            return Err(Error::Config(ConfigError::InvalidLogFormat(format.clone()).to_string()));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# fescall configuration example

[output]
# "text" or "json"
format = "text"
# Echoed string arguments longer than this are shortened with "..."
truncate_length = 30

[capabilities]
# Any of "arithmetic", "system", "text"
domains = ["arithmetic", "system", "text"]
read_file_max_chars = 500
list_files_limit = 20

[logging]
level = "warn"
# format = "compact"

# [logging.file]
# enabled = true
# directory = "/var/log/fescall"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Unknown capability domain
    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    /// Unknown output format
    #[error("invalid output format: {0}")]
    InvalidOutputFormat(String),

    /// Unknown log format
    #[error("invalid log format: {0}")]
    InvalidLogFormat(String),

    /// Empty domain list
    #[error("at least one capability domain must be enabled")]
    NoDomains,

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
