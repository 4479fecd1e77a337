//! Logging setup for fescall.
//!
//! All events are written to stderr so that stdout carries only result lines.
//!
//! # Environment Variables
//!
//! - `FESCALL_LOG`: Filter directive (like `RUST_LOG`), e.g., `fescall_engine=debug`
//! - `FESCALL_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `FESCALL_LOG_DIR`: Directory for file logging when `[logging.file]` is enabled
//!
//! # Example
//!
//! ```no_run
//! use fescall_core::logging::{self, LogSettings};
//!
//! let _guard = logging::init_logging(LogSettings::default())?;
//! # Ok::<(), fescall_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingConfig;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output (default)
    #[default]
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    /// Get the string representation of this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Resolved logging settings, built from `[logging]` plus command-line flags.
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Default filter when no environment override is present.
    pub level: String,
    /// Explicit stderr format; detected from the terminal when `None`.
    pub format: Option<LogFormat>,
    /// Directory for the rolling JSON log file, if enabled.
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: None, file_dir: None }
    }
}

impl LogSettings {
    /// Create settings from the `[logging]` configuration section.
    pub fn from_config(config: &LoggingConfig) -> Result<Self, Error> {
        let format = config.format.as_deref().and_then(LogFormat::parse_str);
        let file_dir = if config.file.enabled {
            Some(match &config.file.directory {
                Some(dir) => dir.clone(),
                None => Self::get_log_dir()?,
            })
        } else {
            None
        };

        Ok(Self { level: config.level.clone(), format, file_dir })
    }

    /// Set the log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Build an EnvFilter from these settings and environment variables.
    fn build_env_filter(&self) -> EnvFilter {
        let filter = env::var("FESCALL_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    /// Detect if stderr is a TTY for pretty formatting.
    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the appropriate format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("FESCALL_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if let Some(format) = self.format {
            return format;
        }

        if Self::is_tty() { LogFormat::Pretty } else { LogFormat::Compact }
    }

    /// Get the default log directory path.
    fn get_log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("FESCALL_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".fescall").join("logs"))
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns the file appender's worker guard when file logging is enabled; the
/// caller must hold it until exit so buffered events are flushed.
pub fn init_logging(settings: LogSettings) -> Result<Option<WorkerGuard>, Error> {
    let env_filter = settings.build_env_filter();
    let format = settings.detect_format();

    let registry = Registry::default().with(env_filter);

    if let Some(log_dir) = &settings.file_dir {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "fescall.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let result = match format {
            LogFormat::Pretty => {
                registry
                    .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                    .with(fmt::layer().json().with_writer(non_blocking))
                    .try_init()
            }
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

        Ok(Some(guard))
    } else {
        let result = match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                .try_init(),
            LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr)).try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(io::stderr)).try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))?;

        Ok(None)
    }
}

/// Sanitize file paths for logging (replace the home directory with `~`).
pub fn sanitize_path(path: &Path) -> String {
    if let Ok(home) = env::var("HOME")
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
