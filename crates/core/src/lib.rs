pub mod config;
pub mod error;
pub mod logging;

pub use config::{CapabilitiesConfig, Config, Domain, FileLoggingConfig, LoggingConfig, OutputConfig, OutputFormat};
pub use error::{Error, Result};
