//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid YAML for [`AppConfig`](super::AppConfig).
    #[error("failed to parse YAML config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// A value is out of range or malformed.
    #[error("config validation error: {0}")]
    ValidationError(String),
}
