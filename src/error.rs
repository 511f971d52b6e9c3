use thiserror::Error;

/// Errors that can occur during configuration loading
///
/// Registry and rule operations are total and never fail; only reading a rule
/// file can.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}
