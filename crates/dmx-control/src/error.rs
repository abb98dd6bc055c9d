//! Error types for the DMX control engine
use thiserror::Error;

/// Control engine errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// Malformed channel address string
    #[error("Invalid channel address: {0}")]
    InvalidAddress(String),

    /// Action constructed with invalid parameters
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Malformed fade step / value set string
    #[error("Invalid value set: {0}")]
    InvalidValueSet(String),

    /// The engine owning the universe is gone
    #[error("Engine closed")]
    EngineClosed,

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
