//! Error types for the `redrag-server` crate.

use thiserror::Error;

/// Errors raised while loading or validating [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// An environment variable held a value of the wrong shape.
    #[error("invalid value '{value}' for {key}: {message}")]
    InvalidValue { key: String, value: String, message: String },

    /// The settings are individually well-formed but inconsistent.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// A convenience result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
