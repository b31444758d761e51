//! Core error types for sessiontrack-core.
//!
//! Invalid timer transitions are not errors: they are absorbed as `Ok(None)`.
//! What reaches the caller is a failing session sink, a bad configuration, or
//! a rejected value.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for sessiontrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The external session store rejected a write.
    ///
    /// Local state has already been committed when this is returned.
    #[error("Session store error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Failures reported by a [`SessionSink`](crate::session::SessionSink).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The store refused the update for this session.
    #[error("store rejected update for session '{session_id}': {message}")]
    Rejected { session_id: String, message: String },

    /// The store could not be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not name a configuration value
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => {
                ConfigError::InvalidValue { key: field, message }
            }
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
