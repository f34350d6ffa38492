//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while building the application configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required configuration field is missing.
    #[error("Missing required configuration: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// The environment file exists but could not be read or parsed.
    #[error("Failed to load environment file {path}: {message}")]
    EnvFile {
        /// Path of the file.
        path: String,
        /// Reason reported by the parser.
        message: String,
    },

    /// Invalid configuration value or combination.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of the configuration issue.
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}
