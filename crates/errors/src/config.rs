//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("invalid value in environment variable {var}: {value}")]
    EnvVarInvalid { var: String, value: String },

    #[error("failed to read config from {path}: {error}")]
    ReadError { path: String, error: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::ReadError { .. } => {
                Some("Provide a configuration file or rely on the built-in defaults.")
            }
            Self::InvalidValue { field, .. } if field.contains("connections") => {
                Some("Connection limits must be non-negative; omit the key for no limit.")
            }
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and restart the server.")
            }
            Self::EnvVarInvalid { .. } => {
                Some("Unset the environment variable or give it an integer value.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }
}
