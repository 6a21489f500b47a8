//! Error types for configuration loading and validation.

use thiserror::Error;

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting was not provided.
    #[error("missing required setting {name}")]
    MissingSetting {
        /// Environment variable name.
        name: &'static str,
    },
    /// A setting was present but failed validation.
    #[error("invalid value for {field}: {reason} (got {value:?})")]
    InvalidField {
        /// Setting name as seen in the environment.
        field: &'static str,
        /// Offending value, when safe to echo back.
        value: Option<String>,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::InvalidField`] with a captured value.
    #[must_use]
    pub fn invalid(field: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.into()),
            reason,
        }
    }
}
