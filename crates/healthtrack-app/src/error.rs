//! Application-level error catalogue.

use thiserror::Error;

/// Convenience alias for application results.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the application boot sequence and runtime wiring.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("configuration error during {operation}")]
    Config {
        /// The failing boot step.
        operation: &'static str,
        /// Underlying configuration error.
        #[source]
        source: healthtrack_config::ConfigError,
    },
    /// A data-layer operation failed.
    #[error("data access error during {operation}")]
    Data {
        /// The failing boot step.
        operation: &'static str,
        /// Underlying data error.
        #[source]
        source: healthtrack_data::DataError,
    },
    /// Telemetry initialisation failed.
    #[error("telemetry error during {operation}")]
    Telemetry {
        /// The failing boot step.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: anyhow::Error,
    },
    /// Prober construction failed.
    #[error("probe error during {operation}")]
    Probe {
        /// The failing boot step.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: anyhow::Error,
    },
    /// The API server failed to start or terminated unexpectedly.
    #[error("API server error during {operation}")]
    ApiServer {
        /// The failing boot step.
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: healthtrack_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn data(operation: &'static str, source: healthtrack_data::DataError) -> Self {
        Self::Data { operation, source }
    }

    pub(crate) fn telemetry(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Telemetry {
            operation,
            source: source.into(),
        }
    }

    pub(crate) fn probe(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Probe {
            operation,
            source: source.into(),
        }
    }

    pub(crate) fn api_server(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::ApiServer {
            operation,
            source: source.into(),
        }
    }
}
