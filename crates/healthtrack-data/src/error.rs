//! Error types for the data access layer.

use thiserror::Error;

/// Convenience alias for data layer results.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors produced by the data access layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// A database operation failed.
    #[error("database operation {operation} failed")]
    Database {
        /// Logical name of the failing operation.
        operation: &'static str,
        /// Underlying driver error.
        #[source]
        source: sqlx::Error,
    },
    /// Applying the embedded migrations failed.
    #[error("failed to run monitoring migrations")]
    Migration {
        /// Underlying migration error.
        #[source]
        source: sqlx::migrate::MigrateError,
    },
    /// An insert collided with the unique service-name constraint.
    #[error("a service named '{name}' already exists")]
    DuplicateName {
        /// The conflicting display name.
        name: String,
    },
}

impl DataError {
    pub(crate) fn database(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Database { operation, source }
    }
}
