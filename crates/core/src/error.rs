// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type.
///
/// Only pool-related variants ever cross the repository boundary:
/// row-level failures (missing rows, constraint violations) are reported
/// to callers as sentinel records, not as errors. `Database` exists for
/// the adapter's internal classification and logging.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Connection pool exhausted after {waited_ms} ms")]
    PoolExhausted { waited_ms: u64 },

    #[error("Connection pool initialization failed: {0}")]
    PoolInit(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// From implementation for infra crates (to avoid circular dependency)
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Database(err)
    }
}

// Note: sqlx::Error conversion is handled in infra-sqlite
// by converting to AppError::Database(String)
