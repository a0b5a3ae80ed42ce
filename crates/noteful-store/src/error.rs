//! Error types for the storage layer.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure reported by the database.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A value the column cannot hold.
    #[error("invalid value for column {table}.{column}: {reason}")]
    InvalidValue {
        table: &'static str,
        column: String,
        reason: String,
    },

    /// Column not declared by the resource.
    #[error("unknown column {column} for table {table}")]
    UnknownColumn { table: &'static str, column: String },

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
