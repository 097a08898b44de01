//! Error types for reconciliation.

use oxide_schema::SchemaError;

/// Errors that can occur while inspecting or reconciling a table.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The desired schema is invalid or needs syntax the dialect lacks.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Reading catalog metadata failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A DDL statement failed. Statements before it stay applied.
    #[error("Failed to execute '{statement}' after {executed} statement(s) succeeded: {source}")]
    Execution {
        /// The failing statement.
        statement: String,
        /// Statements of the same plan that already ran.
        executed: usize,
        /// The underlying failure.
        source: sqlx::Error,
    },

    /// IO error (reading schema files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The inspected table does not exist.
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;
