//! Error types for planning and DDL synthesis.

use crate::schema::IndexKind;

/// Errors raised while validating descriptors or rendering DDL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The dialect cannot create an index of this kind.
    #[error("Dialect '{dialect}' cannot create {kind} index '{index}' on '{table}'")]
    UnsupportedIndexKind {
        /// Dialect name.
        dialect: &'static str,
        /// Table name.
        table: String,
        /// Index name.
        index: String,
        /// The rejected kind.
        kind: IndexKind,
    },

    /// The dialect has no syntax for an operation.
    #[error("Dialect '{dialect}' does not support {operation}")]
    UnsupportedOperation {
        /// Dialect name.
        dialect: &'static str,
        /// Human-readable description of the operation.
        operation: String,
    },

    /// A catalog type name that no family maps to.
    #[error("Column '{table}.{column}' has unrecognized type '{native}'")]
    UnknownNativeType {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// The native type name as reported by the catalog.
        native: String,
    },

    /// A descriptor violates a structural invariant.
    #[error("Invalid descriptor for '{table}': {message}")]
    InvalidDescriptor {
        /// Table name.
        table: String,
        /// What is wrong.
        message: String,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
