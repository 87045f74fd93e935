//! Error types for the schema model.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while assembling schema fragments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A column was defined with an empty name.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// A constraint was defined without any columns.
    #[error("{constraint} constraint must reference at least one column")]
    EmptyConstraint {
        /// The kind of constraint that was rejected.
        constraint: &'static str,
    },

    /// A column type name could not be resolved.
    #[error("unknown column type: {name}")]
    UnknownColumnType {
        /// The unresolvable type name.
        name: String,
    },
}

impl SchemaError {
    /// Creates an empty constraint error for the given constraint kind.
    pub fn empty_constraint(constraint: &'static str) -> Self {
        Self::EmptyConstraint { constraint }
    }

    /// Creates an unknown column type error.
    pub fn unknown_column_type(name: impl Into<String>) -> Self {
        Self::UnknownColumnType { name: name.into() }
    }
}
