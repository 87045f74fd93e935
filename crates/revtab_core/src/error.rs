//! Error types for the index engine.

use thiserror::Error;
use uuid::Uuid;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in index engine operations.
///
/// Callers can distinguish caller bugs (`Model`, `Schema`,
/// `DependencyCycle`) from possibly-transient store failures
/// (`CommitFailed`, `Database`); only the latter are worth retrying.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The model violates the identity rule or nests unsupported values.
    #[error("invalid model: {0}")]
    Model(#[from] revtab_model::ModelError),

    /// Schema assembly failed.
    #[error("invalid schema: {0}")]
    Schema(#[from] revtab_schema::SchemaError),

    /// An index was requested that was never created.
    #[error("index {name} does not exist")]
    UnknownIndex {
        /// The model type name.
        name: String,
    },

    /// An index was explicitly created twice.
    #[error("index {name} already exists")]
    IndexExists {
        /// The model type name.
        name: String,
    },

    /// The operations of a commit reference each other cyclically.
    #[error("commit {commit_id} has cyclic model dependencies")]
    DependencyCycle {
        /// The id of the rejected commit.
        commit_id: Uuid,
    },

    /// A commit's transaction failed and was rolled back.
    #[error("commit {commit_id} failed and was rolled back: {source}")]
    CommitFailed {
        /// The id of the failed commit.
        commit_id: Uuid,
        /// The underlying database error.
        #[source]
        source: rusqlite::Error,
    },

    /// A value could not be bound to the given column.
    #[error("value for column {column} cannot be stored")]
    UnmappedValue {
        /// The column the value was bound for.
        column: String,
    },

    /// The underlying database failed outside of a commit.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl EngineError {
    /// Creates an unknown index error.
    pub fn unknown_index(name: impl Into<String>) -> Self {
        Self::UnknownIndex { name: name.into() }
    }

    /// Creates an index exists error.
    pub fn index_exists(name: impl Into<String>) -> Self {
        Self::IndexExists { name: name.into() }
    }

    /// Creates a dependency cycle error.
    pub fn dependency_cycle(commit_id: Uuid) -> Self {
        Self::DependencyCycle { commit_id }
    }

    /// Creates a commit failed error.
    pub fn commit_failed(commit_id: Uuid, source: rusqlite::Error) -> Self {
        Self::CommitFailed { commit_id, source }
    }

    /// Creates an unmapped value error.
    pub fn unmapped_value(column: impl Into<String>) -> Self {
        Self::UnmappedValue {
            column: column.into(),
        }
    }

    /// Attributes a database error to a commit, wrapping it as
    /// `CommitFailed`. Non-database errors pass through unchanged.
    #[must_use]
    pub fn into_commit_failure(self, commit_id: Uuid) -> Self {
        match self {
            Self::Database(source) => Self::commit_failed(commit_id, source),
            other => other,
        }
    }
}
