//! Per-model-type index descriptors.

use revtab_model::ModelSchema;
use revtab_schema::ColumnSet;

/// Derives the head table name for a model type.
#[must_use]
pub fn head_table_name(type_name: &str) -> String {
    format!("{}_HEAD", type_name.to_uppercase())
}

/// Derives the history table name for a model type.
#[must_use]
pub fn history_table_name(type_name: &str) -> String {
    format!("{}_HISTORY", type_name.to_uppercase())
}

/// The descriptor binding a model type to its head and history tables.
///
/// An index is created once per model type, on first use or explicitly,
/// and is immutable thereafter. The engine durably registers every index;
/// in-memory copies are a cache over that registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    name: String,
    head_table: String,
    history_table: String,
    identity_column: String,
    columns: ColumnSet,
}

impl Index {
    /// Creates an index descriptor from an introspected model schema.
    #[must_use]
    pub fn from_schema(schema: &ModelSchema) -> Self {
        Self {
            name: schema.type_name().to_string(),
            head_table: head_table_name(schema.type_name()),
            history_table: history_table_name(schema.type_name()),
            identity_column: schema.identity_column().to_string(),
            columns: schema.columns().clone(),
        }
    }

    /// Reassembles an index descriptor from its registered parts.
    #[must_use]
    pub fn from_parts(
        name: impl Into<String>,
        head_table: impl Into<String>,
        history_table: impl Into<String>,
        identity_column: impl Into<String>,
        columns: ColumnSet,
    ) -> Self {
        Self {
            name: name.into(),
            head_table: head_table.into(),
            history_table: history_table.into(),
            identity_column: identity_column.into(),
            columns,
        }
    }

    /// Returns the model type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the head table name.
    #[must_use]
    pub fn head_table(&self) -> &str {
        &self.head_table
    }

    /// Returns the history table name.
    #[must_use]
    pub fn history_table(&self) -> &str {
        &self.history_table
    }

    /// Returns the column holding the model identity.
    #[must_use]
    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    /// Returns the data columns shared by both tables.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }
}
