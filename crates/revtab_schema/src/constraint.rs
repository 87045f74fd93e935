//! Table constraints.

use crate::error::{SchemaError, SchemaResult};

/// Requires the combination of the named columns to be unique per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    columns: Vec<String>,
}

impl UniqueConstraint {
    /// Creates a unique constraint over the given columns.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyConstraint`] if no columns are given.
    pub fn new<I, S>(columns: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::empty_constraint("unique"));
        }
        Ok(Self { columns })
    }

    /// Returns the constrained column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Declares the named columns as the table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyConstraint {
    columns: Vec<String>,
}

impl PrimaryKeyConstraint {
    /// Creates a primary key constraint over the given columns.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyConstraint`] if no columns are given.
    pub fn new<I, S>(columns: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::empty_constraint("primary key"));
        }
        Ok(Self { columns })
    }

    /// Returns the key column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Declares the named columns as a reference to columns of another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferentialConstraint {
    columns: Vec<String>,
    target_table: String,
    target_columns: Vec<String>,
}

impl ReferentialConstraint {
    /// Creates a referential constraint.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyConstraint`] if either column list is
    /// empty.
    pub fn new<I, J, S, T>(columns: I, target_table: impl Into<String>, target_columns: J) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let target_columns: Vec<String> = target_columns.into_iter().map(Into::into).collect();
        if columns.is_empty() || target_columns.is_empty() {
            return Err(SchemaError::empty_constraint("referential"));
        }
        Ok(Self {
            columns,
            target_table: target_table.into(),
            target_columns,
        })
    }

    /// Returns the referencing column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the referenced table name.
    #[must_use]
    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    /// Returns the referenced column names.
    #[must_use]
    pub fn target_columns(&self) -> &[String] {
        &self.target_columns
    }
}
