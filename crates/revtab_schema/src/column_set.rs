//! Ordered, name-unique collections of columns.

use crate::column::Column;
use crate::error::{SchemaError, SchemaResult};

/// An ordered collection of columns with unique names.
///
/// Iteration order is insertion order. Re-adding a column whose name is
/// already present replaces the previous definition in place, keeping its
/// position; this is the merge policy recursive introspection relies on
/// when overlapping schema fragments are combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Creates an empty column set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, replacing any existing column of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyColumnName`] if the column name is empty.
    pub fn add(&mut self, column: Column) -> SchemaResult<&mut Self> {
        if column.name().is_empty() {
            return Err(SchemaError::EmptyColumnName);
        }

        match self.position(column.name()) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }

        Ok(self)
    }

    /// Checks whether a column with the given name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the column with the given name, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|index| &self.columns[index])
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Checks whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates the columns in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Merges another set into this one, column by column.
    ///
    /// Columns from `other` overwrite same-named columns already present.
    pub fn merge(&mut self, other: &ColumnSet) -> SchemaResult<&mut Self> {
        for column in other.iter() {
            self.add(column.clone())?;
        }
        Ok(self)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
