//! Tables and schema elements.

use crate::column::Column;
use crate::column_set::ColumnSet;
use crate::constraint::{PrimaryKeyConstraint, ReferentialConstraint, UniqueConstraint};

/// One element of a table definition.
///
/// Dialect drivers compile a table by matching exhaustively over its
/// elements; adding a variant here forces every driver to handle it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableElement {
    /// A column definition.
    Column(Column),
    /// A unique constraint.
    Unique(UniqueConstraint),
    /// A primary key constraint.
    PrimaryKey(PrimaryKeyConstraint),
    /// A referential constraint.
    Referential(ReferentialConstraint),
}

impl TableElement {
    /// Returns the contained column, if this element is one.
    ///
    /// Column-only consumers can filter with this accessor and ignore
    /// constraints entirely.
    #[must_use]
    pub fn as_column(&self) -> Option<&Column> {
        match self {
            TableElement::Column(column) => Some(column),
            _ => None,
        }
    }
}

impl From<Column> for TableElement {
    fn from(column: Column) -> Self {
        TableElement::Column(column)
    }
}

impl From<UniqueConstraint> for TableElement {
    fn from(constraint: UniqueConstraint) -> Self {
        TableElement::Unique(constraint)
    }
}

impl From<PrimaryKeyConstraint> for TableElement {
    fn from(constraint: PrimaryKeyConstraint) -> Self {
        TableElement::PrimaryKey(constraint)
    }
}

impl From<ReferentialConstraint> for TableElement {
    fn from(constraint: ReferentialConstraint) -> Self {
        TableElement::Referential(constraint)
    }
}

/// A named table assembled from an ordered list of schema elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    elements: Vec<TableElement>,
}

impl Table {
    /// Creates an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a schema element.
    pub fn add(&mut self, element: impl Into<TableElement>) -> &mut Self {
        self.elements.push(element.into());
        self
    }

    /// Appends every column of a column set, in order.
    pub fn add_columns(&mut self, columns: &ColumnSet) -> &mut Self {
        for column in columns {
            self.add(column.clone());
        }
        self
    }

    /// Returns all elements in definition order.
    #[must_use]
    pub fn elements(&self) -> &[TableElement] {
        &self.elements
    }

    /// Iterates only the column elements, in definition order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.elements.iter().filter_map(TableElement::as_column)
    }
}
