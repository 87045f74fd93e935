//! # Revtab Schema
//!
//! Dialect-independent SQL schema fragments for Revtab.
//!
//! This crate provides the value types a dialect driver compiles into DDL:
//! - Typed columns with options (nullability, auto-increment)
//! - Ordered, name-unique column sets with a documented merge policy
//! - Unique, primary-key and referential constraints
//! - Tables as ordered sequences of schema elements
//!
//! ## Merge policy
//!
//! [`ColumnSet::add`] overwrites an existing column of the same name in
//! place (last write wins, original position kept). Recursive introspection
//! of object graphs re-derives overlapping schema fragments; the merge
//! policy lets those fragments combine without bookkeeping on the caller
//! side. Empty column names are rejected.
//!
//! ## Usage
//!
//! ```
//! use revtab_schema::{Column, ColumnOption, ColumnSet, ColumnType};
//!
//! let mut columns = ColumnSet::new();
//! let mut created = Column::new("REV_CREATED", ColumnType::Timestamp);
//! created.set(ColumnOption::NotNull);
//! columns.add(created).unwrap();
//!
//! assert!(columns.contains("REV_CREATED"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod column;
mod column_set;
mod constraint;
mod error;
mod table;

pub use column::{Column, ColumnOption, ColumnType};
pub use column_set::ColumnSet;
pub use constraint::{PrimaryKeyConstraint, ReferentialConstraint, UniqueConstraint};
pub use error::{SchemaError, SchemaResult};
pub use table::{Table, TableElement};
