//! Head and history table factories.
//!
//! Both tables carry the index's data columns; the factories add the fixed
//! audit columns around them. The head table keeps one row per live
//! identity, enforced with a unique constraint; the history table is
//! append-only with a generated revision id.

use revtab_schema::{Column, ColumnOption, ColumnType, Table, UniqueConstraint};

use crate::error::EngineResult;
use crate::index::Index;

/// Timestamp of the commit that inserted a head row.
pub(crate) const REV_CREATED: &str = "REV_CREATED";
/// Timestamp of the commit that last updated a head row, NULL if never.
pub(crate) const REV_MODIFIED: &str = "REV_MODIFIED";
/// Generated revision id ordering the history table.
pub(crate) const REV_ID: &str = "REV_ID";
/// Id of the commit that produced a history row.
pub(crate) const REV_COMMIT: &str = "REV_COMMIT";
/// Timestamp shared by every row of one commit.
pub(crate) const REV_TIMESTAMP: &str = "REV_TIMESTAMP";
/// Operation recorded by a history row: INSERT, UPDATE or DELETE.
pub(crate) const REV_OPERATION: &str = "REV_OPERATION";
/// Acting user of the commit.
pub(crate) const REV_USER: &str = "REV_USER";
/// Context id of the commit.
pub(crate) const REV_CONTEXTID: &str = "REV_CONTEXTID";
/// Domain id of the commit.
pub(crate) const REV_DOMAINID: &str = "REV_DOMAINID";
/// Connector id of the commit.
pub(crate) const REV_CONNECTORID: &str = "REV_CONNECTORID";
/// Connector instance id of the commit.
pub(crate) const REV_INSTANCEID: &str = "REV_INSTANCEID";

/// Builds the head table definition for an index.
pub(crate) fn head_table(index: &Index) -> EngineResult<Table> {
    let mut table = Table::new(index.head_table());

    table.add(Column::with_options(
        REV_CREATED,
        ColumnType::Timestamp,
        &[ColumnOption::NotNull],
    ));
    table.add(Column::with_options(
        REV_MODIFIED,
        ColumnType::Timestamp,
        &[ColumnOption::Nullable],
    ));
    table.add_columns(index.columns());
    table.add(UniqueConstraint::new([index.identity_column()])?);

    Ok(table)
}

/// Builds the history table definition for an index.
pub(crate) fn history_table(index: &Index) -> Table {
    let mut table = Table::new(index.history_table());

    table.add(Column::with_options(
        REV_ID,
        ColumnType::BigInt,
        &[ColumnOption::AutoIncrement],
    ));
    table.add(Column::new(REV_COMMIT, ColumnType::Uuid));
    table.add(Column::new(REV_TIMESTAMP, ColumnType::Timestamp));
    table.add(Column::new(REV_OPERATION, ColumnType::Varchar));
    table.add(Column::new(REV_USER, ColumnType::Varchar));
    table.add(Column::new(REV_CONTEXTID, ColumnType::Varchar));
    table.add(Column::new(REV_DOMAINID, ColumnType::Varchar));
    table.add(Column::new(REV_CONNECTORID, ColumnType::Varchar));
    table.add(Column::new(REV_INSTANCEID, ColumnType::Varchar));
    table.add_columns(index.columns());

    table
}
