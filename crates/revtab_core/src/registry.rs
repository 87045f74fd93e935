//! Durable index registration.
//!
//! Every created index is recorded in a global registry so that existence
//! checks and index loads survive process restarts; the engine's in-memory
//! cache is an optimization over these tables, never the source of truth.
//! Registration is idempotent (`INSERT OR IGNORE`) so that concurrent
//! first commits of the same model type both succeed.

use revtab_schema::{Column, ColumnSet, ColumnType, SchemaError};
use rusqlite::{Connection, OptionalExtension};

use crate::error::EngineResult;
use crate::index::Index;

const INSTALL_SQL: &str = "
CREATE TABLE IF NOT EXISTS \"INDEX_INFORMATION\" (
    \"NAME\" TEXT PRIMARY KEY,
    \"HEAD_TABLE\" TEXT NOT NULL,
    \"HISTORY_TABLE\" TEXT NOT NULL,
    \"IDENTITY_COLUMN\" TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS \"INDEX_COLUMN_INFORMATION\" (
    \"INDEX_NAME\" TEXT NOT NULL,
    \"POSITION\" INTEGER NOT NULL,
    \"COLUMN_NAME\" TEXT NOT NULL,
    \"COLUMN_TYPE\" TEXT NOT NULL,
    PRIMARY KEY (\"INDEX_NAME\", \"COLUMN_NAME\")
);
";

/// Creates the registry tables if they do not exist yet.
pub(crate) fn install(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(INSTALL_SQL)?;
    Ok(())
}

/// Checks whether an index is registered.
pub(crate) fn exists(conn: &Connection, name: &str) -> EngineResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM \"INDEX_INFORMATION\" WHERE \"NAME\" = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Registers an index and its columns.
pub(crate) fn persist(conn: &Connection, index: &Index) -> EngineResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO \"INDEX_INFORMATION\" \
         (\"NAME\", \"HEAD_TABLE\", \"HISTORY_TABLE\", \"IDENTITY_COLUMN\") \
         VALUES (?1, ?2, ?3, ?4)",
        [
            index.name(),
            index.head_table(),
            index.history_table(),
            index.identity_column(),
        ],
    )?;

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO \"INDEX_COLUMN_INFORMATION\" \
         (\"INDEX_NAME\", \"POSITION\", \"COLUMN_NAME\", \"COLUMN_TYPE\") \
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, column) in index.columns().iter().enumerate() {
        stmt.execute((
            index.name(),
            position as i64,
            column.name(),
            column.ty().as_str(),
        ))?;
    }

    Ok(())
}

/// Loads a registered index, or `None` if it was never created.
pub(crate) fn load(conn: &Connection, name: &str) -> EngineResult<Option<Index>> {
    let header = conn
        .query_row(
            "SELECT \"HEAD_TABLE\", \"HISTORY_TABLE\", \"IDENTITY_COLUMN\" \
             FROM \"INDEX_INFORMATION\" WHERE \"NAME\" = ?1",
            [name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((head_table, history_table, identity_column)) = header else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT \"COLUMN_NAME\", \"COLUMN_TYPE\" FROM \"INDEX_COLUMN_INFORMATION\" \
         WHERE \"INDEX_NAME\" = ?1 ORDER BY \"POSITION\"",
    )?;
    let rows = stmt.query_map([name], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut columns = ColumnSet::new();
    for row in rows {
        let (column_name, type_name) = row?;
        let ty = ColumnType::from_name(&type_name)
            .ok_or_else(|| SchemaError::unknown_column_type(&type_name))?;
        columns.add(Column::new(column_name, ty))?;
    }

    Ok(Some(Index::from_parts(
        name,
        head_table,
        history_table,
        identity_column,
        columns,
    )))
}

/// Removes an index's registration rows.
pub(crate) fn remove(conn: &Connection, name: &str) -> EngineResult<()> {
    conn.execute(
        "DELETE FROM \"INDEX_COLUMN_INFORMATION\" WHERE \"INDEX_NAME\" = ?1",
        [name],
    )?;
    conn.execute(
        "DELETE FROM \"INDEX_INFORMATION\" WHERE \"NAME\" = ?1",
        [name],
    )?;
    Ok(())
}
