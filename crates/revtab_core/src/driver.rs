//! SQLite dialect driver.
//!
//! Compiles schema-model tables into DDL and builds the parameterized DML
//! the engine needs for commits. Semantic column types map onto SQLite's
//! storage classes: integers, booleans and timestamps land in `INTEGER`,
//! floats in `REAL`, text and uuids in `TEXT`. `AUTO_INCREMENT` compiles
//! to `INTEGER PRIMARY KEY AUTOINCREMENT`, which in this dialect subsumes
//! a separate primary key constraint for that column.

use revtab_model::Value;
use revtab_schema::{Column, ColumnOption, ColumnType, Table, TableElement};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};

use crate::error::{EngineError, EngineResult};

/// Maps a semantic column type to its SQLite storage type.
fn ddl_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Boolean
        | ColumnType::SmallInt
        | ColumnType::Integer
        | ColumnType::BigInt
        | ColumnType::Timestamp => "INTEGER",
        ColumnType::Float | ColumnType::Double => "REAL",
        ColumnType::Varchar | ColumnType::Uuid => "TEXT",
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

fn compile_column(column: &Column) -> String {
    let mut sql = format!("\"{}\" {}", column.name(), ddl_type(column.ty()));
    if column.has(ColumnOption::AutoIncrement) {
        sql.push_str(" PRIMARY KEY AUTOINCREMENT");
    }
    if column.has(ColumnOption::NotNull) {
        sql.push_str(" NOT NULL");
    }
    sql
}

/// Compiles a table's elements into the body of a CREATE TABLE statement.
pub(crate) fn compile_elements(table: &Table) -> String {
    table
        .elements()
        .iter()
        .map(|element| match element {
            TableElement::Column(column) => compile_column(column),
            TableElement::Unique(unique) => format!("UNIQUE ({})", quoted(unique.columns())),
            TableElement::PrimaryKey(pk) => format!("PRIMARY KEY ({})", quoted(pk.columns())),
            TableElement::Referential(referential) => format!(
                "FOREIGN KEY ({}) REFERENCES \"{}\" ({})",
                quoted(referential.columns()),
                referential.target_table(),
                quoted(referential.target_columns())
            ),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Creates a table if it does not exist yet.
///
/// The DDL is idempotent so that concurrent first commits of the same
/// model type both succeed.
pub(crate) fn create_table(conn: &Connection, table: &Table) -> EngineResult<()> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" ({})",
        table.name(),
        compile_elements(table)
    );
    conn.execute(&sql, [])?;
    Ok(())
}

/// Converts a model value into its SQL binding.
pub(crate) fn bind(column: &str, value: &Value) -> EngineResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Int(n) => Ok(SqlValue::Integer(*n)),
        Value::Float(f) => Ok(SqlValue::Real(*f)),
        Value::Text(s) => Ok(SqlValue::Text(s.clone())),
        Value::Timestamp(t) => Ok(SqlValue::Integer(*t)),
        Value::List(_) | Value::Map(_) | Value::Model(_) => {
            Err(EngineError::unmapped_value(column))
        }
    }
}

/// Inserts one row with the given column bindings.
pub(crate) fn insert_row(
    conn: &Connection,
    table: &str,
    row: &[(String, SqlValue)],
) -> EngineResult<()> {
    let columns: Vec<String> = row.iter().map(|(name, _)| name.clone()).collect();
    let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO \"{table}\" ({}) VALUES ({})",
        quoted(&columns),
        placeholders.join(", ")
    );
    conn.execute(&sql, params_from_iter(row.iter().map(|(_, value)| value)))?;
    Ok(())
}

/// Updates the row matched by `key_column = key` with the assignments.
///
/// Returns the number of affected rows.
pub(crate) fn update_row(
    conn: &Connection,
    table: &str,
    assignments: &[(String, SqlValue)],
    key_column: &str,
    key: &SqlValue,
) -> EngineResult<usize> {
    let set_list: Vec<String> = assignments
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("\"{name}\" = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE \"{table}\" SET {} WHERE \"{key_column}\" = ?{}",
        set_list.join(", "),
        assignments.len() + 1
    );

    let mut params: Vec<&SqlValue> = assignments.iter().map(|(_, value)| value).collect();
    params.push(key);

    let affected = conn.execute(&sql, params_from_iter(params))?;
    Ok(affected)
}

/// Deletes the row matched by `key_column = key`.
///
/// Returns the number of affected rows.
pub(crate) fn delete_row(
    conn: &Connection,
    table: &str,
    key_column: &str,
    key: &SqlValue,
) -> EngineResult<usize> {
    let sql = format!("DELETE FROM \"{table}\" WHERE \"{key_column}\" = ?1");
    let affected = conn.execute(&sql, [key])?;
    Ok(affected)
}

/// Reads the given columns of the row matched by `key_column = key`.
pub(crate) fn read_row(
    conn: &Connection,
    table: &str,
    columns: &[String],
    key_column: &str,
    key: &SqlValue,
) -> EngineResult<Option<Vec<(String, SqlValue)>>> {
    if columns.is_empty() {
        return Ok(None);
    }

    let sql = format!(
        "SELECT {} FROM \"{table}\" WHERE \"{key_column}\" = ?1",
        quoted(columns)
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([key])?;

    match rows.next()? {
        Some(row) => {
            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                let value: SqlValue = row.get(i)?;
                values.push((column.clone(), value));
            }
            Ok(Some(values))
        }
        None => Ok(None),
    }
}
