//! The index engine.
//!
//! Orchestrates schema creation and the transactional application of
//! commits to head and history tables.
//!
//! # Invariants
//!
//! - A commit is applied in one database transaction; a failure at any
//!   operation rolls back every row of the batch.
//! - A referenced sub-model is committed before the models referencing it.
//! - Schema creation is idempotent; racing first commits of the same model
//!   type must both succeed.
//! - The in-memory index cache only skips redundant lookups; the registry
//!   tables remain the source of truth.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use revtab_model::{flatten, introspect, FlatRecord, Model, ModelSchema};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, info, warn};

use crate::commit::{IndexCommit, OperationKind};
use crate::config::EngineConfig;
use crate::driver;
use crate::error::{EngineError, EngineResult};
use crate::graph::{self, PlannedOp};
use crate::index::Index;
use crate::registry;
use crate::tables;

/// The engine materializing versioned model instances into SQL tables.
///
/// Per model type the engine maintains a head table (current state) and an
/// append-only history table (full audit trail), created lazily on first
/// use. All mutation flows through [`IndexEngine::commit`].
///
/// # Example
///
/// ```
/// use revtab_core::{CommitBuilder, IndexEngine};
/// use revtab_model::Model;
///
/// let engine = IndexEngine::open_in_memory().unwrap();
///
/// let commit = CommitBuilder::new()
///     .context("testContext")
///     .user("testUser")
///     .insert(Model::new("TestModel").with_id("testId", "foo"))
///     .build();
///
/// engine.commit(&commit).unwrap();
/// assert!(engine.index_exists("TestModel").unwrap());
/// ```
pub struct IndexEngine {
    /// The underlying store. One connection, one commit at a time.
    conn: Mutex<Connection>,
    /// Read-through cache over the registry tables.
    cache: RwLock<HashMap<String, Index>>,
}

impl IndexEngine {
    /// Opens an engine with the given configuration.
    ///
    /// The registry tables are created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] if the store cannot be opened.
    pub fn open(config: &EngineConfig) -> EngineResult<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout)?;

        registry::install(&conn)?;
        info!(path = ?config.path, "opened index engine");

        Ok(Self {
            conn: Mutex::new(conn),
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Opens an engine backed by a private in-memory store.
    pub fn open_in_memory() -> EngineResult<Self> {
        Self::open(&EngineConfig::default())
    }

    /// Opens an engine backed by the database file at `path`.
    pub fn open_path(path: impl Into<std::path::PathBuf>) -> EngineResult<Self> {
        Self::open(&EngineConfig::new().path(path))
    }

    /// Creates the index for a model type, derived from a prototype
    /// instance.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IndexExists`] if the type is already
    /// indexed, or [`EngineError::Model`] if the prototype violates the
    /// identity rule.
    pub fn create_index(&self, prototype: &Model) -> EngineResult<Index> {
        let schema = introspect(prototype)?;
        info!(index = schema.type_name(), "creating index");

        let mut conn = self.conn.lock();
        if registry::exists(&conn, schema.type_name())? {
            return Err(EngineError::index_exists(schema.type_name()));
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let index = create_schema(&tx, &schema)?;
        tx.commit()?;

        self.cache
            .write()
            .insert(index.name().to_string(), index.clone());

        Ok(index)
    }

    /// Checks whether a model type has been indexed.
    pub fn index_exists(&self, type_name: &str) -> EngineResult<bool> {
        if self.cache.read().contains_key(type_name) {
            return Ok(true);
        }
        let conn = self.conn.lock();
        registry::exists(&conn, type_name)
    }

    /// Returns the index of a model type.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownIndex`] if the type was never
    /// indexed.
    pub fn get_index(&self, type_name: &str) -> EngineResult<Index> {
        if let Some(index) = self.cache.read().get(type_name) {
            return Ok(index.clone());
        }

        let conn = self.conn.lock();
        match registry::load(&conn, type_name)? {
            Some(index) => {
                drop(conn);
                self.cache
                    .write()
                    .insert(index.name().to_string(), index.clone());
                Ok(index)
            }
            None => Err(EngineError::unknown_index(type_name)),
        }
    }

    /// Drops a model type's tables and registration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownIndex`] if the type was never
    /// indexed.
    pub fn drop_index(&self, type_name: &str) -> EngineResult<()> {
        let mut conn = self.conn.lock();
        let index = registry::load(&conn, type_name)?
            .ok_or_else(|| EngineError::unknown_index(type_name))?;

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            &format!("DROP TABLE IF EXISTS \"{}\"", index.head_table()),
            [],
        )?;
        tx.execute(
            &format!("DROP TABLE IF EXISTS \"{}\"", index.history_table()),
            [],
        )?;
        registry::remove(&tx, type_name)?;
        tx.commit()?;

        self.cache.write().remove(type_name);
        info!(index = type_name, "dropped index");

        Ok(())
    }

    /// Applies a commit atomically.
    ///
    /// Operations are dependency-ordered first: sub-models nested in a
    /// committed model are inserted before the model referencing them,
    /// implicitly if they are not part of the commit. Indexes for
    /// previously-unseen model types are created inside the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Model`] for identity-rule violations,
    /// [`EngineError::DependencyCycle`] for cyclic references, and
    /// [`EngineError::CommitFailed`] for row-level store failures. In
    /// every case the whole batch is rolled back.
    pub fn commit(&self, commit: &IndexCommit) -> EngineResult<()> {
        let planned = graph::plan(commit)?;
        debug!(
            commit_id = %commit.id(),
            operations = planned.len(),
            "applying commit"
        );

        let mut conn = self.conn.lock();
        let mut created: Vec<Index> = Vec::new();

        let result = apply(&mut conn, &self.cache, commit, &planned, &mut created);
        match result {
            Ok(()) => {
                // Publish indexes created by this commit only after the
                // transaction is durable.
                let mut cache = self.cache.write();
                for index in created {
                    cache.insert(index.name().to_string(), index);
                }
                info!(commit_id = %commit.id(), "commit applied");
                Ok(())
            }
            Err(err) => Err(err.into_commit_failure(commit.id())),
        }
    }
}

impl std::fmt::Debug for IndexEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexEngine")
            .field("cached_indexes", &self.cache.read().len())
            .finish_non_exhaustive()
    }
}

/// Runs the planned operations in one transaction.
fn apply(
    conn: &mut Connection,
    cache: &RwLock<HashMap<String, Index>>,
    commit: &IndexCommit,
    planned: &[PlannedOp<'_>],
    created: &mut Vec<Index>,
) -> EngineResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    for op in planned {
        let schema = introspect(op.model)?;
        let index = ensure_index(&tx, cache, &schema, created)?;
        let record = flatten(op.model)?;

        match op.kind {
            OperationKind::Insert => apply_insert(&tx, &index, &record, commit)?,
            OperationKind::Update => apply_update(&tx, &index, &record, commit)?,
            OperationKind::Delete => apply_delete(&tx, &index, &record, commit)?,
        }
    }

    tx.commit()?;
    Ok(())
}

/// Resolves the index for a model type, creating its schema on first use.
fn ensure_index(
    conn: &Connection,
    cache: &RwLock<HashMap<String, Index>>,
    schema: &ModelSchema,
    created: &mut Vec<Index>,
) -> EngineResult<Index> {
    if let Some(index) = created.iter().find(|i| i.name() == schema.type_name()) {
        return Ok(index.clone());
    }
    if let Some(index) = cache.read().get(schema.type_name()) {
        return Ok(index.clone());
    }
    if let Some(index) = registry::load(conn, schema.type_name())? {
        created.push(index.clone());
        return Ok(index);
    }

    let index = create_schema(conn, schema)?;
    created.push(index.clone());
    Ok(index)
}

/// Creates head and history tables and registers the index.
fn create_schema(conn: &Connection, schema: &ModelSchema) -> EngineResult<Index> {
    let index = Index::from_schema(schema);

    driver::create_table(conn, &tables::head_table(&index)?)?;
    driver::create_table(conn, &tables::history_table(&index))?;
    registry::persist(conn, &index)?;

    info!(
        index = index.name(),
        head = index.head_table(),
        history = index.history_table(),
        "created schema"
    );

    Ok(index)
}

/// Binds a record's values, pruned to the columns the index knows.
fn record_values(record: &FlatRecord, index: &Index) -> EngineResult<Vec<(String, SqlValue)>> {
    let mut values = Vec::with_capacity(record.entries().len());

    for (column, value) in record.entries() {
        if !index.columns().contains(column) {
            warn!(
                index = index.name(),
                column = column.as_str(),
                "dropping value for unmapped column"
            );
            continue;
        }
        values.push((column.clone(), driver::bind(column, value)?));
    }

    Ok(values)
}

/// Returns the bound identity value of a record.
fn identity_key(record: &FlatRecord) -> EngineResult<SqlValue> {
    match record.identity_value() {
        Some(value) => driver::bind(record.identity_column(), value),
        None => Ok(SqlValue::Null),
    }
}

fn apply_insert(
    conn: &Connection,
    index: &Index,
    record: &FlatRecord,
    commit: &IndexCommit,
) -> EngineResult<()> {
    let data = record_values(record, index)?;

    let mut head_row = vec![(
        tables::REV_CREATED.to_string(),
        SqlValue::Integer(commit.timestamp().as_millis()),
    )];
    head_row.extend(data.iter().cloned());
    driver::insert_row(conn, index.head_table(), &head_row)?;

    append_history(conn, index, data, commit, OperationKind::Insert)
}

fn apply_update(
    conn: &Connection,
    index: &Index,
    record: &FlatRecord,
    commit: &IndexCommit,
) -> EngineResult<()> {
    let data = record_values(record, index)?;
    let key = identity_key(record)?;

    let mut assignments = data.clone();
    assignments.push((
        tables::REV_MODIFIED.to_string(),
        SqlValue::Integer(commit.timestamp().as_millis()),
    ));

    let affected = driver::update_row(
        conn,
        index.head_table(),
        &assignments,
        index.identity_column(),
        &key,
    )?;
    if affected == 0 {
        warn!(
            index = index.name(),
            "update matched no head row, history recorded anyway"
        );
    }

    append_history(conn, index, data, commit, OperationKind::Update)
}

fn apply_delete(
    conn: &Connection,
    index: &Index,
    record: &FlatRecord,
    commit: &IndexCommit,
) -> EngineResult<()> {
    let key = identity_key(record)?;
    let columns: Vec<String> = index.columns().iter().map(|c| c.name().to_string()).collect();

    // The history row carries the last-known data values; the submitted
    // model may hold nothing but its identity.
    let last_known = driver::read_row(
        conn,
        index.head_table(),
        &columns,
        index.identity_column(),
        &key,
    )?;
    let data = match last_known {
        Some(row) => row,
        None => record_values(record, index)?,
    };

    driver::delete_row(conn, index.head_table(), index.identity_column(), &key)?;

    append_history(conn, index, data, commit, OperationKind::Delete)
}

/// Appends one audit row tagged with the commit's metadata.
fn append_history(
    conn: &Connection,
    index: &Index,
    data: Vec<(String, SqlValue)>,
    commit: &IndexCommit,
    kind: OperationKind,
) -> EngineResult<()> {
    let mut row: Vec<(String, SqlValue)> = vec![
        (
            tables::REV_COMMIT.to_string(),
            SqlValue::Text(commit.id().to_string()),
        ),
        (
            tables::REV_TIMESTAMP.to_string(),
            SqlValue::Integer(commit.timestamp().as_millis()),
        ),
        (
            tables::REV_OPERATION.to_string(),
            SqlValue::Text(kind.as_str().to_string()),
        ),
        (
            tables::REV_USER.to_string(),
            SqlValue::Text(commit.user().to_string()),
        ),
        (
            tables::REV_CONTEXTID.to_string(),
            SqlValue::Text(commit.context().to_string()),
        ),
        (
            tables::REV_DOMAINID.to_string(),
            SqlValue::Text(commit.domain().to_string()),
        ),
        (
            tables::REV_CONNECTORID.to_string(),
            SqlValue::Text(commit.connector().to_string()),
        ),
        (
            tables::REV_INSTANCEID.to_string(),
            SqlValue::Text(commit.instance().to_string()),
        ),
    ];
    row.extend(data);

    driver::insert_row(conn, index.history_table(), &row)
}
