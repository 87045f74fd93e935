//! Engine integration tests against a file-backed store.
//!
//! A separate probe connection inspects the tables the engine writes, so
//! the assertions never go through the code under test.

use std::sync::Arc;

use revtab_core::{CommitBuilder, EngineError, IndexEngine, Timestamp};
use revtab_model::Model;
use rusqlite::Connection;
use tempfile::TempDir;

struct Fixture {
    // Held for its Drop; the directory outlives engine and probe.
    _dir: TempDir,
    engine: IndexEngine,
    probe: Connection,
    path: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revtab.db");
    let engine = IndexEngine::open_path(&path).unwrap();
    let probe = Connection::open(&path).unwrap();
    Fixture {
        _dir: dir,
        engine,
        probe,
        path,
    }
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn test_model(id: &str, integer: i64) -> Model {
    Model::new("TestModel")
        .with_id("testId", id)
        .with("testInteger", integer)
}

fn sub_model() -> Model {
    Model::new("SubTestModel").with_id("id", 11i64)
}

fn new_test_commit() -> CommitBuilder {
    CommitBuilder::new()
        .context("testContext")
        .user("testUser")
        .domain("testDomain")
        .connector("testConnector")
        .instance("testInstance")
}

#[test]
fn create_index_creates_database_tables() {
    let f = fixture();
    let index = f.engine.create_index(&test_model("proto", 0)).unwrap();

    let sql = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
    let heads: i64 = f.probe.query_row(sql, [index.head_table()], |r| r.get(0)).unwrap();
    let histories: i64 = f
        .probe
        .query_row(sql, [index.history_table()], |r| r.get(0))
        .unwrap();

    assert_eq!(heads, 1);
    assert_eq!(histories, 1);
}

#[test]
fn create_index_twice_fails() {
    let f = fixture();
    f.engine.create_index(&test_model("proto", 0)).unwrap();

    let err = f.engine.create_index(&test_model("proto", 0)).unwrap_err();
    assert!(matches!(err, EngineError::IndexExists { .. }));
}

#[test]
fn get_index_for_unknown_type_fails() {
    let f = fixture();
    let err = f.engine.get_index("Nope").unwrap_err();
    assert!(matches!(err, EngineError::UnknownIndex { .. }));
}

#[test]
fn index_registration_survives_restart() {
    let f = fixture();
    f.engine.create_index(&test_model("proto", 0)).unwrap();
    drop(f.engine);

    let reopened = IndexEngine::open_path(&f.path).unwrap();
    assert!(reopened.index_exists("TestModel").unwrap());

    let index = reopened.get_index("TestModel").unwrap();
    assert_eq!(index.head_table(), "TESTMODEL_HEAD");
    assert_eq!(index.identity_column(), "TESTID");
    assert!(index.columns().contains("TESTINTEGER"));
}

#[test]
fn commit_creates_index_inherently() {
    let f = fixture();
    assert!(!f.engine.index_exists("TestModel").unwrap());
    assert_eq!(count(&f.probe, "INDEX_INFORMATION"), 0);

    let commit = new_test_commit().insert(test_model("foo", 1)).build();
    f.engine.commit(&commit).unwrap();

    assert_eq!(count(&f.probe, "INDEX_INFORMATION"), 1);
    assert!(f.engine.index_exists("TestModel").unwrap());
}

#[test]
fn commit_insert_round_trip() {
    let f = fixture();
    let commit = new_test_commit()
        .timestamp(Timestamp::from_millis(42))
        .insert(test_model("foo", 1))
        .build();
    f.engine.commit(&commit).unwrap();

    assert_eq!(count(&f.probe, "TESTMODEL_HEAD"), 1);
    assert_eq!(count(&f.probe, "TESTMODEL_HISTORY"), 1);

    let (id, integer, created, modified): (String, i64, i64, Option<i64>) = f
        .probe
        .query_row(
            "SELECT TESTID, TESTINTEGER, REV_CREATED, REV_MODIFIED FROM TESTMODEL_HEAD",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(id, "foo");
    assert_eq!(integer, 1);
    assert_eq!(created, 42);
    assert_eq!(modified, None);

    let operation: String = f
        .probe
        .query_row("SELECT REV_OPERATION FROM TESTMODEL_HISTORY", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(operation, "INSERT");
}

#[test]
fn commit_update_updates_tables_correctly() {
    let f = fixture();

    let insert = new_test_commit()
        .timestamp(Timestamp::from_millis(42))
        .insert(test_model("foo", 1))
        .build();
    f.engine.commit(&insert).unwrap();

    let update = new_test_commit()
        .timestamp(Timestamp::from_millis(84))
        .update(test_model("foo", 42))
        .build();
    f.engine.commit(&update).unwrap();

    assert_eq!(count(&f.probe, "TESTMODEL_HEAD"), 1);
    assert_eq!(count(&f.probe, "TESTMODEL_HISTORY"), 2);

    let (integer, created, modified): (i64, i64, Option<i64>) = f
        .probe
        .query_row(
            "SELECT TESTINTEGER, REV_CREATED, REV_MODIFIED FROM TESTMODEL_HEAD",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(integer, 42);
    assert_eq!(created, 42);
    assert_eq!(modified, Some(84));

    let mut stmt = f
        .probe
        .prepare(
            "SELECT REV_OPERATION, TESTINTEGER FROM TESTMODEL_HISTORY ORDER BY REV_TIMESTAMP",
        )
        .unwrap();
    let revisions: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(
        revisions,
        vec![("INSERT".to_string(), 1), ("UPDATE".to_string(), 42)]
    );
}

#[test]
fn commit_delete_updates_tables_correctly() {
    let f = fixture();

    let insert = new_test_commit()
        .timestamp(Timestamp::from_millis(42))
        .insert(test_model("foo", 1))
        .build();
    f.engine.commit(&insert).unwrap();

    // The delete submission carries only the identity; history must still
    // record the last-known data values.
    let delete = new_test_commit()
        .timestamp(Timestamp::from_millis(84))
        .delete(Model::new("TestModel").with_id("testId", "foo"))
        .build();
    f.engine.commit(&delete).unwrap();

    assert_eq!(count(&f.probe, "TESTMODEL_HEAD"), 0);
    assert_eq!(count(&f.probe, "TESTMODEL_HISTORY"), 2);

    let mut stmt = f
        .probe
        .prepare(
            "SELECT REV_OPERATION, TESTINTEGER FROM TESTMODEL_HISTORY ORDER BY REV_TIMESTAMP",
        )
        .unwrap();
    let revisions: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(
        revisions,
        vec![("INSERT".to_string(), 1), ("DELETE".to_string(), 1)]
    );
}

#[test]
fn commit_insert_with_submodel_inserts_records() {
    let f = fixture();

    let commit = new_test_commit()
        .insert(test_model("foo", 1).with("subModel", sub_model()))
        .insert(sub_model())
        .insert(test_model("bar", 2))
        .build();
    f.engine.commit(&commit).unwrap();

    assert_eq!(count(&f.probe, "TESTMODEL_HEAD"), 2);
    assert_eq!(count(&f.probe, "TESTMODEL_HISTORY"), 2);
    assert_eq!(count(&f.probe, "SUBTESTMODEL_HEAD"), 1);
    assert_eq!(count(&f.probe, "SUBTESTMODEL_HISTORY"), 1);

    // the foreign key column holds the sub-model's identity
    let fk: i64 = f
        .probe
        .query_row(
            "SELECT SUBMODEL FROM TESTMODEL_HEAD WHERE TESTID = 'foo'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(fk, 11);
}

#[test]
fn commit_nested_submodel_is_inserted_implicitly() {
    let f = fixture();

    let commit = new_test_commit()
        .insert(test_model("foo", 1).with("subModel", sub_model()))
        .build();
    f.engine.commit(&commit).unwrap();

    assert_eq!(count(&f.probe, "SUBTESTMODEL_HEAD"), 1);

    let id: i64 = f
        .probe
        .query_row("SELECT ID FROM SUBTESTMODEL_HEAD", [], |row| row.get(0))
        .unwrap();
    assert_eq!(id, 11);
}

#[test]
fn commit_metadata_reaches_every_history_row() {
    let f = fixture();

    let commit = new_test_commit()
        .timestamp(Timestamp::from_millis(42))
        .insert(sub_model())
        .insert(test_model("foo", 1))
        .build();
    f.engine.commit(&commit).unwrap();

    for table in ["TESTMODEL_HISTORY", "SUBTESTMODEL_HISTORY"] {
        let row: (String, String, String, String, String, i64, String) = f
            .probe
            .query_row(
                &format!(
                    "SELECT REV_USER, REV_CONTEXTID, REV_DOMAINID, REV_CONNECTORID, \
                     REV_INSTANCEID, REV_TIMESTAMP, REV_COMMIT FROM \"{table}\""
                ),
                [],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                },
            )
            .unwrap();

        assert_eq!(row.0, "testUser");
        assert_eq!(row.1, "testContext");
        assert_eq!(row.2, "testDomain");
        assert_eq!(row.3, "testConnector");
        assert_eq!(row.4, "testInstance");
        assert_eq!(row.5, 42);
        assert_eq!(row.6, commit.id().to_string());
    }
}

#[test]
fn failing_commit_rolls_back_the_whole_batch() {
    let f = fixture();

    // Two inserts with the same identity violate the head table's unique
    // constraint on the second operation.
    let commit = new_test_commit()
        .insert(test_model("foo", 1))
        .insert(test_model("foo", 2))
        .build();

    let err = f.engine.commit(&commit).unwrap_err();
    assert!(matches!(err, EngineError::CommitFailed { .. }));

    // nothing of the batch is observable, not even the index creation
    assert_eq!(count(&f.probe, "INDEX_INFORMATION"), 0);
    assert!(!f.engine.index_exists("TestModel").unwrap());

    // a later commit works and sees a clean slate
    let retry = new_test_commit().insert(test_model("foo", 3)).build();
    f.engine.commit(&retry).unwrap();
    assert_eq!(count(&f.probe, "TESTMODEL_HEAD"), 1);
    assert_eq!(count(&f.probe, "TESTMODEL_HISTORY"), 1);
}

#[test]
fn racing_first_commits_both_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("revtab.db");

    // warm up the registry so both threads race only on the model schema
    drop(IndexEngine::open_path(&path).unwrap());

    let mut handles = Vec::new();
    for i in 0..2 {
        let path = path.clone();
        handles.push(std::thread::spawn(move || {
            let engine = IndexEngine::open_path(&path).unwrap();
            let commit = new_test_commit()
                .insert(test_model(&format!("m{i}"), i))
                .build();
            engine.commit(&commit).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let probe = Connection::open(&path).unwrap();
    assert_eq!(count(&probe, "TESTMODEL_HEAD"), 2);
    assert_eq!(count(&probe, "TESTMODEL_HISTORY"), 2);
    assert_eq!(count(&probe, "INDEX_INFORMATION"), 1);
}

#[test]
fn shared_engine_commits_from_multiple_threads() {
    let f = fixture();
    let engine = Arc::new(f.engine);

    let mut handles = Vec::new();
    for i in 0..4 {
        let engine = Arc::clone(&engine);
        handles.push(std::thread::spawn(move || {
            let commit = new_test_commit()
                .insert(test_model(&format!("m{i}"), i))
                .build();
            engine.commit(&commit).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(count(&f.probe, "TESTMODEL_HEAD"), 4);
    assert_eq!(count(&f.probe, "TESTMODEL_HISTORY"), 4);
}

#[test]
fn drop_index_removes_tables_and_registration() {
    let f = fixture();

    let commit = new_test_commit().insert(test_model("foo", 1)).build();
    f.engine.commit(&commit).unwrap();

    f.engine.drop_index("TestModel").unwrap();

    assert!(!f.engine.index_exists("TestModel").unwrap());
    let tables: i64 = f
        .probe
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' \
             AND name IN ('TESTMODEL_HEAD', 'TESTMODEL_HISTORY')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 0);

    let err = f.engine.drop_index("TestModel").unwrap_err();
    assert!(matches!(err, EngineError::UnknownIndex { .. }));
}

#[test]
fn reference_property_is_materialized_as_text() {
    let f = fixture();

    let model = Model::new("Widget")
        .with_id("id", "w1")
        .with_reference("blueprint", revtab_model::Reference::new("ctx", "b1"));
    let commit = new_test_commit().insert(model).build();
    f.engine.commit(&commit).unwrap();

    let raw: String = f
        .probe
        .query_row("SELECT BLUEPRINT FROM WIDGET_HEAD", [], |row| row.get(0))
        .unwrap();
    assert_eq!(raw, "ctx/b1");
}

#[test]
fn list_and_map_properties_flatten_into_columns() {
    let f = fixture();

    let model = Model::new("TaggedModel")
        .with_id("id", "t1")
        .with("tags", vec!["x", "y"])
        .with(
            "attrs",
            revtab_model::Value::Map(vec![(
                "color".to_string(),
                revtab_model::Value::Text("red".to_string()),
            )]),
        );
    let commit = new_test_commit().insert(model).build();
    f.engine.commit(&commit).unwrap();

    let (tag0, tag1, key0, value0): (String, String, String, String) = f
        .probe
        .query_row(
            "SELECT TAGS_0, TAGS_1, ATTRS_KEY_0, ATTRS_VALUE_0 FROM TAGGEDMODEL_HEAD",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!((tag0.as_str(), tag1.as_str()), ("x", "y"));
    assert_eq!((key0.as_str(), value0.as_str()), ("color", "red"));
}

#[test]
fn invalid_model_fails_before_any_write() {
    let f = fixture();

    let commit = new_test_commit()
        .insert(Model::new("TestModel").with("testInteger", 1i64))
        .build();

    let err = f.engine.commit(&commit).unwrap_err();
    assert!(matches!(err, EngineError::Model(_)));
    assert_eq!(count(&f.probe, "INDEX_INFORMATION"), 0);
}
