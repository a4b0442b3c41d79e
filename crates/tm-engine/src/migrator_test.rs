use super::*;
use crate::testutil::Harness;
use tm_db::{DbKind, Value};

fn script(name: &str, content: &str) -> MigrationScript {
    MigrationScript::from_name(name, content, &MigrationOptions::default()).unwrap()
}

#[tokio::test]
async fn test_info_dumps_metadata_rows() {
    let harness = Harness::new(DbKind::Sqlite);
    let conn = harness.conn();
    harness.seed_applied(&script("V1__one.sql", "CREATE TABLE one (id INT);"));
    harness.seed_marker(MigrationKind::EmptySchema, None, "main");

    let rows = Migrator::with_store(&conn, MigrationOptions::default(), vec![], harness.store())
        .info()
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "V1__one.sql");
    assert_eq!(rows[1].kind, MigrationKind::EmptySchema);
}

#[tokio::test]
async fn test_migrate_locks_and_unlocks_the_metadata_table() {
    let harness = Harness::new(DbKind::Sqlite);
    let conn = harness.conn();
    Migrator::with_store(&conn, MigrationOptions::default(), vec![], harness.store())
        .migrate()
        .await
        .unwrap();
    assert_eq!(harness.table_locks(), 1);
    assert_eq!(harness.table_releases(), 1);
}

#[tokio::test]
async fn test_metadata_lock_failure_is_fatal() {
    let harness = Harness::new(DbKind::Sqlite);
    let conn = harness.conn();
    harness.deny_lock();
    let scripts = vec![script("V1__one.sql", "CREATE TABLE one (id INT);")];
    let err = Migrator::with_store(&conn, MigrationOptions::default(), scripts, harness.store())
        .migrate()
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Lock(_)));
    assert!(harness.rows().is_empty());
    assert!(harness.executed_sql().is_empty());
}

#[tokio::test]
async fn test_application_lock_failure_stops_before_the_table_lock() {
    let harness = Harness::new(DbKind::MySql);
    let conn = harness.conn();
    harness.push_result(vec![vec![Value::Int(0)]]); // GET_LOCK: held elsewhere
    let err = Migrator::with_store(&conn, MigrationOptions::default(), vec![], harness.store())
        .migrate()
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Lock(_)));
    assert_eq!(harness.table_locks(), 0);
}

#[tokio::test]
async fn test_first_contact_markers_written_once() {
    let harness = Harness::new(DbKind::Sqlite);
    let conn = harness.conn();
    let mut options = MigrationOptions::default();
    options.schemas = vec!["main".to_string()];

    harness.push_result(vec![vec![Value::Int(0)]]); // sqlite_master: empty
    Migrator::with_store(&conn, options.clone(), vec![], harness.store())
        .migrate()
        .await
        .unwrap();

    harness.push_result(vec![vec![Value::Int(0)]]); // still empty
    Migrator::with_store(&conn, options, vec![], harness.store())
        .migrate()
        .await
        .unwrap();

    let markers: Vec<_> = harness
        .rows()
        .into_iter()
        .filter(|r| r.kind == MigrationKind::EmptySchema)
        .collect();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].name, "main");
}
