use super::*;
use crate::testutil::FakeConn;

#[test]
fn test_lock_key_is_stable_per_table_name() {
    assert_eq!(lock_key("changelog"), lock_key("changelog"));
    assert_ne!(lock_key("changelog"), lock_key("history"));
}

#[test]
fn test_has_application_lock_by_dialect() {
    for kind in [DbKind::MySql, DbKind::PostgreSql, DbKind::SqlServer] {
        assert!(has_application_lock(kind));
    }
    for kind in [DbKind::Sqlite, DbKind::Cassandra, DbKind::CockroachDb] {
        assert!(!has_application_lock(kind));
    }
}

#[tokio::test]
async fn test_mysql_get_lock_outcomes() {
    let conn = FakeConn::new(DbKind::MySql);
    conn.push_result(vec![vec![Value::Int(1)]]);
    assert!(try_acquire_application_lock(&conn, "changelog").await);

    conn.push_result(vec![vec![Value::Int(0)]]); // held elsewhere
    assert!(!try_acquire_application_lock(&conn, "changelog").await);

    let queried = conn.queried_sql();
    assert!(queried.iter().all(|s| s == "SELECT GET_LOCK(?, 0)"));
    let queries = conn.queries.lock().unwrap();
    assert_eq!(queries[0].1, vec![Value::from("tidemark:changelog")]);
}

#[tokio::test]
async fn test_postgres_advisory_lock_binds_derived_key() {
    let conn = FakeConn::new(DbKind::PostgreSql);
    conn.push_result(vec![vec![Value::Bool(true)]]);
    assert!(try_acquire_application_lock(&conn, "changelog").await);

    conn.push_result(vec![vec![Value::Bool(false)]]);
    assert!(!try_acquire_application_lock(&conn, "changelog").await);

    let queries = conn.queries.lock().unwrap();
    assert_eq!(queries[0].0, "SELECT pg_try_advisory_lock($1)");
    assert_eq!(queries[0].1, vec![Value::Int(lock_key("changelog"))]);
}

#[tokio::test]
async fn test_sqlserver_applock_return_codes() {
    let conn = FakeConn::new(DbKind::SqlServer);
    conn.push_result(vec![vec![Value::Int(0)]]); // granted
    assert!(try_acquire_application_lock(&conn, "changelog").await);

    conn.push_result(vec![vec![Value::Int(1)]]); // granted after wait
    assert!(try_acquire_application_lock(&conn, "changelog").await);

    conn.push_result(vec![vec![Value::Int(-1)]]); // timeout
    assert!(!try_acquire_application_lock(&conn, "changelog").await);
}

#[tokio::test]
async fn test_driver_error_degrades_to_not_acquired() {
    let conn = FakeConn::new(DbKind::MySql);
    conn.push_error("gone away");
    assert!(!try_acquire_application_lock(&conn, "changelog").await);
}

#[tokio::test]
async fn test_dialects_without_advisory_lock_report_acquired() {
    for kind in [DbKind::Sqlite, DbKind::Cassandra, DbKind::CockroachDb] {
        let conn = FakeConn::new(kind);
        assert!(try_acquire_application_lock(&conn, "changelog").await);
        assert!(release_application_lock(&conn, "changelog").await);
        assert!(conn.queried_sql().is_empty());
        assert!(conn.executed_sql().is_empty());
    }
}

#[tokio::test]
async fn test_release_outcomes() {
    let mysql = FakeConn::new(DbKind::MySql);
    mysql.push_result(vec![vec![Value::Int(1)]]);
    assert!(release_application_lock(&mysql, "changelog").await);
    mysql.push_result(vec![vec![Value::Int(0)]]); // not held by this session
    assert!(!release_application_lock(&mysql, "changelog").await);

    let pg = FakeConn::new(DbKind::PostgreSql);
    pg.push_result(vec![vec![Value::Bool(true)]]);
    assert!(release_application_lock(&pg, "changelog").await);

    let mssql = FakeConn::new(DbKind::SqlServer);
    assert!(release_application_lock(&mssql, "changelog").await);
    assert!(mssql.executed_sql()[0].starts_with("EXEC sp_releaseapplock"));
}
