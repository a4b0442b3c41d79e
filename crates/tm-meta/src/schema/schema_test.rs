use super::*;
use crate::testutil::FakeConn;
use tm_db::Value;

#[tokio::test]
async fn test_adapter_for_reports_managed_name() {
    for kind in [
        DbKind::Sqlite,
        DbKind::MySql,
        DbKind::PostgreSql,
        DbKind::SqlServer,
        DbKind::Cassandra,
        DbKind::CockroachDb,
    ] {
        let conn = FakeConn::new(kind);
        assert_eq!(adapter_for(&conn, "app").name(), "app");
    }
}

#[tokio::test]
async fn test_postgres_exists_and_empty_checks() {
    let conn = FakeConn::new(DbKind::PostgreSql);
    let adapter = adapter_for(&conn, "app");

    conn.push_result(vec![vec![Value::Int(1)]]);
    assert!(adapter.exists().await.unwrap());
    {
        let queries = conn.queries.lock().unwrap();
        assert!(queries[0].0.contains("information_schema.schemata"));
        assert_eq!(queries[0].1, vec![Value::from("app")]);
    }

    conn.push_result(vec![vec![Value::Int(0)]]);
    assert!(adapter.is_empty().await.unwrap());
    conn.push_result(vec![vec![Value::Int(3)]]);
    assert!(!adapter.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_postgres_erase_drops_views_before_tables() {
    let conn = FakeConn::new(DbKind::PostgreSql);
    conn.push_result(vec![vec![Value::from("v1")]]); // views
    conn.push_result(vec![vec![Value::from("t1")], vec![Value::from("t2")]]); // tables
    conn.push_result(vec![vec![Value::from("seq1")]]); // sequences
    conn.push_result(vec![vec![
        Value::from("f"),
        Value::from("integer, text"),
    ]]); // pg_proc
    adapter_for(&conn, "app").erase().await.unwrap();

    let executed = conn.executed_sql();
    assert_eq!(
        executed,
        vec![
            "DROP VIEW IF EXISTS \"app\".\"v1\" CASCADE",
            "DROP TABLE IF EXISTS \"app\".\"t1\" CASCADE",
            "DROP TABLE IF EXISTS \"app\".\"t2\" CASCADE",
            "DROP SEQUENCE IF EXISTS \"app\".\"seq1\" CASCADE",
            "DROP FUNCTION IF EXISTS \"app\".\"f\"(integer, text) CASCADE",
        ]
    );
}

#[tokio::test]
async fn test_cockroach_erase_skips_function_pass() {
    let conn = FakeConn::new(DbKind::CockroachDb);
    conn.push_result(vec![]); // views
    conn.push_result(vec![vec![Value::from("t1")]]); // tables
    conn.push_result(vec![]); // sequences
    adapter_for(&conn, "app").erase().await.unwrap();

    assert_eq!(conn.queried_sql().len(), 3); // no pg_proc query
    assert_eq!(
        conn.executed_sql(),
        vec!["DROP TABLE IF EXISTS \"app\".\"t1\" CASCADE"]
    );
}

#[tokio::test]
async fn test_mysql_erase_toggles_foreign_key_checks() {
    let conn = FakeConn::new(DbKind::MySql);
    conn.push_result(vec![]); // events
    conn.push_result(vec![vec![Value::from("do_thing"), Value::from("PROCEDURE")]]); // routines
    conn.push_result(vec![]); // views
    conn.push_result(vec![vec![Value::from("t1")]]); // tables
    adapter_for(&conn, "app").erase().await.unwrap();

    assert_eq!(
        conn.executed_sql(),
        vec![
            "DROP PROCEDURE IF EXISTS `app`.`do_thing`",
            "SET FOREIGN_KEY_CHECKS = 0",
            "DROP TABLE IF EXISTS `app`.`t1`",
            "SET FOREIGN_KEY_CHECKS = 1",
        ]
    );
}

#[tokio::test]
async fn test_sqlite_has_no_schema_namespace() {
    let conn = FakeConn::new(DbKind::Sqlite);
    let adapter = adapter_for(&conn, "main");
    assert!(adapter.exists().await.unwrap());
    assert!(!adapter.create().await.unwrap());
    assert!(!adapter.drop_schema().await.unwrap());
    assert!(conn.executed_sql().is_empty());
}

#[tokio::test]
async fn test_sqlite_erase_restores_foreign_keys_on_failure() {
    let conn = FakeConn::new(DbKind::Sqlite);
    conn.push_result(vec![]); // triggers
    conn.push_result(vec![]); // views
    conn.push_result(vec![vec![Value::from("t1")]]); // tables
    conn.fail_execute_containing("DROP TABLE");
    let err = adapter_for(&conn, "main").erase().await;
    assert!(err.is_err());

    let executed = conn.executed_sql();
    assert_eq!(executed.first().map(String::as_str), Some("PRAGMA foreign_keys = OFF"));
    assert_eq!(executed.last().map(String::as_str), Some("PRAGMA foreign_keys = ON"));
}

#[tokio::test]
async fn test_sqlserver_drop_schema_erases_contents_first() {
    let conn = FakeConn::new(DbKind::SqlServer);
    conn.push_result(vec![vec![Value::from("fk_orders"), Value::from("orders")]]); // fks
    conn.push_result(vec![]); // P
    conn.push_result(vec![]); // FN, IF, TF
    conn.push_result(vec![]); // V
    conn.push_result(vec![vec![Value::from("orders")]]); // U
    conn.push_result(vec![]); // SN
    conn.push_result(vec![]); // SO
    assert!(adapter_for(&conn, "app").drop_schema().await.unwrap());

    assert_eq!(
        conn.executed_sql(),
        vec![
            "ALTER TABLE [app].[orders] DROP CONSTRAINT [fk_orders]",
            "DROP TABLE [app].[orders]",
            "DROP SCHEMA [app]",
        ]
    );
}

#[tokio::test]
async fn test_cassandra_keyspace_lifecycle() {
    let conn = FakeConn::new(DbKind::Cassandra);
    let adapter = adapter_for(&conn, "ks");

    conn.push_result(vec![vec![Value::from("ks")]]);
    assert!(adapter.exists().await.unwrap());
    conn.push_result(vec![]); // no keyspace row
    assert!(!adapter.exists().await.unwrap());

    conn.push_result(vec![]); // tables
    conn.push_result(vec![]); // views
    assert!(adapter.is_empty().await.unwrap());

    assert!(adapter.create().await.unwrap());
    let executed = conn.executed_sql();
    assert!(executed[0].starts_with("CREATE KEYSPACE \"ks\" WITH replication"));
    assert!(executed[0].contains("SimpleStrategy"));
}

#[tokio::test]
async fn test_cassandra_erase_drops_views_before_tables() {
    let conn = FakeConn::new(DbKind::Cassandra);
    conn.push_result(vec![vec![Value::from("mv")]]); // views
    conn.push_result(vec![vec![Value::from("t")]]); // tables
    adapter_for(&conn, "ks").erase().await.unwrap();

    assert_eq!(
        conn.executed_sql(),
        vec![
            "DROP MATERIALIZED VIEW IF EXISTS \"ks\".\"mv\"",
            "DROP TABLE IF EXISTS \"ks\".\"t\"",
        ]
    );
}
