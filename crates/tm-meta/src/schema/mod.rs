//! Schema adapters.
//!
//! - [`postgres`] — PostgreSQL and CockroachDB (information_schema)
//! - [`mysql`] — MySQL (schema == database)
//! - [`sqlserver`] — SQL Server (sys catalog)
//! - [`sqlite`] — SQLite (single attached database)
//! - [`cassandra`] — Cassandra keyspaces (system_schema)

pub mod cassandra;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;

use crate::error::{MetaError, MetaResult};
use async_trait::async_trait;
use tm_db::{Connection, DbKind, Row};

pub use cassandra::CassandraKeyspace;
pub use mysql::MySqlSchema;
pub use postgres::PostgresSchema;
pub use sqlite::SqliteSchema;
pub use sqlserver::SqlServerSchema;

/// Existence/emptiness checks and the destructive primitives for one named
/// schema (or keyspace, or database — whatever the dialect's container is).
#[async_trait]
pub trait SchemaAdapter: Send + Sync {
    /// The managed schema name.
    fn name(&self) -> &str;

    async fn exists(&self) -> MetaResult<bool>;

    /// Dialect-specific catalog count of contained objects; the object kinds
    /// counted are normative per adapter, not generalized.
    async fn is_empty(&self) -> MetaResult<bool>;

    /// Create the schema. Returns false where the dialect has no schema
    /// namespace to create (SQLite).
    async fn create(&self) -> MetaResult<bool>;

    /// Drop the schema container entirely. Returns false where unsupported.
    async fn drop_schema(&self) -> MetaResult<bool>;

    /// Drop every owned object without dropping the container itself.
    async fn erase(&self) -> MetaResult<()>;
}

/// Resolve the schema adapter for the connection's dialect.
pub fn adapter_for<'a>(
    conn: &'a dyn Connection,
    schema: &str,
) -> Box<dyn SchemaAdapter + 'a> {
    match conn.kind() {
        DbKind::PostgreSql | DbKind::CockroachDb => {
            Box::new(PostgresSchema::new(conn, schema))
        }
        DbKind::MySql => Box::new(MySqlSchema::new(conn, schema)),
        DbKind::SqlServer => Box::new(SqlServerSchema::new(conn, schema)),
        DbKind::Sqlite => Box::new(SqliteSchema::new(conn, schema)),
        DbKind::Cassandra => Box::new(CassandraKeyspace::new(conn, schema)),
    }
}

/// First cell of the first row as a count; no rows counts as zero.
pub(crate) fn count_of(rows: &[Row]) -> MetaResult<i64> {
    rows.first()
        .and_then(|r| r.first())
        .map(|v| v.as_i64().map_err(|e| MetaError::Row(e.to_string())))
        .unwrap_or(Ok(0))
}

/// First cell of every row as text, for catalog name listings.
pub(crate) fn names_of(rows: &[Row]) -> MetaResult<Vec<String>> {
    rows.iter()
        .map(|r| {
            r.first()
                .ok_or_else(|| MetaError::Row("empty catalog row".to_string()))?
                .as_str()
                .map(str::to_string)
                .map_err(|e| MetaError::Row(e.to_string()))
        })
        .collect()
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
