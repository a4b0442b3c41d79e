//! Cassandra keyspace adapter, over system_schema.

use crate::error::MetaResult;
use crate::schema::{names_of, SchemaAdapter};
use async_trait::async_trait;
use tm_db::{Connection, DbKind, Value};
use tm_sql::quote_ident;

pub struct CassandraKeyspace<'a> {
    conn: &'a dyn Connection,
    name: String,
}

impl<'a> CassandraKeyspace<'a> {
    pub fn new(conn: &'a dyn Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    fn quoted(&self) -> String {
        quote_ident(DbKind::Cassandra, &self.name)
    }

    fn qualified(&self, object: &str) -> String {
        format!("{}.{}", self.quoted(), quote_ident(DbKind::Cassandra, object))
    }

    async fn object_names(&self, catalog_table: &str) -> MetaResult<Vec<String>> {
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT table_name FROM system_schema.{catalog_table} \
                     WHERE keyspace_name = ?"
                ),
                &[Value::from(self.name.as_str())],
            )
            .await?;
        names_of(&rows)
    }
}

#[async_trait]
impl SchemaAdapter for CassandraKeyspace<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT keyspace_name FROM system_schema.keyspaces WHERE keyspace_name = ?",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Counts tables and materialized views.
    async fn is_empty(&self) -> MetaResult<bool> {
        let tables = self.object_names("tables").await?;
        if !tables.is_empty() {
            return Ok(false);
        }
        let rows = self
            .conn
            .query(
                "SELECT view_name FROM system_schema.views WHERE keyspace_name = ?",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        Ok(rows.is_empty())
    }

    async fn create(&self) -> MetaResult<bool> {
        self.conn
            .execute(
                &format!(
                    "CREATE KEYSPACE {} WITH replication = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                    self.quoted()
                ),
                &[],
            )
            .await?;
        Ok(true)
    }

    async fn drop_schema(&self) -> MetaResult<bool> {
        self.conn
            .execute(&format!("DROP KEYSPACE {}", self.quoted()), &[])
            .await?;
        Ok(true)
    }

    /// Materialized views first (tables cannot drop while views reference
    /// them), then tables.
    async fn erase(&self) -> MetaResult<()> {
        let rows = self
            .conn
            .query(
                "SELECT view_name FROM system_schema.views WHERE keyspace_name = ?",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        for view in names_of(&rows)? {
            self.conn
                .execute(
                    &format!("DROP MATERIALIZED VIEW IF EXISTS {}", self.qualified(&view)),
                    &[],
                )
                .await?;
        }
        for table in self.object_names("tables").await? {
            self.conn
                .execute(
                    &format!("DROP TABLE IF EXISTS {}", self.qualified(&table)),
                    &[],
                )
                .await?;
        }
        Ok(())
    }
}
