//! PostgreSQL / CockroachDB schema adapter.

use crate::error::MetaResult;
use crate::schema::{count_of, names_of, SchemaAdapter};
use async_trait::async_trait;
use tm_db::{Connection, DbKind, Value};
use tm_sql::quote_ident;

pub struct PostgresSchema<'a> {
    conn: &'a dyn Connection,
    kind: DbKind,
    name: String,
}

impl<'a> PostgresSchema<'a> {
    pub fn new(conn: &'a dyn Connection, name: impl Into<String>) -> Self {
        let kind = conn.kind();
        debug_assert!(matches!(kind, DbKind::PostgreSql | DbKind::CockroachDb));
        Self {
            conn,
            kind,
            name: name.into(),
        }
    }

    fn quoted(&self) -> String {
        quote_ident(self.kind, &self.name)
    }

    fn qualified(&self, object: &str) -> String {
        format!("{}.{}", self.quoted(), quote_ident(self.kind, object))
    }

    async fn object_names(&self, sql: &str) -> MetaResult<Vec<String>> {
        let rows = self
            .conn
            .query(sql, &[Value::from(self.name.as_str())])
            .await?;
        names_of(&rows)
    }
}

#[async_trait]
impl SchemaAdapter for PostgresSchema<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = $1",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        Ok(count_of(&rows)? > 0)
    }

    /// Counts tables, views, sequences, and routines.
    async fn is_empty(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT \
                   (SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = $1) \
                 + (SELECT COUNT(*) FROM information_schema.sequences WHERE sequence_schema = $1) \
                 + (SELECT COUNT(*) FROM information_schema.routines WHERE routine_schema = $1)",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        Ok(count_of(&rows)? == 0)
    }

    async fn create(&self) -> MetaResult<bool> {
        self.conn
            .execute(&format!("CREATE SCHEMA {}", self.quoted()), &[])
            .await?;
        Ok(true)
    }

    async fn drop_schema(&self) -> MetaResult<bool> {
        self.conn
            .execute(&format!("DROP SCHEMA {} CASCADE", self.quoted()), &[])
            .await?;
        Ok(true)
    }

    /// Views first, then tables, then sequences, then routines.
    async fn erase(&self) -> MetaResult<()> {
        for view in self
            .object_names(
                "SELECT table_name FROM information_schema.views WHERE table_schema = $1",
            )
            .await?
        {
            self.conn
                .execute(
                    &format!("DROP VIEW IF EXISTS {} CASCADE", self.qualified(&view)),
                    &[],
                )
                .await?;
        }
        for table in self
            .object_names(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_type = 'BASE TABLE'",
            )
            .await?
        {
            self.conn
                .execute(
                    &format!("DROP TABLE IF EXISTS {} CASCADE", self.qualified(&table)),
                    &[],
                )
                .await?;
        }
        for sequence in self
            .object_names(
                "SELECT sequence_name FROM information_schema.sequences \
                 WHERE sequence_schema = $1",
            )
            .await?
        {
            self.conn
                .execute(
                    &format!(
                        "DROP SEQUENCE IF EXISTS {} CASCADE",
                        self.qualified(&sequence)
                    ),
                    &[],
                )
                .await?;
        }
        if self.kind == DbKind::PostgreSql {
            // pg_proc carries the identity arguments needed to name an
            // overloaded function; information_schema does not.
            let rows = self
                .conn
                .query(
                    "SELECT p.proname, pg_get_function_identity_arguments(p.oid) \
                     FROM pg_proc p JOIN pg_namespace n ON n.oid = p.pronamespace \
                     WHERE n.nspname = $1",
                    &[Value::from(self.name.as_str())],
                )
                .await?;
            for row in &rows {
                let func = row
                    .first()
                    .and_then(|v| v.as_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let args = row
                    .get(1)
                    .and_then(|v| v.as_str().ok())
                    .unwrap_or_default()
                    .to_string();
                self.conn
                    .execute(
                        &format!(
                            "DROP FUNCTION IF EXISTS {}({args}) CASCADE",
                            self.qualified(&func)
                        ),
                        &[],
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
