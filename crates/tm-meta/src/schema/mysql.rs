//! MySQL schema adapter. A schema and a database are the same container.

use crate::error::MetaResult;
use crate::schema::{count_of, names_of, SchemaAdapter};
use async_trait::async_trait;
use tm_db::{Connection, DbKind, Value};
use tm_sql::quote_ident;

pub struct MySqlSchema<'a> {
    conn: &'a dyn Connection,
    name: String,
}

impl<'a> MySqlSchema<'a> {
    pub fn new(conn: &'a dyn Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    fn quoted(&self) -> String {
        quote_ident(DbKind::MySql, &self.name)
    }

    fn qualified(&self, object: &str) -> String {
        format!("{}.{}", self.quoted(), quote_ident(DbKind::MySql, object))
    }

    async fn object_names(&self, sql: &str) -> MetaResult<Vec<String>> {
        let rows = self
            .conn
            .query(sql, &[Value::from(self.name.as_str())])
            .await?;
        names_of(&rows)
    }

    async fn drop_all(&self, names: Vec<String>, object_kind: &str) -> MetaResult<()> {
        for name in names {
            self.conn
                .execute(
                    &format!("DROP {object_kind} IF EXISTS {}", self.qualified(&name)),
                    &[],
                )
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaAdapter for MySqlSchema<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        Ok(count_of(&rows)? > 0)
    }

    /// Counts tables and views, routines, and events.
    async fn is_empty(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT \
                   (SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ?) \
                 + (SELECT COUNT(*) FROM information_schema.routines WHERE routine_schema = ?) \
                 + (SELECT COUNT(*) FROM information_schema.events WHERE event_schema = ?)",
                &[
                    Value::from(self.name.as_str()),
                    Value::from(self.name.as_str()),
                    Value::from(self.name.as_str()),
                ],
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
            .execute(&format!("DROP SCHEMA {}", self.quoted()), &[])
            .await?;
        Ok(true)
    }

    /// Events, routines, views, then tables with FK checks off around the
    /// table pass.
    async fn erase(&self) -> MetaResult<()> {
        let events = self
            .object_names(
                "SELECT event_name FROM information_schema.events WHERE event_schema = ?",
            )
            .await?;
        self.drop_all(events, "EVENT").await?;

        let rows = self
            .conn
            .query(
                "SELECT routine_name, routine_type FROM information_schema.routines \
                 WHERE routine_schema = ?",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        for row in &rows {
            let name = row
                .first()
                .and_then(|v| v.as_str().ok())
                .unwrap_or_default()
                .to_string();
            let routine_type = row
                .get(1)
                .and_then(|v| v.as_str().ok())
                .unwrap_or("FUNCTION")
                .to_string();
            self.conn
                .execute(
                    &format!("DROP {routine_type} IF EXISTS {}", self.qualified(&name)),
                    &[],
                )
                .await?;
        }

        let views = self
            .object_names(
                "SELECT table_name FROM information_schema.views WHERE table_schema = ?",
            )
            .await?;
        self.drop_all(views, "VIEW").await?;

        let tables = self
            .object_names(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = ? AND table_type = 'BASE TABLE'",
            )
            .await?;
        self.conn.execute("SET FOREIGN_KEY_CHECKS = 0", &[]).await?;
        let dropped = self.drop_all(tables, "TABLE").await;
        self.conn.execute("SET FOREIGN_KEY_CHECKS = 1", &[]).await?;
        dropped
    }
}
