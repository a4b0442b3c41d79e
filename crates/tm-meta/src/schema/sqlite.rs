//! SQLite schema adapter.
//!
//! SQLite has no schema namespace beyond the single attached database, so
//! create/drop are unsupported no-ops; exists is always true; erase clears
//! the whole database.

use crate::error::MetaResult;
use crate::schema::{count_of, names_of, SchemaAdapter};
use async_trait::async_trait;
use tm_db::{Connection, DbKind};
use tm_sql::quote_ident;

pub struct SqliteSchema<'a> {
    conn: &'a dyn Connection,
    name: String,
}

impl<'a> SqliteSchema<'a> {
    pub fn new(conn: &'a dyn Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    async fn object_names(&self, object_type: &str) -> MetaResult<Vec<String>> {
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT name FROM sqlite_master \
                     WHERE type = '{object_type}' AND name NOT LIKE 'sqlite_%'"
                ),
                &[],
            )
            .await?;
        names_of(&rows)
    }
}

#[async_trait]
impl SchemaAdapter for SqliteSchema<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> MetaResult<bool> {
        Ok(true)
    }

    async fn is_empty(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type IN ('table', 'view', 'trigger') AND name NOT LIKE 'sqlite_%'",
                &[],
            )
            .await?;
        Ok(count_of(&rows)? == 0)
    }

    async fn create(&self) -> MetaResult<bool> {
        log::debug!("SQLite has no schema namespace; create is a no-op");
        Ok(false)
    }

    async fn drop_schema(&self) -> MetaResult<bool> {
        log::debug!("SQLite has no schema namespace; drop is a no-op");
        Ok(false)
    }

    /// Triggers, views, then tables, with foreign keys off around the pass.
    async fn erase(&self) -> MetaResult<()> {
        self.conn.execute("PRAGMA foreign_keys = OFF", &[]).await?;
        let mut result = Ok(());
        'pass: for (object_type, drop_kind) in
            [("trigger", "TRIGGER"), ("view", "VIEW"), ("table", "TABLE")]
        {
            let names = match self.object_names(object_type).await {
                Ok(names) => names,
                Err(e) => {
                    result = Err(e);
                    break 'pass;
                }
            };
            for name in names {
                if let Err(e) = self
                    .conn
                    .execute(
                        &format!(
                            "DROP {drop_kind} IF EXISTS {}",
                            quote_ident(DbKind::Sqlite, &name)
                        ),
                        &[],
                    )
                    .await
                {
                    result = Err(e.into());
                    break 'pass;
                }
            }
        }
        self.conn.execute("PRAGMA foreign_keys = ON", &[]).await?;
        result
    }
}
