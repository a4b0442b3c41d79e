//! SQL Server schema adapter, over the sys catalog.

use crate::error::MetaResult;
use crate::schema::{count_of, names_of, SchemaAdapter};
use async_trait::async_trait;
use tm_db::{Connection, DbKind, Value};
use tm_sql::quote_ident;

pub struct SqlServerSchema<'a> {
    conn: &'a dyn Connection,
    name: String,
}

impl<'a> SqlServerSchema<'a> {
    pub fn new(conn: &'a dyn Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    fn quoted(&self) -> String {
        quote_ident(DbKind::SqlServer, &self.name)
    }

    fn qualified(&self, object: &str) -> String {
        format!("{}.{}", self.quoted(), quote_ident(DbKind::SqlServer, object))
    }

    async fn object_names(&self, type_codes: &str) -> MetaResult<Vec<String>> {
        let rows = self
            .conn
            .query(
                &format!(
                    "SELECT o.name FROM sys.objects o \
                     JOIN sys.schemas s ON o.schema_id = s.schema_id \
                     WHERE s.name = @p1 AND o.type IN ({type_codes})"
                ),
                &[Value::from(self.name.as_str())],
            )
            .await?;
        names_of(&rows)
    }

    async fn drop_objects(&self, type_codes: &str, drop_kind: &str) -> MetaResult<()> {
        for name in self.object_names(type_codes).await? {
            self.conn
                .execute(
                    &format!("DROP {drop_kind} {}", self.qualified(&name)),
                    &[],
                )
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaAdapter for SqlServerSchema<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM sys.schemas WHERE name = @p1",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        Ok(count_of(&rows)? > 0)
    }

    /// Counts tables, views, synonyms, sequences, procedures, and functions.
    async fn is_empty(&self) -> MetaResult<bool> {
        let rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM sys.objects o \
                 JOIN sys.schemas s ON o.schema_id = s.schema_id \
                 WHERE s.name = @p1 \
                 AND o.type IN ('U', 'V', 'SN', 'SO', 'P', 'FN', 'IF', 'TF')",
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

    /// SQL Server refuses to drop a non-empty schema; erase first.
    async fn drop_schema(&self) -> MetaResult<bool> {
        self.erase().await?;
        self.conn
            .execute(&format!("DROP SCHEMA {}", self.quoted()), &[])
            .await?;
        Ok(true)
    }

    /// Foreign keys first so the table pass cannot hit dependency errors,
    /// then procedures/functions, views, tables, synonyms, sequences.
    async fn erase(&self) -> MetaResult<()> {
        let fks = self
            .conn
            .query(
                "SELECT fk.name, OBJECT_NAME(fk.parent_object_id) \
                 FROM sys.foreign_keys fk \
                 JOIN sys.schemas s ON fk.schema_id = s.schema_id \
                 WHERE s.name = @p1",
                &[Value::from(self.name.as_str())],
            )
            .await?;
        for row in &fks {
            let constraint = row
                .first()
                .and_then(|v| v.as_str().ok())
                .unwrap_or_default()
                .to_string();
            let table = row
                .get(1)
                .and_then(|v| v.as_str().ok())
                .unwrap_or_default()
                .to_string();
            self.conn
                .execute(
                    &format!(
                        "ALTER TABLE {} DROP CONSTRAINT {}",
                        self.qualified(&table),
                        quote_ident(DbKind::SqlServer, &constraint)
                    ),
                    &[],
                )
                .await?;
        }

        self.drop_objects("'P'", "PROCEDURE").await?;
        self.drop_objects("'FN', 'IF', 'TF'", "FUNCTION").await?;
        self.drop_objects("'V'", "VIEW").await?;
        self.drop_objects("'U'", "TABLE").await?;
        self.drop_objects("'SN'", "SYNONYM").await?;
        self.drop_objects("'SO'", "SEQUENCE").await?;
        Ok(())
    }
}
