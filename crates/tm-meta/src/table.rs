//! SQL implementation of the metadata store.
//!
//! One generic implementation drives every dialect; the differences (column
//! types, identifier quoting, parameter placeholder style, lock strategy)
//! are keyed off the connection's [`DbKind`] tag. Identifiers are the only
//! string-composed SQL; every literal value binds as a parameter.

use crate::error::{MetaError, MetaResult};
use crate::store::MetadataStore;
use async_trait::async_trait;
use chrono::Utc;
use tm_core::{AppliedMigration, MigrationKind, MigrationScript, Version};
use tm_db::{Connection, DbKind, Row, Value};
use tm_sql::quote_ident;

/// Well-known id of the row-based lock sentinel (CockroachDB, Cassandra).
/// Never reported as metadata.
pub(crate) const LOCK_ROW_ID: i64 = 0;

/// The metadata table for one managed database.
pub struct SqlMetadataTable<'a> {
    conn: &'a dyn Connection,
    kind: DbKind,
    schema: Option<String>,
    table: String,
    installed_by: String,
}

impl<'a> SqlMetadataTable<'a> {
    pub fn new(
        conn: &'a dyn Connection,
        schema: Option<String>,
        table: impl Into<String>,
        installed_by: impl Into<String>,
    ) -> Self {
        let kind = conn.kind();
        Self {
            conn,
            kind,
            schema,
            table: table.into(),
            installed_by: installed_by.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                quote_ident(self.kind, schema),
                quote_ident(self.kind, &self.table)
            ),
            None => quote_ident(self.kind, &self.table),
        }
    }

    /// Positional parameter placeholder in the dialect's style, 1-based.
    fn param(&self, i: usize) -> String {
        match self.kind {
            DbKind::PostgreSql | DbKind::CockroachDb => format!("${i}"),
            DbKind::SqlServer => format!("@p{i}"),
            DbKind::Sqlite | DbKind::MySql | DbKind::Cassandra => "?".to_string(),
        }
    }

    fn create_table_sql(&self) -> String {
        let t = self.qualified_name();
        match self.kind {
            DbKind::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 type INTEGER NOT NULL, \
                 version TEXT, \
                 description TEXT NOT NULL, \
                 name TEXT NOT NULL, \
                 checksum TEXT, \
                 installed_by TEXT NOT NULL, \
                 installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP, \
                 success BOOLEAN NOT NULL)"
            ),
            DbKind::MySql => format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id INT NOT NULL AUTO_INCREMENT PRIMARY KEY, \
                 type INT NOT NULL, \
                 version VARCHAR(50), \
                 description VARCHAR(200) NOT NULL, \
                 name VARCHAR(300) NOT NULL, \
                 checksum VARCHAR(64), \
                 installed_by VARCHAR(100) NOT NULL, \
                 installed_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP, \
                 success BOOLEAN NOT NULL)"
            ),
            DbKind::PostgreSql | DbKind::CockroachDb => format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id SERIAL PRIMARY KEY, \
                 type INT NOT NULL, \
                 version VARCHAR(50), \
                 description VARCHAR(200) NOT NULL, \
                 name VARCHAR(300) NOT NULL, \
                 checksum VARCHAR(64), \
                 installed_by VARCHAR(100) NOT NULL, \
                 installed_on TIMESTAMP NOT NULL DEFAULT now(), \
                 success BOOLEAN NOT NULL)"
            ),
            DbKind::SqlServer => format!(
                "CREATE TABLE {t} (\
                 id INT IDENTITY(1,1) PRIMARY KEY, \
                 type INT NOT NULL, \
                 version NVARCHAR(50), \
                 description NVARCHAR(200) NOT NULL, \
                 name NVARCHAR(300) NOT NULL, \
                 checksum NVARCHAR(64), \
                 installed_by NVARCHAR(100) NOT NULL, \
                 installed_on DATETIME NOT NULL DEFAULT GETUTCDATE(), \
                 success BIT NOT NULL)"
            ),
            DbKind::Cassandra => format!(
                "CREATE TABLE IF NOT EXISTS {t} (\
                 id bigint PRIMARY KEY, \
                 type int, \
                 version text, \
                 description text, \
                 name text, \
                 checksum text, \
                 installed_by text, \
                 installed_on timestamp, \
                 success boolean)"
            ),
        }
    }

    async fn table_exists(&self) -> MetaResult<bool> {
        let (sql, params): (String, Vec<Value>) = match self.kind {
            DbKind::Sqlite => (
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?".to_string(),
                vec![Value::from(self.table.as_str())],
            ),
            DbKind::MySql => match &self.schema {
                Some(schema) => (
                    "SELECT COUNT(*) FROM information_schema.tables \
                     WHERE table_schema = ? AND table_name = ?"
                        .to_string(),
                    vec![Value::from(schema.as_str()), Value::from(self.table.as_str())],
                ),
                None => (
                    "SELECT COUNT(*) FROM information_schema.tables \
                     WHERE table_schema = DATABASE() AND table_name = ?"
                        .to_string(),
                    vec![Value::from(self.table.as_str())],
                ),
            },
            DbKind::PostgreSql | DbKind::CockroachDb => (
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_name = $2"
                    .to_string(),
                vec![
                    Value::from(self.schema.as_deref().unwrap_or("public")),
                    Value::from(self.table.as_str()),
                ],
            ),
            DbKind::SqlServer => (
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = @p1 AND table_name = @p2"
                    .to_string(),
                vec![
                    Value::from(self.schema.as_deref().unwrap_or("dbo")),
                    Value::from(self.table.as_str()),
                ],
            ),
            DbKind::Cassandra => (
                "SELECT table_name FROM system_schema.tables \
                 WHERE keyspace_name = ? AND table_name = ?"
                    .to_string(),
                vec![
                    Value::opt_text(self.schema.as_deref()),
                    Value::from(self.table.as_str()),
                ],
            ),
        };
        let rows = self.conn.query(&sql, &params).await?;
        match self.kind {
            DbKind::Cassandra => Ok(!rows.is_empty()),
            _ => Ok(count_of(&rows)? > 0),
        }
    }

    async fn ensure_table(&self) -> MetaResult<()> {
        self.create_if_not_exists().await.map(|_| ())
    }

    /// Next explicit id for engines without auto-increment (Cassandra).
    async fn next_id(&self) -> MetaResult<i64> {
        let t = self.qualified_name();
        let rows = self.conn.query(&format!("SELECT MAX(id) FROM {t}"), &[]).await?;
        let max = rows
            .first()
            .and_then(|r| r.first())
            .and_then(|v| v.as_i64().ok())
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn insert_row(
        &self,
        kind: MigrationKind,
        version: Option<&Version>,
        description: &str,
        name: &str,
        checksum: Option<&str>,
        success: bool,
    ) -> MetaResult<()> {
        self.ensure_table().await?;
        let t = self.qualified_name();

        let mut columns = vec![
            "type",
            "version",
            "description",
            "name",
            "checksum",
            "installed_by",
            "installed_on",
            "success",
        ];
        let mut params: Vec<Value> = vec![
            Value::Int(kind.tag()),
            Value::opt_text(version.map(Version::label)),
            Value::from(description),
            Value::from(name),
            Value::opt_text(checksum),
            Value::from(self.installed_by.as_str()),
            Value::from(Utc::now()),
            Value::from(success),
        ];
        if self.kind == DbKind::Cassandra {
            columns.insert(0, "id");
            params.insert(0, Value::Int(self.next_id().await?));
        }

        let placeholders: Vec<String> =
            (1..=params.len()).map(|i| self.param(i)).collect();
        let sql = format!(
            "INSERT INTO {t} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, &params).await?;
        Ok(())
    }

    /// CockroachDB row lock: check-then-insert of the sentinel row inside a
    /// single transaction. Relies on the engine's isolation level, as
    /// specified; any error rolls back and reports not-locked.
    async fn try_lock_row(&self) -> bool {
        if self.ensure_table().await.is_err() {
            return false;
        }
        let t = self.qualified_name();
        let outcome: MetaResult<bool> = async {
            self.conn.begin().await.map_err(MetaError::Sql)?;
            let rows = self
                .conn
                .query(
                    &format!("SELECT id FROM {t} WHERE id = {}", self.param(1)),
                    &[Value::Int(LOCK_ROW_ID)],
                )
                .await?;
            if !rows.is_empty() {
                self.conn.commit().await.map_err(MetaError::Sql)?;
                return Ok(false);
            }
            self.conn
                .execute(
                    &format!(
                        "INSERT INTO {t} (id, type, version, description, name, checksum, \
                         installed_by, installed_on, success) \
                         VALUES ({}, 0, NULL, {}, {}, NULL, {}, {}, {})",
                        self.param(1),
                        self.param(2),
                        self.param(3),
                        self.param(4),
                        self.param(5),
                        self.param(6)
                    ),
                    &[
                        Value::Int(LOCK_ROW_ID),
                        Value::from("lock"),
                        Value::from("lock"),
                        Value::from(self.installed_by.as_str()),
                        Value::from(Utc::now()),
                        Value::from(true),
                    ],
                )
                .await?;
            self.conn.commit().await.map_err(MetaError::Sql)?;
            Ok(true)
        }
        .await;
        match outcome {
            Ok(locked) => locked,
            Err(e) => {
                log::warn!("metadata table lock attempt failed: {e}");
                let _ = self.conn.rollback().await;
                false
            }
        }
    }

    /// Cassandra has no session concept; a lightweight-transaction
    /// conditional insert of the sentinel row is the exclusion primitive.
    async fn try_lock_lwt(&self) -> bool {
        if self.ensure_table().await.is_err() {
            return false;
        }
        let t = self.qualified_name();
        let result = self
            .conn
            .query(
                &format!(
                    "INSERT INTO {t} (id, type, description, name, installed_by, \
                     installed_on, success) \
                     VALUES (?, 0, 'lock', 'lock', ?, ?, true) IF NOT EXISTS"
                ),
                &[
                    Value::Int(LOCK_ROW_ID),
                    Value::from(self.installed_by.as_str()),
                    Value::from(Utc::now()),
                ],
            )
            .await;
        match result {
            // The LWT result set reports [applied] in the first column.
            Ok(rows) => rows
                .first()
                .and_then(|r| r.first())
                .and_then(|v| v.as_bool().ok())
                .unwrap_or(false),
            Err(e) => {
                log::warn!("metadata table lock attempt failed: {e}");
                false
            }
        }
    }

    async fn delete_lock_row(&self) -> bool {
        let t = self.qualified_name();
        self.conn
            .execute(
                &format!("DELETE FROM {t} WHERE id = {}", self.param(1)),
                &[Value::Int(LOCK_ROW_ID)],
            )
            .await
            .is_ok()
    }
}

#[async_trait]
impl MetadataStore for SqlMetadataTable<'_> {
    async fn create_if_not_exists(&self) -> MetaResult<bool> {
        if self.table_exists().await? {
            return Ok(false);
        }
        log::info!("creating metadata table {}", self.qualified_name());
        self.conn.execute(&self.create_table_sql(), &[]).await?;
        Ok(true)
    }

    async fn try_lock(&self) -> bool {
        match self.kind {
            // Exclusion is carried by the session advisory lock (MySQL,
            // PostgreSQL, SQL Server) or by the single-writer file (SQLite).
            DbKind::Sqlite | DbKind::MySql | DbKind::PostgreSql | DbKind::SqlServer => true,
            DbKind::CockroachDb => self.try_lock_row().await,
            DbKind::Cassandra => self.try_lock_lwt().await,
        }
    }

    async fn release_lock(&self) -> bool {
        match self.kind {
            DbKind::Sqlite | DbKind::MySql | DbKind::PostgreSql | DbKind::SqlServer => true,
            DbKind::CockroachDb | DbKind::Cassandra => self.delete_lock_row().await,
        }
    }

    async fn save(&self, script: &MigrationScript, success: bool) -> MetaResult<()> {
        self.insert_row(
            script.kind(),
            script.version(),
            script.description(),
            script.name(),
            Some(script.checksum()),
            success,
        )
        .await
    }

    async fn save_marker(
        &self,
        kind: MigrationKind,
        version: Option<&Version>,
        description: &str,
        name: &str,
    ) -> MetaResult<()> {
        debug_assert!(kind.is_marker());
        self.insert_row(kind, version, description, name, None, true).await
    }

    async fn update_checksum(&self, id: i64, checksum: &str) -> MetaResult<()> {
        self.ensure_table().await?;
        let t = self.qualified_name();
        let sql = format!(
            "UPDATE {t} SET checksum = {} WHERE id = {}",
            self.param(1),
            self.param(2)
        );
        self.conn
            .execute(&sql, &[Value::from(checksum), Value::Int(id)])
            .await?;
        Ok(())
    }

    async fn all_metadata(&self) -> MetaResult<Vec<AppliedMigration>> {
        self.ensure_table().await?;
        let t = self.qualified_name();
        let sql = format!(
            "SELECT id, type, version, description, name, checksum, \
             installed_by, installed_on, success FROM {t}"
        );
        let rows = self.conn.query(&sql, &[]).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let id = cell(row, 0)?.as_i64().map_err(bad_row)?;
            if id == LOCK_ROW_ID {
                continue;
            }
            out.push(map_row(row, id)?);
        }
        out.sort_by_key(|r| r.id);
        Ok(out)
    }
}

fn map_row(row: &Row, id: i64) -> MetaResult<AppliedMigration> {
    let tag = cell(row, 1)?.as_i64().map_err(bad_row)?;
    let kind = MigrationKind::from_tag(tag)
        .ok_or_else(|| MetaError::Row(format!("unknown migration kind tag {tag}")))?;
    let version = match cell(row, 2)?.as_opt_str().map_err(bad_row)? {
        Some(label) => Some(
            Version::parse(label)
                .map_err(|e| MetaError::Row(format!("unreadable version: {e}")))?,
        ),
        None => None,
    };
    Ok(AppliedMigration {
        id,
        kind,
        version,
        description: cell(row, 3)?.as_str().map_err(bad_row)?.to_string(),
        name: cell(row, 4)?.as_str().map_err(bad_row)?.to_string(),
        checksum: cell(row, 5)?
            .as_opt_str()
            .map_err(bad_row)?
            .map(str::to_string),
        installed_by: cell(row, 6)?.as_str().map_err(bad_row)?.to_string(),
        installed_on: cell(row, 7)?.as_timestamp().map_err(bad_row)?,
        success: cell(row, 8)?.as_bool().map_err(bad_row)?,
    })
}

fn cell(row: &Row, idx: usize) -> MetaResult<&Value> {
    row.get(idx)
        .ok_or_else(|| MetaError::Row(format!("missing column {idx}")))
}

fn bad_row(e: tm_db::DbError) -> MetaError {
    MetaError::Row(e.to_string())
}

fn count_of(rows: &[Row]) -> MetaResult<i64> {
    rows.first()
        .and_then(|r| r.first())
        .map(|v| v.as_i64().map_err(bad_row))
        .unwrap_or(Ok(0))
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
