//! DBMS kind tag.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of database engines Tidemark speaks to.
///
/// Dialect behavior (statement splitting, metadata SQL, locking, schema
/// catalog queries) is resolved from this tag through small factories; new
/// dialects are added by adding a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbKind {
    Sqlite,
    MySql,
    PostgreSql,
    SqlServer,
    Cassandra,
    CockroachDb,
}

impl DbKind {
    /// Human-readable engine name for logging.
    pub fn name(self) -> &'static str {
        match self {
            DbKind::Sqlite => "SQLite",
            DbKind::MySql => "MySQL",
            DbKind::PostgreSql => "PostgreSQL",
            DbKind::SqlServer => "SQL Server",
            DbKind::Cassandra => "Cassandra",
            DbKind::CockroachDb => "CockroachDB",
        }
    }

    /// Whether DDL participates in transactions on this engine.
    ///
    /// MySQL implicitly commits around DDL and Cassandra has no
    /// multi-statement transactions at all; both still accept the engine's
    /// begin/commit calls as no-op-ish bracketing, but rollback of DDL is
    /// not available.
    pub fn supports_transactional_ddl(self) -> bool {
        match self {
            DbKind::Sqlite | DbKind::PostgreSql | DbKind::SqlServer | DbKind::CockroachDb => true,
            DbKind::MySql | DbKind::Cassandra => false,
        }
    }

    /// Whether the engine offers transactions at all.
    pub fn supports_transactions(self) -> bool {
        !matches!(self, DbKind::Cassandra)
    }
}

impl fmt::Display for DbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
