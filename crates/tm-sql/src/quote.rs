//! Per-dialect identifier quoting.
//!
//! Identifiers (schema, table, object names) are the only string-composed
//! part of generated SQL; literal values always bind as parameters.

use tm_db::DbKind;

/// Quote `ident` for the dialect, doubling any embedded closing quote so
/// arbitrary identifiers coming back from catalog queries stay safe.
pub fn quote_ident(kind: DbKind, ident: &str) -> String {
    match kind {
        DbKind::MySql => format!("`{}`", ident.replace('`', "``")),
        DbKind::SqlServer => format!("[{}]", ident.replace(']', "]]")),
        DbKind::Sqlite | DbKind::PostgreSql | DbKind::Cassandra | DbKind::CockroachDb => {
            format!("\"{}\"", ident.replace('"', "\"\""))
        }
    }
}

#[cfg(test)]
#[path = "quote_test.rs"]
mod tests;
