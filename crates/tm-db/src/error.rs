//! Error types for tm-db

use thiserror::Error;

/// Maximum length of SQL text carried inside an execution error.
const MAX_ERROR_SQL_LEN: usize = 256;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    Connection(String),

    /// SQL execution error (D002). Carries a truncated copy of the offending
    /// statement for diagnostics.
    #[error("[D002] SQL execution failed: {message} [sql: {sql}]")]
    Execution { message: String, sql: String },

    /// Transaction control error (D003)
    #[error("[D003] Transaction error: {0}")]
    Transaction(String),

    /// Unexpected column type or NULL in a result row (D004)
    #[error("[D004] Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },
}

impl DbError {
    /// Build an execution error, truncating `sql` to a diagnostic-sized copy.
    pub fn execution(message: impl Into<String>, sql: &str) -> Self {
        let mut sql = sql.trim().to_string();
        if sql.len() > MAX_ERROR_SQL_LEN {
            let mut cut = MAX_ERROR_SQL_LEN;
            while !sql.is_char_boundary(cut) {
                cut -= 1;
            }
            sql.truncate(cut);
            sql.push_str("...");
        }
        DbError::Execution {
            message: message.into(),
            sql,
        }
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
