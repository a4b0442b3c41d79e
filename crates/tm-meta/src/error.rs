//! Error types for tm-meta

use thiserror::Error;
use tm_db::DbError;

/// Metadata protocol errors
#[derive(Error, Debug)]
pub enum MetaError {
    /// T001: Underlying driver failure
    #[error("[T001] {0}")]
    Sql(#[from] DbError),

    /// T002: A metadata row came back in a shape the engine cannot read
    #[error("[T002] Corrupt metadata row: {0}")]
    Row(String),
}

/// Result type alias for MetaError
pub type MetaResult<T> = Result<T, MetaError>;
