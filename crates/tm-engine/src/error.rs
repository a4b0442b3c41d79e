//! Error types for tm-engine

use thiserror::Error;
use tm_core::CoreError;
use tm_db::DbError;
use tm_meta::MetaError;

/// Orchestrator errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// E001: The requested run contradicts the configuration or the recorded
    /// history. Detected before any statement touches the target database.
    #[error("[E001] Configuration error: {0}")]
    Configuration(String),

    /// E002: An applied migration's on-disk script no longer matches the
    /// recorded checksum.
    #[error("[E002] Checksum mismatch for migration '{name}': recorded {expected}, found {actual}")]
    Validation {
        name: String,
        expected: String,
        actual: String,
    },

    /// E003: A migration lock could not be acquired. The engine never
    /// proceeds unprotected.
    #[error("[E003] Lock acquisition failed: {0}")]
    Lock(String),

    /// E004: Script-model error (malformed name, duplicate version/name)
    #[error("[E004] {0}")]
    Core(#[from] CoreError),

    /// E005: Driver failure while executing a migration statement
    #[error("[E005] {0}")]
    Db(#[from] DbError),

    /// E006: Metadata table protocol failure
    #[error("[E006] {0}")]
    Meta(#[from] MetaError),
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
