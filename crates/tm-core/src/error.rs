//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark.
///
/// Every variant is a configuration-class problem: all of them are detected
/// before any statement touches the target database.
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Malformed version label
    #[error("[C001] Invalid version '{label}': {reason}")]
    InvalidVersion { label: String, reason: String },

    /// C002: Migration name does not follow the naming contract
    #[error("[C002] Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// C003: Two versioned migrations share a version
    #[error("[C003] Duplicate migration version {version}: '{first}' and '{second}'")]
    DuplicateVersion {
        version: String,
        first: String,
        second: String,
    },

    /// C004: Two repeatable migrations share a name
    #[error("[C004] Duplicate repeatable migration name '{name}'")]
    DuplicateName { name: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
